use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use touchlight::cli::{self, Action, OutputFormat};
use touchlight::config::DEFAULT_CONFIG_PATH;
use touchlight::service::{open_policy, TouchlightService};
use touchlight::TouchlightConfig;

#[derive(Parser, Debug)]
#[command(name = "touchlight")]
#[command(about = "Control touchscreen backlight brightness, with double-tap wake")]
#[command(version)]
#[command(after_help = "Examples:
  touchlight get          Show current brightness
  touchlight set 50       Set brightness to 50%
  touchlight +10          Increase brightness by 10%
  touchlight -20          Decrease brightness by 20%
  touchlight off          Turn backlight off
  touchlight on           Turn backlight on
  touchlight max          Set to maximum brightness
  touchlight min          Set to minimum brightness (but not off)
  touchlight serve        Run the double-tap wake service")]
struct Args {
    /// Action: get, set <value>, +<value>, -<value>, on, off, max, min, serve
    #[arg(allow_negative_numbers = true)]
    action: Option<String>,

    /// Brightness percentage (0-100) for `set`
    value: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, help = "Path to TOML configuration file")]
    config: String,

    /// Run the double-tap wake service (same as the `serve` action)
    #[arg(long)]
    service: bool,

    /// Print the resulting status as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("# Touchlight Configuration File");
        print!("{}", TouchlightConfig::default().to_toml()?);
        return Ok(());
    }

    init_logging(&args)?;

    let config = match TouchlightConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }
    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let action = if args.service {
        Ok(Action::Serve)
    } else {
        Action::parse(args.action.as_deref(), args.value.as_deref())
    };

    let outcome = match action {
        Ok(Action::Serve) => run_service(&config).await,
        Ok(action) => run_action(&config, action, args.json),
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run_action(config: &TouchlightConfig, action: Action, json: bool) -> touchlight::Result<()> {
    let policy = open_policy(config)?;
    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    println!("{}", cli::execute(&policy, action, format)?);
    Ok(())
}

async fn run_service(config: &TouchlightConfig) -> touchlight::Result<()> {
    info!("Starting touchlight service v{}", env!("CARGO_PKG_VERSION"));
    let service = TouchlightService::new(config)?;
    service.run_with_signals().await
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("touchlight={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("pretty") => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some("compact") | None => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}
