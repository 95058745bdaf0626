use super::fixture::{write_device, FakeBacklight};
use super::*;
use crate::error::TouchlightError;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_select_single_device() {
    let selected = select_device(&names(&["rpi_backlight"]), None).unwrap();
    assert_eq!(selected, "rpi_backlight");
}

#[test]
fn test_select_no_devices() {
    let result = select_device(&[], None);
    assert!(matches!(
        result,
        Err(TouchlightError::DeviceUnavailable { .. })
    ));
}

#[test]
fn test_select_ambiguous_devices() {
    let err = select_device(&names(&["b_backlight", "a_backlight"]), None).unwrap_err();
    assert!(err.is_subsystem_local());
    assert!(err.to_string().contains("a_backlight, b_backlight"));
}

#[test]
fn test_select_preferred_device() {
    let listing = names(&["10-0045", "rpi_backlight"]);

    assert_eq!(
        select_device(&listing, Some("10-0045")).unwrap(),
        "10-0045"
    );
    assert!(select_device(&listing, Some("missing")).is_err());
}

#[test]
fn test_discover_reads_max_brightness() {
    let fake = FakeBacklight::new(31, 16, true);

    let device = BacklightDevice::discover(fake.root.path(), None).unwrap();
    assert_eq!(device.name, "rpi_backlight");
    assert_eq!(device.max_brightness, 31);
    assert_eq!(device.brightness_path, fake.device_dir.join(FILE_BRIGHTNESS));
    assert_eq!(device.power_path, fake.device_dir.join(FILE_BL_POWER));
}

#[test]
fn test_discover_rejects_two_devices() {
    let fake = FakeBacklight::new(31, 16, true);
    write_device(&fake.root.path().join("other"), 255, 100, true);

    assert!(BacklightDevice::discover(fake.root.path(), None).is_err());
    let pinned = BacklightDevice::discover(fake.root.path(), Some("other")).unwrap();
    assert_eq!(pinned.max_brightness, 255);
}

#[test]
fn test_discover_missing_class_dir() {
    let dir = tempfile::tempdir().unwrap();
    let result = BacklightDevice::discover(dir.path().join("nope"), None);
    assert!(matches!(
        result,
        Err(TouchlightError::DeviceUnavailable { .. })
    ));
}

#[test]
fn test_open_rejects_zero_max() {
    let fake = FakeBacklight::new(0, 0, true);
    assert!(BacklightDevice::open(&fake.device_dir).is_err());
}

#[test]
fn test_read_and_write_brightness() {
    let fake = FakeBacklight::new(31, 16, true);
    let store = fake.store();

    assert_eq!(store.read_brightness().unwrap(), 16);

    store.write_brightness(31).unwrap();
    assert_eq!(fake.brightness(), "31");
    store.write_brightness(0).unwrap();
    assert_eq!(fake.brightness(), "0");
}

#[test]
fn test_write_brightness_out_of_range() {
    let fake = FakeBacklight::new(31, 16, true);
    let store = fake.store();

    let result = store.write_brightness(32);
    assert!(matches!(result, Err(TouchlightError::InvalidRange { .. })));
    assert_eq!(fake.brightness(), "16\n");
}

#[test]
fn test_read_non_numeric_brightness() {
    let fake = FakeBacklight::new(31, 16, true);
    let store = fake.store();
    fake.set_brightness("bright");

    assert!(matches!(
        store.read_brightness(),
        Err(TouchlightError::DeviceRead { .. })
    ));
}

#[test]
fn test_read_missing_brightness_file() {
    let fake = FakeBacklight::new(31, 16, true);
    let store = fake.store();
    std::fs::remove_file(fake.device_dir.join(FILE_BRIGHTNESS)).unwrap();

    assert!(matches!(
        store.read_brightness(),
        Err(TouchlightError::DeviceRead { .. })
    ));
    assert!(matches!(
        store.write_brightness(3),
        Err(TouchlightError::DeviceWrite { .. })
    ));
}

#[test]
fn test_power_polarity() {
    let fake = FakeBacklight::new(31, 16, true);
    let store = fake.store();

    assert!(store.read_power().unwrap());

    store.write_power(false).unwrap();
    assert_eq!(fake.power(), "1");
    assert!(!store.read_power().unwrap());

    store.write_power(true).unwrap();
    assert_eq!(fake.power(), "0");

    // FB_BLANK_POWERDOWN
    fake.set_power("4\n");
    assert!(!store.read_power().unwrap());
}
