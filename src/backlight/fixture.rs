use super::{BacklightDevice, BacklightStore, FILE_BL_POWER, FILE_BRIGHTNESS, FILE_MAX_BRIGHTNESS};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fake sysfs backlight class directory holding one device
pub(crate) struct FakeBacklight {
    pub root: TempDir,
    pub device_dir: PathBuf,
}

impl FakeBacklight {
    pub fn new(max: u32, brightness: u32, powered: bool) -> Self {
        let root = tempfile::tempdir().unwrap();
        let device_dir = root.path().join("rpi_backlight");
        write_device(&device_dir, max, brightness, powered);
        Self { root, device_dir }
    }

    pub fn store(&self) -> BacklightStore {
        BacklightStore::new(BacklightDevice::open(&self.device_dir).unwrap())
    }

    pub fn brightness(&self) -> String {
        fs::read_to_string(self.device_dir.join(FILE_BRIGHTNESS)).unwrap()
    }

    pub fn power(&self) -> String {
        fs::read_to_string(self.device_dir.join(FILE_BL_POWER)).unwrap()
    }

    pub fn set_brightness(&self, contents: &str) {
        fs::write(self.device_dir.join(FILE_BRIGHTNESS), contents).unwrap();
    }

    pub fn set_power(&self, contents: &str) {
        fs::write(self.device_dir.join(FILE_BL_POWER), contents).unwrap();
    }
}

pub(crate) fn write_device(device_dir: &Path, max: u32, brightness: u32, powered: bool) {
    fs::create_dir_all(device_dir).unwrap();
    fs::write(device_dir.join(FILE_MAX_BRIGHTNESS), format!("{}\n", max)).unwrap();
    fs::write(device_dir.join(FILE_BRIGHTNESS), format!("{}\n", brightness)).unwrap();
    fs::write(
        device_dir.join(FILE_BL_POWER),
        if powered { "0\n" } else { "1\n" },
    )
    .unwrap();
}
