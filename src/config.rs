//! Environment-driven configuration
//!
//! Sensor identity comes from the environment: `ID_SENSOR_0` through
//! `ID_SENSOR_3` name devices under the 1-Wire bus directory (for example
//! `ID_SENSOR_0=28-0115a43610ff`). The documented deployment assumption is
//! that no index is skipped in the middle of the sequence; that assumption
//! is not enforced here.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::core::SLOT_COUNT;

/// Default location of the kernel's 1-Wire device tree.
const DEFAULT_DEVICE_DIR: &str = "/sys/bus/w1/devices";

const DEFAULT_PORT: u16 = 8000;

/// Process configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Device identifier per sensor index; `None` means unconfigured.
    pub sensors: [Option<String>; SLOT_COUNT],
    /// Directory holding one subdirectory per bus device.
    pub device_dir: PathBuf,
    /// Query interface listen port.
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Zero configured sensors is a deployment defect: the process has
    /// nothing to do and refuses to start.
    pub fn from_env() -> Result<Self> {
        Self::build(|name| std::env::var(name).ok())
    }

    fn build(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sensors =
            std::array::from_fn(|index| get(&format!("ID_SENSOR_{index}")));

        if sensors.iter().all(Option::is_none) {
            bail!("Fatal error, no sensor ID has been configured");
        }

        let device_dir = get("W1_DEVICE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_DIR));

        let port = match get("SERVER_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid SERVER_PORT {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            sensors,
            device_dir,
            port,
        })
    }

    /// Which slot indices have a device assigned.
    pub fn configured(&self) -> [bool; SLOT_COUNT] {
        std::array::from_fn(|index| self.sensors[index].is_some())
    }

    /// Bus file path for one configured sensor.
    ///
    /// Asking for an out-of-range or unconfigured index indicates a
    /// programming or deployment defect and terminates the process; it can
    /// never be a transient runtime condition.
    pub fn bus_file(&self, index: usize) -> PathBuf {
        if index >= SLOT_COUNT {
            log::error!("Fatal error, sensor index {index} out of range");
            std::process::exit(1);
        }
        match &self.sensors[index] {
            Some(device) => self.device_dir.join(device).join("w1_slave"),
            None => {
                log::error!("Fatal error, attempting to read unconfigured sensor {index}");
                std::process::exit(1);
            }
        }
    }

    /// Bus file paths for all slots, `None` where unconfigured.
    pub fn bus_files(&self) -> [Option<PathBuf>; SLOT_COUNT] {
        std::array::from_fn(|index| {
            self.sensors[index].as_ref().map(|_| self.bus_file(index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn loads_configured_sensors() {
        let config = Config::build(vars(&[
            ("ID_SENSOR_0", "28-0115a43610ff"),
            ("ID_SENSOR_2", "28-0115a44b22aa"),
        ]))
        .unwrap();

        assert_eq!(config.configured(), [true, false, true, false]);
        assert_eq!(config.port, 8000);
        assert_eq!(
            config.bus_file(0),
            PathBuf::from("/sys/bus/w1/devices/28-0115a43610ff/w1_slave")
        );
    }

    #[test]
    fn zero_sensors_is_an_error() {
        assert!(Config::build(vars(&[])).is_err());
    }

    #[test]
    fn overrides_apply() {
        let config = Config::build(vars(&[
            ("ID_SENSOR_0", "28-0115a43610ff"),
            ("W1_DEVICE_DIR", "/tmp/fake-w1"),
            ("SERVER_PORT", "9001"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9001);
        assert_eq!(
            config.bus_file(0),
            PathBuf::from("/tmp/fake-w1/28-0115a43610ff/w1_slave")
        );
    }

    #[test]
    fn bad_port_is_an_error() {
        let result = Config::build(vars(&[
            ("ID_SENSOR_0", "28-0115a43610ff"),
            ("SERVER_PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn bus_files_skips_unconfigured_indices() {
        let config = Config::build(vars(&[("ID_SENSOR_1", "28-0115a43610ff")])).unwrap();
        let files = config.bus_files();
        assert!(files[0].is_none());
        assert!(files[1].is_some());
    }
}
