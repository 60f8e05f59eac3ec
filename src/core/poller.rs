//! One-shot sensor reads
//!
//! A poll issues a single async read of the sensor's bus file and classifies
//! whatever comes back. It produces an outcome record and nothing else; the
//! cache commit step decides separately whether that outcome is written.

use std::io::ErrorKind;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::cache::{NO_READING, SLOT_COUNT};
use super::decode::decode_reading;
use super::error::SensorError;

/// Result of one poll attempt, before retry bookkeeping decides whether it
/// commits.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub index: usize,
    /// Unix seconds the read completed.
    pub timestamp: u64,
    /// Decoded temperature, a retained diagnostic value, or `NO_READING`.
    pub value: f64,
    pub error: Option<SensorError>,
}

/// Current unix time in whole seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Read one sensor's bus file and classify the result.
///
/// Read failures become sensor-scoped outcomes, never errors propagated to
/// the caller: a missing device path means the sensor is disconnected or
/// misconfigured, a permission failure points at deployment, and anything
/// else is the I/O catch-all. Being handed an out-of-range index is a
/// programming defect and terminates the process.
pub async fn poll_sensor(index: usize, bus_file: &Path) -> PollOutcome {
    if index >= SLOT_COUNT {
        log::error!("Fatal error, sensor index {index} out of range");
        std::process::exit(1);
    }

    let (value, error) = match tokio::fs::read(bus_file).await {
        Ok(raw) => match decode_reading(index, &raw) {
            Ok(celsius) => (celsius, None),
            Err(err) => (err.diagnostic_value().unwrap_or(NO_READING), Some(err)),
        },
        Err(err) => {
            let classified = match err.kind() {
                ErrorKind::NotFound => SensorError::NotFound { index },
                ErrorKind::PermissionDenied => SensorError::PermissionDenied { index },
                _ => SensorError::Io {
                    index,
                    detail: err.to_string(),
                },
            };
            (NO_READING, Some(classified))
        }
    };

    PollOutcome {
        index,
        timestamp: unix_now(),
        value,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    /// Write a bus-file fixture and return its path. Caller cleans up.
    fn write_fixture(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("w1_sensord_poller_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "{content}").unwrap();
        path
    }

    #[tokio::test]
    async fn successful_read_decodes() {
        let path = write_fixture(
            "good",
            "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n72 01 4b 46 7f ff 0e 10 57 t=23125\n",
        );
        let outcome = poll_sensor(0, &path).await;
        assert_eq!(outcome.index, 0);
        assert_eq!(outcome.value, 23.125);
        assert_eq!(outcome.error, None);
        assert!(outcome.timestamp > 0);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_device_is_not_found() {
        let outcome =
            poll_sensor(1, Path::new("/nonexistent/w1/28-0000000000/w1_slave")).await;
        assert_eq!(outcome.value, NO_READING);
        assert_eq!(outcome.error, Some(SensorError::NotFound { index: 1 }));
    }

    #[tokio::test]
    async fn decode_failure_is_carried_in_the_outcome() {
        let path = write_fixture("badcrc", "00 00 : crc=57 NO\nt=23125\n");
        let outcome = poll_sensor(2, &path).await;
        assert_eq!(outcome.value, NO_READING);
        assert_eq!(outcome.error, Some(SensorError::Integrity { index: 2 }));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn out_of_range_outcome_retains_the_value() {
        let path = write_fixture("range", "crc=57 YES\nt=200000\n");
        let outcome = poll_sensor(3, &path).await;
        assert_eq!(outcome.value, 200.0);
        assert!(matches!(
            outcome.error,
            Some(SensorError::Range { index: 3, .. })
        ));
        let _ = std::fs::remove_file(&path);
    }
}
