//! Sensor-scoped error taxonomy
//!
//! Every way a reading can be missing or bad maps to one variant with a
//! stable numeric code. These are data, not control flow: they are stored in
//! the slot and rendered by the query interface, never raised past the poll
//! boundary.

use thiserror::Error;

/// Per-sensor error state, as stored in a slot and reported on the wire.
///
/// `Expired` is read-time only: the staleness transform produces it while
/// rendering a snapshot, and it is never committed to the cache.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    #[error("Sensor {index} not configured")]
    NotConfigured { index: usize },

    #[error("Sensor {index} configured but not yet read")]
    AwaitingFirstRead { index: usize },

    #[error("Sensor {index} files not found in device tree")]
    NotFound { index: usize },

    #[error("Insufficient file permission to read sensor {index}")]
    PermissionDenied { index: usize },

    #[error("Unidentified I/O error reading sensor {index} data: {detail}")]
    Io { index: usize, detail: String },

    #[error("Sensor {index} read produced non-text data")]
    WrongType { index: usize },

    #[error("Zero length read from sensor {index}")]
    EmptyRead { index: usize },

    #[error("Bus checksum failure reading sensor {index}")]
    Integrity { index: usize },

    #[error("Sensor {index} reading not parseable: {detail}")]
    Parse { index: usize, detail: String },

    #[error("Sensor {index} conversion produced a non-finite number")]
    Numeric { index: usize },

    #[error("Sensor {index} value {celsius} out of range")]
    Range { index: usize, celsius: f64 },

    #[error("Expired timestamp for sensor {index}")]
    Expired { index: usize },
}

impl SensorError {
    /// Stable numeric code exposed by the query interface. `0` is reserved
    /// for the no-error state and never produced here.
    pub fn code(&self) -> u8 {
        match self {
            Self::NotConfigured { .. } => 1,
            Self::AwaitingFirstRead { .. } => 2,
            Self::NotFound { .. } => 3,
            Self::PermissionDenied { .. } => 4,
            Self::Io { .. } => 5,
            Self::WrongType { .. } => 6,
            Self::EmptyRead { .. } => 7,
            Self::Integrity { .. } => 8,
            Self::Parse { .. } => 9,
            Self::Numeric { .. } => 10,
            Self::Range { .. } => 11,
            Self::Expired { .. } => 12,
        }
    }

    /// Index of the sensor this error belongs to.
    pub fn index(&self) -> usize {
        match self {
            Self::NotConfigured { index }
            | Self::AwaitingFirstRead { index }
            | Self::NotFound { index }
            | Self::PermissionDenied { index }
            | Self::Io { index, .. }
            | Self::WrongType { index }
            | Self::EmptyRead { index }
            | Self::Integrity { index }
            | Self::Parse { index, .. }
            | Self::Numeric { index }
            | Self::Range { index, .. }
            | Self::Expired { index } => *index,
        }
    }

    /// Reading retained for diagnostics despite the error, if any.
    ///
    /// Out-of-range values keep the converted temperature so a consumer can
    /// see what the sensor actually reported.
    pub fn diagnostic_value(&self) -> Option<f64> {
        match self {
            Self::Range { celsius, .. } => Some(*celsius),
            _ => None,
        }
    }
}
