//! Core acquisition and caching engine

mod cache;
mod decode;
mod error;
mod poller;
mod retry;
mod scheduler;

pub use cache::{SensorCache, SensorSlot, NO_READING, SLOT_COUNT};
pub use decode::{decode_reading, RANGE_MAX_MILLI, RANGE_MIN_MILLI};
pub use error::SensorError;
pub use poller::{poll_sensor, PollOutcome};
pub use retry::RetryPolicy;
pub use scheduler::{Heartbeat, Scheduler};

pub(crate) use poller::unix_now;
