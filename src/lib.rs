//! w1-sensord: staleness-aware caching daemon for DS18B20 1-Wire sensors
//!
//! This library provides the acquisition/caching engine:
//! - A pure decoder for raw `w1_slave` bus reads
//! - An async per-sensor poller and a one-second poll scheduler with
//!   retry-aware cadence selection
//! - The shared slot cache and the read-only query interface over it

pub mod config;
pub mod core;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use core::{RetryPolicy, Scheduler, SensorCache, SensorError, SensorSlot};
