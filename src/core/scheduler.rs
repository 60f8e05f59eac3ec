//! Poll-pass scheduling
//!
//! A one-second heartbeat accumulates elapsed ticks and fires a poll pass
//! when the retry policy's current cadence is reached. Each pass reads every
//! configured sensor in its own task, so a slow or hung read never blocks a
//! sibling sensor, then commits the outcomes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{error, trace};

use super::cache::{SensorCache, SLOT_COUNT};
use super::poller::poll_sensor;
use super::retry::RetryPolicy;

/// Elapsed-tick accumulator.
///
/// The cadence is supplied per tick, so a slot turning bad mid-countdown
/// shortens the wait in place: a counter already past the short cadence
/// fires on the very next tick.
#[derive(Debug, Default)]
pub struct Heartbeat {
    elapsed: u64,
}

impl Heartbeat {
    /// Record one elapsed second; returns `true` when a pass is due.
    pub fn tick(&mut self, cadence_secs: u64) -> bool {
        self.elapsed += 1;
        if self.elapsed >= cadence_secs {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Drives poll passes over all configured sensors.
pub struct Scheduler {
    cache: Arc<SensorCache>,
    bus_files: [Option<PathBuf>; SLOT_COUNT],
    policy: RetryPolicy,
}

impl Scheduler {
    pub fn new(
        cache: Arc<SensorCache>,
        bus_files: [Option<PathBuf>; SLOT_COUNT],
        policy: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            bus_files,
            policy,
        }
    }

    /// Run indefinitely: one pass immediately on startup, then on the
    /// heartbeat at whatever cadence the cache state selects.
    pub async fn run(&self) {
        self.poll_pass().await;

        let mut heartbeat = Heartbeat::default();
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first interval tick completes at once; the startup pass above
        // already covered it.
        interval.tick().await;

        loop {
            interval.tick().await;
            let cadence = self.policy.cadence_secs(self.cache.any_faulted().await);
            if heartbeat.tick(cadence) {
                self.poll_pass().await;
            }
        }
    }

    /// One pass: read every configured sensor concurrently, then commit the
    /// outcomes through the retry rule.
    pub async fn poll_pass(&self) {
        let mut reads = Vec::new();
        for index in 0..SLOT_COUNT {
            let Some(bus_file) = self.bus_files[index].clone() else {
                continue;
            };
            reads.push(tokio::spawn(async move {
                poll_sensor(index, &bus_file).await
            }));
        }

        for read in reads {
            match read.await {
                Ok(outcome) => {
                    trace!(
                        "Sensor {} poll: value={} error={:?}",
                        outcome.index,
                        outcome.value,
                        outcome.error
                    );
                    self.cache.commit(outcome, &self.policy).await;
                }
                Err(e) => error!("Sensor read task failed: {e}"),
            }
        }
    }
}
