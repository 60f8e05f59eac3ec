//! Shared per-sensor slot store
//!
//! Exactly four slots exist for the life of the process, one per sensor
//! index, whether or not that index is configured. The scheduler's commit
//! step is the only writer; the query interface takes snapshots. A single
//! `RwLock` over the whole array makes every commit atomic from a reader's
//! point of view, so a slot can never be observed with a fresh error next
//! to stale data.

use tokio::sync::RwLock;

use super::error::SensorError;
use super::poller::PollOutcome;
use super::retry::RetryPolicy;

/// Number of sensor slots, fixed at process start.
pub const SLOT_COUNT: usize = 4;

/// Sentinel stored in `data` while no valid temperature exists.
pub const NO_READING: f64 = -100.0;

/// Cached state for one sensor index.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSlot {
    /// Sensor index, fixed at creation.
    pub id: usize,
    /// Unix seconds of the last committed update. Only advances.
    pub timestamp: u64,
    /// Last known temperature in °C (3 decimals), or `NO_READING`.
    pub data: f64,
    /// Current error state; `None` means the reading is valid.
    pub error: Option<SensorError>,
    /// Consecutive failed polls since the last success.
    pub retry_count: u32,
}

impl SensorSlot {
    fn unconfigured(id: usize) -> Self {
        Self {
            id,
            timestamp: 0,
            data: NO_READING,
            error: Some(SensorError::NotConfigured { index: id }),
            retry_count: 0,
        }
    }

    fn awaiting_first_read(id: usize) -> Self {
        Self {
            error: Some(SensorError::AwaitingFirstRead { index: id }),
            ..Self::unconfigured(id)
        }
    }

    /// Numeric error code as reported on the wire; `0` when valid.
    pub fn error_code(&self) -> u8 {
        self.error.as_ref().map_or(0, SensorError::code)
    }

    /// Human-readable error detail; empty when valid.
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Known-bad or configured-but-unread. Unconfigured slots do not count;
    /// they will never recover and must not hold the scheduler in its fast
    /// cadence.
    pub fn is_faulted(&self) -> bool {
        self.error_code() > 1
    }
}

/// The shared store of per-sensor latest-known-good state.
///
/// Owned explicitly and injected into both the scheduler and the query
/// interface; there is no ambient global.
pub struct SensorCache {
    slots: RwLock<[SensorSlot; SLOT_COUNT]>,
}

impl SensorCache {
    /// Create all four slots. Configured indices start as awaiting their
    /// first read, the rest as permanently unconfigured.
    pub fn new(configured: [bool; SLOT_COUNT]) -> Self {
        let slots = std::array::from_fn(|id| {
            if configured[id] {
                SensorSlot::awaiting_first_read(id)
            } else {
                SensorSlot::unconfigured(id)
            }
        });
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Snapshot one slot.
    pub async fn snapshot(&self, index: usize) -> SensorSlot {
        self.slots.read().await[index].clone()
    }

    /// Snapshot all four slots at one instant.
    pub async fn snapshot_all(&self) -> [SensorSlot; SLOT_COUNT] {
        self.slots.read().await.clone()
    }

    /// Snapshot one slot from outside the runtime (query interface thread).
    pub fn blocking_snapshot(&self, index: usize) -> SensorSlot {
        self.slots.blocking_read()[index].clone()
    }

    /// Snapshot all slots from outside the runtime (query interface thread).
    pub fn blocking_snapshot_all(&self) -> [SensorSlot; SLOT_COUNT] {
        self.slots.blocking_read().clone()
    }

    /// Whether any slot is in a state that warrants the fast retry cadence.
    pub async fn any_faulted(&self) -> bool {
        self.slots.read().await.iter().any(SensorSlot::is_faulted)
    }

    /// Apply one poll outcome under the retry rule.
    ///
    /// A success commits immediately and clears the failure streak. A
    /// failure only bumps the streak until it exceeds the policy threshold;
    /// from then on every failing pass commits, keeping the previous good
    /// value visible through transient glitches while letting a persistent
    /// fault surface.
    pub async fn commit(&self, outcome: PollOutcome, policy: &RetryPolicy) {
        let mut slots = self.slots.write().await;
        let slot = &mut slots[outcome.index];

        match outcome.error {
            None => {
                slot.retry_count = 0;
                slot.timestamp = outcome.timestamp;
                slot.data = outcome.value;
                slot.error = None;
            }
            Some(error) => {
                slot.retry_count += 1;
                if policy.commits_failure(slot.retry_count) {
                    slot.timestamp = outcome.timestamp;
                    slot.data = outcome.value;
                    slot.error = Some(error);
                }
            }
        }
    }
}
