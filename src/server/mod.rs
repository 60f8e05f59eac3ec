//! Read-only query interface
//!
//! Renders cache snapshots as the v1 JSON API: `/status`, `/v1/alldata`,
//! and `/v1/data/{0..3}`. Staleness is evaluated lazily here at read time;
//! the cache itself is never written from this side. The server runs on its
//! own thread, off the scheduler's runtime, using blocking snapshots.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{error, warn};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::core::{unix_now, SensorCache, SensorError, SensorSlot, NO_READING, SLOT_COUNT};

/// Seconds after which a committed-good reading is reported as expired.
pub const DATA_EXPIRATION_SECS: u64 = 180;

/// Wire rendering of one slot. Field names are the stable v1 contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub id: usize,
    pub timestamp: u64,
    pub data: f64,
    pub error: u8,
    pub error_message: String,
    pub retry_count: u32,
}

/// Staleness-evaluating transform from a slot snapshot to its wire view.
///
/// A valid reading whose commit time is `DATA_EXPIRATION_SECS` or more in
/// the past renders as the sentinel with the expired error; the snapshot
/// itself is left alone, so re-reading before the next poll yields the same
/// view again.
pub fn render_slot(slot: &SensorSlot, now: u64) -> SlotView {
    let expired = slot.error.is_none()
        && now.saturating_sub(slot.timestamp) >= DATA_EXPIRATION_SECS;

    if expired {
        let error = SensorError::Expired { index: slot.id };
        return SlotView {
            id: slot.id,
            timestamp: slot.timestamp,
            data: NO_READING,
            error: error.code(),
            error_message: error.to_string(),
            retry_count: slot.retry_count,
        };
    }

    SlotView {
        id: slot.id,
        timestamp: slot.timestamp,
        data: slot.data,
        error: slot.error_code(),
        error_message: slot.error_message(),
        retry_count: slot.retry_count,
    }
}

enum Reply {
    Json(String),
    NotFound,
}

fn json_reply<T: Serialize>(value: &T) -> Reply {
    match serde_json::to_string(value) {
        Ok(body) => Reply::Json(body),
        Err(e) => {
            // Slot views serialize infallibly; keep the route alive anyway.
            error!("Failed to serialize response: {e}");
            Reply::NotFound
        }
    }
}

fn route(cache: &SensorCache, method: &Method, url: &str) -> Reply {
    if *method != Method::Get {
        return Reply::NotFound;
    }

    match url {
        "/status" => Reply::Json(r#"{"status":"ok"}"#.into()),
        "/v1/alldata" => {
            let now = unix_now();
            let views: Vec<SlotView> = cache
                .blocking_snapshot_all()
                .iter()
                .map(|slot| render_slot(slot, now))
                .collect();
            json_reply(&views)
        }
        _ => match url.strip_prefix("/v1/data/") {
            Some(rest) => match rest.parse::<usize>() {
                Ok(index) if index < SLOT_COUNT => {
                    let slot = cache.blocking_snapshot(index);
                    json_reply(&render_slot(&slot, unix_now()))
                }
                _ => Reply::NotFound,
            },
            None => Reply::NotFound,
        },
    }
}

fn respond(request: Request, reply: Reply) {
    let result = match reply {
        Reply::Json(body) => {
            let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("static header");
            request.respond(Response::from_string(body).with_header(content_type))
        }
        Reply::NotFound => {
            request.respond(Response::from_string("Not Found").with_status_code(404))
        }
    };
    if let Err(e) = result {
        error!("Failed to send response: {e}");
    }
}

/// Serve the v1 query routes until the process exits.
pub fn serve(cache: Arc<SensorCache>, port: u16) -> Result<()> {
    let server = Server::http(("0.0.0.0", port))
        .map_err(|e| anyhow!("failed to bind query interface on port {port}: {e}"))?;
    warn!("Query interface listening on port {port}");

    for request in server.incoming_requests() {
        let reply = route(&cache, request.method(), request.url());
        respond(request, reply);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_slot(id: usize, timestamp: u64, data: f64) -> SensorSlot {
        SensorSlot {
            id,
            timestamp,
            data,
            error: None,
            retry_count: 0,
        }
    }

    #[test]
    fn fresh_reading_renders_as_is() {
        let slot = good_slot(0, 1000, 21.5);
        let view = render_slot(&slot, 1100);
        assert_eq!(view.data, 21.5);
        assert_eq!(view.error, 0);
        assert_eq!(view.error_message, "");
    }

    #[test]
    fn reading_expires_at_the_boundary() {
        let slot = good_slot(2, 1000, 21.5);

        // One second short of the window: still valid.
        let view = render_slot(&slot, 1179);
        assert_eq!(view.error, 0);

        // Exactly at the window: expired.
        let view = render_slot(&slot, 1180);
        assert_eq!(view.data, NO_READING);
        assert_eq!(view.error, 12);
        assert_eq!(view.error_message, "Expired timestamp for sensor 2");
        // The stored snapshot is untouched.
        assert_eq!(slot.timestamp, 1000);
        assert_eq!(slot.error, None);
    }

    #[test]
    fn expiry_does_not_apply_to_error_slots() {
        let slot = SensorSlot {
            id: 1,
            timestamp: 0,
            data: NO_READING,
            error: Some(SensorError::NotConfigured { index: 1 }),
            retry_count: 0,
        };
        let view = render_slot(&slot, 1_000_000);
        assert_eq!(view.error, 1);
    }

    #[test]
    fn rendering_is_idempotent() {
        let slot = good_slot(0, 1000, 18.25);
        // Two reads inside the validity window are identical, even at
        // different instants.
        assert_eq!(render_slot(&slot, 1050), render_slot(&slot, 1100));
        // Two reads past the expiry boundary are identical too.
        assert_eq!(render_slot(&slot, 1200), render_slot(&slot, 1500));
    }

    #[test]
    fn wire_field_names_are_stable() {
        let slot = SensorSlot {
            id: 3,
            timestamp: 42,
            data: NO_READING,
            error: Some(SensorError::EmptyRead { index: 3 }),
            retry_count: 2,
        };
        let value = serde_json::to_value(render_slot(&slot, 50)).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["timestamp"], 42);
        assert_eq!(value["error"], 7);
        assert_eq!(value["errorMessage"], "Zero length read from sensor 3");
        assert_eq!(value["retryCount"], 2);
    }
}
