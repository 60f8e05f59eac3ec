//! Raw bus read decoding
//!
//! The w1_therm driver exposes each DS18B20 as a text file: a first line
//! ending in the CRC verdict (`YES`/`NO`) and a second line carrying the
//! reading as `t=<milli-degrees>`. Decoding is a pure cascade of checks;
//! the first failure wins and later checks never run.

use super::error::SensorError;

/// DS18B20 documented operating range, in milli-degrees Celsius.
pub const RANGE_MIN_MILLI: f64 = -55_000.0;
pub const RANGE_MAX_MILLI: f64 = 125_000.0;

/// Token the bus driver prints when the reading's CRC checked out.
const CRC_OK: &str = "YES";

/// Round a temperature to the 3-decimal precision the cache stores.
fn round_reading(celsius: f64) -> f64 {
    (celsius * 1000.0).round() / 1000.0
}

/// Decode one raw bus read into a validated temperature in °C.
///
/// Checks run in a fixed order and stop at the first failure: non-UTF-8
/// content, empty content, missing CRC marker, missing/unparseable `t=`
/// field, non-finite conversion, out-of-range value. An out-of-range
/// reading keeps the converted temperature inside the error so it stays
/// visible for diagnostics.
///
/// Pure and deterministic; the index is only used for message context.
pub fn decode_reading(index: usize, raw: &[u8]) -> Result<f64, SensorError> {
    let text =
        std::str::from_utf8(raw).map_err(|_| SensorError::WrongType { index })?;

    if text.is_empty() {
        return Err(SensorError::EmptyRead { index });
    }

    if !text.contains(CRC_OK) {
        return Err(SensorError::Integrity { index });
    }

    let field = match text.rfind("t=") {
        Some(pos) => &text[pos + 2..],
        None => {
            return Err(SensorError::Parse {
                index,
                detail: "no t= field in bus output".into(),
            })
        }
    };

    // The driver terminates the line with a newline; strip that and any
    // other trailing control bytes before conversion.
    let field = field.trim_end_matches(|c: char| c.is_ascii_control());
    let milli: f64 = field.parse().map_err(|_| SensorError::Parse {
        index,
        detail: format!("expected milli-degrees, got {field:?}"),
    })?;

    if !milli.is_finite() {
        return Err(SensorError::Numeric { index });
    }

    let celsius = round_reading(milli / 1000.0);
    if !(RANGE_MIN_MILLI..=RANGE_MAX_MILLI).contains(&milli) {
        return Err(SensorError::Range { index, celsius });
    }

    Ok(celsius)
}
