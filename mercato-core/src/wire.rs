//! Helpers for decoding loosely-typed provider payloads.
//!
//! Exchanges encode prices as JSON strings and timestamps as either numbers or
//! strings; these helpers accept both and report anything else as a `Data` error.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::MercatoError;

/// Decode a finite float from a JSON number or numeric string.
///
/// # Errors
/// Returns `Data` naming `field` when the value is missing, non-numeric or not finite.
pub fn number(v: Option<&Value>, field: &str) -> Result<f64, MercatoError> {
    let parsed = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(MercatoError::Data(format!("malformed {field}: {v:?}"))),
    }
}

/// Decode an epoch-milliseconds timestamp from a JSON integer or numeric string.
///
/// # Errors
/// Returns `Data` naming `field` when the value is missing, non-integral or out of range.
pub fn millis(v: Option<&Value>, field: &str) -> Result<DateTime<Utc>, MercatoError> {
    let ms = match v {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    ms.and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| MercatoError::Data(format!("malformed {field}: {v:?}")))
}

/// Borrow a JSON array or report what was found instead.
///
/// # Errors
/// Returns `Data` when `v` is not an array.
pub fn array<'a>(v: &'a Value, what: &str) -> Result<&'a [Value], MercatoError> {
    v.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| MercatoError::Data(format!("expected array for {what}")))
}
