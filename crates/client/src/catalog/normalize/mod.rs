//! Lenient payload normalization.
//!
//! The backend's JSON is inconsistent across resource kinds and product
//! vintages: list envelopes differ, numbers arrive as strings, fields go
//! missing. Each resource kind has a conversion function here that
//! defaults every missing field and never fails on a single item;
//! malformed variants are dropped rather than surfaced (a variant that
//! cannot be priced cannot be sold).

mod content;
mod orders;
mod products;

pub(crate) use content::{map_banner, map_brand, map_category, map_reward};
pub(crate) use orders::map_order;
pub(crate) use products::map_product;

use rust_decimal::Decimal;
use serde_json::Value;

use super::CatalogError;

// =============================================================================
// List Envelopes
// =============================================================================

/// Unwrap a list response: either a top-level array, or an object with a
/// `results` or `data` array field.
///
/// # Errors
///
/// Returns [`CatalogError::Envelope`] for any other shape, so callers can
/// tell a malformed response from a genuinely empty list.
pub(crate) fn extract_items(endpoint: &str, value: Value) -> Result<Vec<Value>, CatalogError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in ["results", "data"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err(CatalogError::Envelope(endpoint.to_string()))
        }
        _ => Err(CatalogError::Envelope(endpoint.to_string())),
    }
}

// =============================================================================
// Field Coercion
// =============================================================================

/// Outcome of reading a price-like field laxly.
///
/// `Missing` and `Invalid` are distinct on purpose: an absent price
/// defaults to zero, while a present-but-unparseable price disqualifies
/// the whole candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawPrice {
    Missing,
    Invalid,
    Value(Decimal),
}

/// Coerce a scalar to its string form. Numbers become their decimal
/// representation; everything else is `None`.
pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty string among the given keys.
pub(crate) fn string_field(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(key).and_then(coerce_string))
        .map(|s| s.trim().to_owned())
        .find(|s| !s.is_empty())
}

/// String field defaulting to empty.
pub(crate) fn string_or_empty(obj: &Value, keys: &[&str]) -> String {
    string_field(obj, keys).unwrap_or_default()
}

/// Parse a decimal out of a JSON number or numeric string.
pub(crate) fn decimal_from(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a price through a preference chain of keys.
///
/// The first key present with a non-null value decides: parseable wins,
/// unparseable is `Invalid`. Null values fall through to the next key,
/// matching the nullish-coalescing behavior of the original payload
/// consumers.
pub(crate) fn price_field(obj: &Value, keys: &[&str]) -> RawPrice {
    for key in keys {
        if let Some(raw) = obj.get(key)
            && !raw.is_null()
        {
            return decimal_from(raw).map_or(RawPrice::Invalid, RawPrice::Value);
        }
    }
    RawPrice::Missing
}

/// Optional decimal field; null, absent, and unparseable all collapse to
/// `None`.
pub(crate) fn opt_decimal_field(obj: &Value, key: &str) -> Option<Decimal> {
    obj.get(key).and_then(decimal_from)
}

/// Optional non-negative integer field (number or numeric string).
pub(crate) fn opt_u32_field(obj: &Value, key: &str) -> Option<u32> {
    let raw = obj.get(key)?;
    match raw {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer field defaulting to zero.
pub(crate) fn i64_field(obj: &Value, key: &str) -> i64 {
    obj.get(key)
        .and_then(|raw| match raw {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(0)
}

/// Float field defaulting to zero (ratings only - never prices).
pub(crate) fn f64_field(obj: &Value, key: &str) -> f64 {
    obj.get(key)
        .and_then(|raw| match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(0.0)
}
