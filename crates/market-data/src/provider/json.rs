//! Lenient decoding helpers for provider payloads.
//!
//! Providers disagree on whether numbers are JSON numbers or strings, and
//! often send `""` or `0` placeholders. These helpers decode to `None`
//! whenever a value is missing, blank or not a finite number.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::ProviderId;

/// Finite f64 from a JSON number or numeric string.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Integer from a JSON number or numeric string, truncating fractions.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Non-blank string, trimmed. Numbers are rendered as text.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(number))
}

pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(integer))
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(text))
}

/// List that decodes `null`, a missing key or a non-array as empty.
///
/// Items that do not decode are dropped rather than failing the payload.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Decode a provider payload into its typed response.
pub fn decode<T>(provider: ProviderId, value: Value) -> Result<T, MarketDataError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(value).map_err(|e| MarketDataError::parse(provider, e))
}

/// Upper-case a symbol.
pub fn upper(symbol: Option<String>) -> Option<String> {
    symbol.map(|s| s.to_uppercase())
}

/// Render an amount without a trailing `.0` for whole numbers.
pub fn amount_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Drop zero placeholders some providers send for "unknown".
pub fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}
