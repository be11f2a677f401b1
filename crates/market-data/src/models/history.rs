use serde::{Deserialize, Serialize};

/// Timestamps below this are taken to be epoch seconds rather than millis.
///
/// 10^12 ms is September 2001; 10^12 s is far beyond any plausible date.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// A single point of a price series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    /// USD price
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64, volume: Option<f64>) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }
}

/// How much history to ask providers for.
///
/// Day-based providers use `days`; providers that page by point count use
/// `max_points`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryWindow {
    pub days: u32,
    pub max_points: u32,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            days: 7,
            max_points: 100,
        }
    }
}

/// Convert epoch seconds to epoch milliseconds.
pub fn seconds_to_millis(seconds: i64) -> i64 {
    seconds.saturating_mul(1000)
}

/// Normalize a timestamp of unknown unit to epoch milliseconds.
pub fn normalize_epoch_millis(timestamp: i64) -> i64 {
    if timestamp.abs() < MILLIS_THRESHOLD {
        seconds_to_millis(timestamp)
    } else {
        timestamp
    }
}
