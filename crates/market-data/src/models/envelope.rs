use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Uniform success/failure wrapper returned by every provider-facing call.
///
/// `success` is true iff `data` is present and `error` is absent. A failure
/// carries `data: None` and, normally, an informational `error` message.
/// Envelopes are never mutated once built; combinators return new ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Convert a fallible provider call into an envelope.
    pub fn from_result(result: Result<T, MarketDataError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success && self.data.is_some()
    }

    pub fn data(&self) -> Option<&T> {
        if self.success {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }

    /// Transform the payload, keeping timestamp and failure state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            timestamp: self.timestamp,
        }
    }

    /// Transform the payload with a fallible mapping; a mapping error turns
    /// the envelope into a failure.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Result<U, MarketDataError>) -> Envelope<U> {
        match self.into_result() {
            Ok(data) => Envelope::from_result(f(data)),
            Err(error) => Envelope::failure(error),
        }
    }

    /// Combine two envelopes that must both succeed.
    ///
    /// If either side failed, the result is a failure carrying `message`;
    /// partial success is not exposed.
    pub fn both<U>(first: Envelope<T>, second: Envelope<U>, message: &str) -> Envelope<(T, U)> {
        match (first.into_data(), second.into_data()) {
            (Some(a), Some(b)) => Envelope::ok((a, b)),
            _ => Envelope::failure(message),
        }
    }

    fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| "Unknown error".to_string())),
        }
    }
}
