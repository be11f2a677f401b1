//! Attempt tracking for history resolution diagnostics.

use crate::models::ProviderId;

/// Why a source did not provide the price history.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// No source is registered for this provider.
    NotRegistered,

    /// The source reported a failure envelope.
    Failed { message: String },

    /// The source succeeded but returned no points.
    Empty,

    /// The source panicked while fetching.
    Panicked { message: String },
}

/// Record of a single source attempt during resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryAttempt {
    pub provider: ProviderId,
    pub skipped: Option<SkipReason>,
    /// Number of points returned by the winning source
    pub points: usize,
}

/// Ordered record of every source consulted by one resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolutionDiagnostics {
    pub attempts: Vec<HistoryAttempt>,
}

impl ResolutionDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, provider: ProviderId, reason: SkipReason) {
        self.attempts.push(HistoryAttempt {
            provider,
            skipped: Some(reason),
            points: 0,
        });
    }

    pub fn record_success(&mut self, provider: ProviderId, points: usize) {
        self.attempts.push(HistoryAttempt {
            provider,
            skipped: None,
            points,
        });
    }

    /// Provider whose series was used, if any.
    pub fn winner(&self) -> Option<ProviderId> {
        self.attempts
            .iter()
            .find(|a| a.skipped.is_none())
            .map(|a| a.provider)
    }

    /// Providers that were tried and skipped, in order.
    pub fn skipped(&self) -> Vec<(ProviderId, &SkipReason)> {
        self.attempts
            .iter()
            .filter_map(|a| a.skipped.as_ref().map(|r| (a.provider, r)))
            .collect()
    }
}
