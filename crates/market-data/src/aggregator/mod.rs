//! Aggregation entry points.
//!
//! - `aggregator` - fan-out, history resolution and reconciliation (TokenAggregator)
//! - `summary` - success rate and per-provider flags (TokenSummary)

mod aggregator;
mod summary;

pub use aggregator::TokenAggregator;
pub use summary::{success_rate, summarize, SUCCESS_RATE_DP};
