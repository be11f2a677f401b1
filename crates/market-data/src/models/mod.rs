//! Market data models
//!
//! This module contains the core data types for token aggregation:
//! - `types` - Provider identity (ProviderId) and the provider count
//! - `address` - Validated token address (TokenAddress)
//! - `envelope` - Uniform success/failure wrapper (Envelope)
//! - `snapshot` - Per-provider normalized data (MarketSnapshot)
//! - `security` - Risk report data (SecurityReport)
//! - `history` - Price series points and request window
//! - `token` - Canonical token entity (TokenDetails, TokenField)
//! - `aggregate` - Aggregation output (AggregateResult, TokenSummary)

mod address;
mod aggregate;
mod envelope;
mod history;
mod security;
mod snapshot;
mod token;
mod types;

pub use address::TokenAddress;
pub use aggregate::{AggregateResult, TokenSummary};
pub use envelope::Envelope;
pub use history::{normalize_epoch_millis, seconds_to_millis, HistoryWindow, PricePoint};
pub use security::SecurityReport;
pub use snapshot::MarketSnapshot;
pub use token::{TokenDetails, TokenField, DEFAULT_DECIMALS, UNKNOWN_NAME, UNKNOWN_SYMBOL};
pub use types::{ProviderId, PROVIDER_COUNT};
