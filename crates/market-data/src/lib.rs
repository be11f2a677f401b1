//! Memescope Market Data Crate
//!
//! This crate aggregates Solana token data from several independent public
//! providers and reconciles it into one canonical view.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Nine providers: DexScreener, CoinGecko, CryptoCompare, GeckoTerminal,
//!   DeFi Llama, Bitquery, Birdeye, Pump.fun and RugCheck
//! - Concurrent fan-out where one provider's failure never affects another
//! - Per-field reconciliation driven by a priority table
//! - Sequential price history fallback across providers
//!
//! # Architecture
//!
//! ```text
//!                          +------------------+
//!                          |  TokenAggregator |  (validate, fan out, join)
//!                          +------------------+
//!                             |            |
//!                 concurrent  |            |  sequential
//!                             v            v
//!                  +----------------+  +------------------+
//!                  | SourceRegistry |  | HistoryResolver  |  (first non-empty wins)
//!                  +----------------+  +------------------+
//!                             |            |
//!                             v            v
//!                          +------------------+
//!                          |  SourceAdapter   |  (per-provider profile)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Transport     |  (HTTP, or fake in tests)
//!                          +------------------+
//!
//!   Envelope<MarketSnapshot> x 9 --> FieldReconciler --> TokenDetails
//!                                                    --> TokenSummary
//! ```
//!
//! # Core Types
//!
//! - [`TokenAddress`] - Validated Solana mint address
//! - [`Envelope`] - Success/failure wrapper returned by every source call
//! - [`MarketSnapshot`] - One provider's normalized view of a token
//! - [`TokenDetails`] - Reconciled canonical token
//! - [`AggregateResult`] - Details plus raw envelopes and price history
//! - [`TokenSummary`] - Compact view with success rate and security report

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod reconcile;
pub mod registry;
pub mod resolver;

// Re-export all public types from models
pub use models::{
    AggregateResult, Envelope, HistoryWindow, MarketSnapshot, PricePoint, ProviderId,
    SecurityReport, TokenAddress, TokenDetails, TokenField, TokenSummary, PROVIDER_COUNT,
};

pub use aggregator::{success_rate, TokenAggregator};
pub use config::MarketDataConfig;
pub use errors::MarketDataError;
pub use provider::{HttpTransport, SourceAdapter, SourceProfile, TokenDataSource, Transport};
pub use reconcile::{FieldReconciler, PriorityTable};
pub use registry::SourceRegistry;
pub use resolver::{HistoryResolver, ResolutionDiagnostics, NO_HISTORY};
