//! Token data source abstractions and implementations.
//!
//! This module contains:
//! - The `TokenDataSource` trait every source implements
//! - The `Transport` collaborator that performs HTTP calls
//! - The generic `SourceAdapter` and one `SourceProfile` per provider
//!
//! # Architecture
//!
//! Sources are described, not subclassed. Each provider module exposes a
//! `profile()` naming its request builders and payload mappings; the
//! `SourceAdapter` executes a profile over any `Transport`:
//!
//! ```text
//! SourceProfile ──► SourceAdapter ──► Transport::send ──► serde_json::Value
//!                         │                                      │
//!                         └──────── map into MarketSnapshot ◄────┘
//! ```
//!
//! Sources never return errors. Every outcome, including network failures
//! and unknown tokens, is reported as an [`Envelope`](crate::models::Envelope).

mod adapter;
mod guard;
pub(crate) mod json;
mod traits;
mod transport;

pub mod birdeye;
pub mod bitquery;
pub mod coin_gecko;
pub mod crypto_compare;
pub mod defi_llama;
pub mod dex_screener;
pub mod gecko_terminal;
pub mod pump_fun;
pub mod rug_check;

pub use adapter::{
    CompositeSnapshotFn, CurrentCall, HistoryCall, HistoryRequestFn, RequestFn, SeriesFn,
    SnapshotFn, SourceAdapter, SourceProfile,
};
pub use guard::catch_panic;
pub use traits::TokenDataSource;
pub use transport::{HttpMethod, HttpTransport, ProviderRequest, Transport};

use crate::models::ProviderId;

/// Built-in profile for a provider.
pub fn profile_for(provider: ProviderId) -> SourceProfile {
    match provider {
        ProviderId::DexScreener => dex_screener::profile(),
        ProviderId::CoinGecko => coin_gecko::profile(),
        ProviderId::CryptoCompare => crypto_compare::profile(),
        ProviderId::GeckoTerminal => gecko_terminal::profile(),
        ProviderId::DefiLlama => defi_llama::profile(),
        ProviderId::Bitquery => bitquery::profile(),
        ProviderId::Birdeye => birdeye::profile(),
        ProviderId::PumpFun => pump_fun::profile(),
        ProviderId::RugCheck => rug_check::profile(),
    }
}
