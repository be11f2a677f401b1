//! Price history resolution.
//!
//! History is resolved with a chain of responsibility over the registered
//! sources rather than merged:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     HistoryResolver                       │
//! │                                                           │
//! │  DexScreener ─► CoinGecko ─► GeckoTerminal ─► DeFi Llama  │
//! │        ─► Birdeye ─► Pump.fun                             │
//! │                                                           │
//! │  failure / empty / panic / not registered ─► next source  │
//! │  first non-empty series ─► done                           │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod history;
mod skip_reason;

pub use history::{HistoryResolver, NO_HISTORY};
pub use skip_reason::{HistoryAttempt, ResolutionDiagnostics, SkipReason};
