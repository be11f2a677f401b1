use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of an external token data provider.
///
/// Declaration order is the order providers are reported in; it has no
/// bearing on field priority, which lives in
/// [`PriorityTable`](crate::reconcile::PriorityTable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    DexScreener,
    CoinGecko,
    CryptoCompare,
    GeckoTerminal,
    DefiLlama,
    Bitquery,
    Birdeye,
    PumpFun,
    RugCheck,
}

/// Number of known providers. Denominator of the success rate.
pub const PROVIDER_COUNT: usize = ProviderId::ALL.len();

impl ProviderId {
    /// Every provider, in report order.
    pub const ALL: [ProviderId; 9] = [
        ProviderId::DexScreener,
        ProviderId::CoinGecko,
        ProviderId::CryptoCompare,
        ProviderId::GeckoTerminal,
        ProviderId::DefiLlama,
        ProviderId::Bitquery,
        ProviderId::Birdeye,
        ProviderId::PumpFun,
        ProviderId::RugCheck,
    ];

    /// Stable snake_case tag, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DexScreener => "dex_screener",
            ProviderId::CoinGecko => "coin_gecko",
            ProviderId::CryptoCompare => "crypto_compare",
            ProviderId::GeckoTerminal => "gecko_terminal",
            ProviderId::DefiLlama => "defi_llama",
            ProviderId::Bitquery => "bitquery",
            ProviderId::Birdeye => "birdeye",
            ProviderId::PumpFun => "pump_fun",
            ProviderId::RugCheck => "rug_check",
        }
    }

    /// Human readable name, used in provider-specific error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::DexScreener => "DexScreener",
            ProviderId::CoinGecko => "CoinGecko",
            ProviderId::CryptoCompare => "CryptoCompare",
            ProviderId::GeckoTerminal => "GeckoTerminal",
            ProviderId::DefiLlama => "DeFi Llama",
            ProviderId::Bitquery => "Bitquery",
            ProviderId::Birdeye => "Birdeye",
            ProviderId::PumpFun => "Pump.fun",
            ProviderId::RugCheck => "RugCheck",
        }
    }

    /// Public API root used when no override is configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::DexScreener => "https://api.dexscreener.com",
            ProviderId::CoinGecko => "https://api.coingecko.com/api/v3",
            ProviderId::CryptoCompare => "https://min-api.cryptocompare.com",
            ProviderId::GeckoTerminal => "https://api.geckoterminal.com/api/v2",
            ProviderId::DefiLlama => "https://coins.llama.fi",
            ProviderId::Bitquery => "https://streaming.bitquery.io/graphql",
            ProviderId::Birdeye => "https://public-api.birdeye.so",
            ProviderId::PumpFun => "https://frontend-api.pump.fun",
            ProviderId::RugCheck => "https://api.rugcheck.xyz",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown provider: {}", s))
    }
}
