//! Runtime configuration for the HTTP transport and aggregation defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::{HistoryWindow, ProviderId};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration loaded from the environment (and `.env`, if present).
#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    pub coingecko_api_key: Option<String>,
    pub crypto_compare_api_key: Option<String>,
    pub bitquery_api_key: Option<String>,
    pub birdeye_api_key: Option<String>,
    /// Per-call budget; a request exceeding it fails like any other error.
    pub request_timeout: Duration,
    pub user_agent: String,
    pub history_window: HistoryWindow,
    /// Base URL overrides, keyed by provider
    pub base_urls: BTreeMap<ProviderId, String>,
}

impl MarketDataConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable numbers fall back to
    /// their defaults; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_ms = get("MEMESCOPE_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let defaults = HistoryWindow::default();
        let history_window = HistoryWindow {
            days: get("MEMESCOPE_HISTORY_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.days),
            max_points: get("MEMESCOPE_HISTORY_POINTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_points),
        };

        let base_urls = ProviderId::ALL
            .into_iter()
            .filter_map(|provider| {
                let key = format!("MEMESCOPE_{}_BASE_URL", provider.as_str().to_uppercase());
                get(&key).map(|url| (provider, url.trim_end_matches('/').to_string()))
            })
            .collect();

        Self {
            coingecko_api_key: get("COINGECKO_API_KEY"),
            crypto_compare_api_key: get("CRYPTOCOMPARE_API_KEY"),
            bitquery_api_key: get("BITQUERY_API_KEY"),
            birdeye_api_key: get("BIRDEYE_API_KEY"),
            request_timeout: Duration::from_millis(timeout_ms),
            user_agent: get("MEMESCOPE_USER_AGENT")
                .unwrap_or_else(|| format!("memescope/{}", env!("CARGO_PKG_VERSION"))),
            history_window,
            base_urls,
        }
    }

    /// Base URL for a provider, honouring overrides.
    pub fn base_url(&self, provider: ProviderId) -> &str {
        self.base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_base_url())
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
