use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::security::SecurityReport;

/// Normalized view of what one provider knows about a token.
///
/// Every field is optional: a provider that does not report a value leaves
/// it `None`. Adapters never substitute zero or empty strings for missing
/// values. Provider-specific detail that has no common field goes into
/// `extras` and is preserved for callers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Upper-cased ticker symbol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// USD price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// USD market capitalization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    /// 24h USD volume
    #[serde(rename = "volume24h", skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,

    /// 24h price change, in percent
    #[serde(rename = "priceChange24h", skip_serializing_if = "Option::is_none")]
    pub price_change_24h: Option<f64>,

    /// Total supply as reported (kept as text, supplies overflow f64 precision)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub holders: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,

    /// Creation time in epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    /// Risk report, only populated by security-scoring providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityReport>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Value>,
}

impl MarketSnapshot {
    /// Record a provider-specific value, skipping absent ones.
    pub fn insert_extra(&mut self, key: &str, value: Option<Value>) {
        if let Some(value) = value {
            if !value.is_null() {
                self.extras.insert(key.to_string(), value);
            }
        }
    }
}
