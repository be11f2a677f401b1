use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::history::PricePoint;
use super::security::SecurityReport;
use super::snapshot::MarketSnapshot;
use super::token::{TokenDetails, TokenField};
use super::types::ProviderId;

/// Everything learned about a token in one aggregation call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Reconciled canonical view
    pub token_details: TokenDetails,

    /// Raw per-provider envelopes, one per known provider
    pub sources: BTreeMap<ProviderId, Envelope<MarketSnapshot>>,

    /// Which provider supplied each populated canonical field
    pub provenance: BTreeMap<TokenField, ProviderId>,

    /// Series from the first history provider that had one
    pub price_history: Envelope<Vec<PricePoint>>,
}

/// Compact view of an aggregation with a trust signal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub holders: Option<u64>,

    /// Percentage of known providers that answered, two decimal places
    pub success_rate: Decimal,

    pub sources: BTreeMap<ProviderId, bool>,

    /// Security report, unmodified, when the security provider answered
    pub security: Option<SecurityReport>,

    pub timestamp: DateTime<Utc>,
}
