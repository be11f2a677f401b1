use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::TokenAddress;

/// Name used when no provider reports one.
pub const UNKNOWN_NAME: &str = "Unknown Token";
/// Symbol used when no provider reports one.
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";
/// Decimals reported for every token; never sourced from a provider.
pub const DEFAULT_DECIMALS: u8 = 6;

/// Reconcilable fields of [`TokenDetails`].
///
/// `address`, `decimals` and `updated_at` are not listed: they never come
/// from a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenField {
    Name,
    Symbol,
    TotalSupply,
    MarketCap,
    Price,
    PriceChange24h,
    Volume24h,
    Holders,
    Image,
    Description,
    Website,
    Twitter,
    Telegram,
    Discord,
    CreatedAt,
}

impl TokenField {
    pub const ALL: [TokenField; 15] = [
        TokenField::Name,
        TokenField::Symbol,
        TokenField::TotalSupply,
        TokenField::MarketCap,
        TokenField::Price,
        TokenField::PriceChange24h,
        TokenField::Volume24h,
        TokenField::Holders,
        TokenField::Image,
        TokenField::Description,
        TokenField::Website,
        TokenField::Twitter,
        TokenField::Telegram,
        TokenField::Discord,
        TokenField::CreatedAt,
    ];
}

/// Canonical, reconciled view of a token.
///
/// Each optional field holds a value taken verbatim from exactly one
/// provider, or `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Option<String>,
    pub market_cap: Option<f64>,
    pub price: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub holders: Option<u64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
    /// Epoch milliseconds
    pub created_at: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl TokenDetails {
    /// Details with every fallback applied; what a token looks like when no
    /// provider answered.
    pub fn unknown(address: &TokenAddress) -> Self {
        Self {
            address: address.to_string(),
            name: UNKNOWN_NAME.to_string(),
            symbol: UNKNOWN_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            total_supply: None,
            market_cap: None,
            price: None,
            price_change_24h: None,
            volume_24h: None,
            holders: None,
            description: None,
            image: None,
            website: None,
            twitter: None,
            telegram: None,
            discord: None,
            created_at: None,
            updated_at: Utc::now(),
        }
    }
}
