//! Pump.fun source.
//!
//! Bonding-curve launchpad. The frontend API has no price field; the price
//! is derived as `usd_market_cap / total_supply`.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{
    normalize_epoch_millis, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress,
};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{amount_text, decode, lenient_f64, lenient_i64, lenient_string, upper};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::PumpFun;
const NOT_FOUND: &str = "No data received from Pump.fun";
const HISTORY_NOT_FOUND: &str = "No price history data available";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /coins/{mint}
#[derive(Debug, Deserialize)]
struct Coin {
    #[serde(default, deserialize_with = "lenient_string")]
    mint: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    image_uri: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    website: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    twitter: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    telegram: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_supply: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    usd_market_cap: Option<f64>,
    /// Seconds or milliseconds depending on API version
    #[serde(default, deserialize_with = "lenient_i64")]
    created_timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    bonding_curve: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    creator: Option<String>,
    #[serde(default)]
    complete: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    raydium_pool: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    market_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    reply_count: Option<i64>,
    #[serde(default)]
    nsfw: Option<bool>,
    #[serde(default)]
    is_currently_live: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct HistoryItem {
    #[serde(default, deserialize_with = "lenient_i64")]
    timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    volume: Option<f64>,
}

// ============================================================================
// Profile
// ============================================================================

pub fn profile() -> SourceProfile {
    SourceProfile {
        id: PROVIDER,
        current: CurrentCall::Single {
            request: coin_request,
            map: map_snapshot,
        },
        history: Some(HistoryCall {
            request: history_request,
            map: map_history,
        }),
    }
}

fn coin_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/coins/{}", token))
}

fn history_request(token: &TokenAddress, window: &HistoryWindow) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/coins/{}/price_history", token))
        .query("limit", window.max_points)
}

fn derived_price(market_cap: Option<f64>, supply: Option<f64>) -> Option<f64> {
    match (market_cap, supply) {
        (Some(cap), Some(supply)) if supply > 0.0 => Some(cap / supply),
        _ => None,
    }
}

fn map_snapshot(_token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    if !payload.is_object() {
        return Err(MarketDataError::not_found(PROVIDER, NOT_FOUND));
    }
    let coin: Coin = decode(PROVIDER, payload)?;
    if coin.mint.is_none() && coin.name.is_none() {
        return Err(MarketDataError::not_found(PROVIDER, NOT_FOUND));
    }

    let mut snapshot = MarketSnapshot {
        name: coin.name,
        symbol: upper(coin.symbol),
        description: coin.description,
        image: coin.image_uri,
        website: coin.website,
        twitter: coin.twitter,
        telegram: coin.telegram,
        price: derived_price(coin.usd_market_cap, coin.total_supply),
        market_cap: coin.usd_market_cap,
        total_supply: coin.total_supply.map(amount_text),
        created_at: coin.created_timestamp.map(normalize_epoch_millis),
        ..Default::default()
    };

    snapshot.insert_extra("bondingCurve", coin.bonding_curve.map(Value::String));
    snapshot.insert_extra("creator", coin.creator.map(Value::String));
    snapshot.insert_extra("isComplete", coin.complete.map(Value::Bool));
    snapshot.insert_extra("hasRaydiumPool", Some(Value::Bool(coin.raydium_pool.is_some())));
    snapshot.insert_extra("marketId", coin.market_id.map(Value::String));
    snapshot.insert_extra("replyCount", coin.reply_count.map(|v| json!(v)));
    snapshot.insert_extra("isNsfw", coin.nsfw.map(Value::Bool));
    snapshot.insert_extra("isLive", coin.is_currently_live.map(Value::Bool));

    Ok(snapshot)
}

fn map_history(_token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let Value::Array(items) = payload else {
        return Err(MarketDataError::not_found(PROVIDER, HISTORY_NOT_FOUND));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<HistoryItem>(item).ok())
        .filter_map(|item| {
            Some(PricePoint::new(
                normalize_epoch_millis(item.timestamp?),
                item.price?,
                item.volume,
            ))
        })
        .collect())
}
