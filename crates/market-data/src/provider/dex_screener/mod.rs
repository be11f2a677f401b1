//! DexScreener source.
//!
//! Uses the public `/latest/dex/tokens/{address}` endpoint and reads the
//! first (most liquid) pair. No API key is required.
//! API documentation: https://docs.dexscreener.com/api/reference

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{
    normalize_epoch_millis, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress,
};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{decode, lenient_f64, lenient_i64, lenient_string, lenient_vec, upper};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::DexScreener;
const NOT_FOUND: &str = "No data found";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /latest/dex/tokens/{address}
#[derive(Debug, Deserialize)]
struct TokensResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    #[serde(default, deserialize_with = "lenient_string")]
    pair_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    dex_id: Option<String>,
    #[serde(default)]
    base_token: Option<BaseToken>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price_usd: Option<f64>,
    #[serde(default)]
    price_change: Option<Windows>,
    #[serde(default)]
    volume: Option<Windows>,
    #[serde(default)]
    liquidity: Option<Liquidity>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fdv: Option<f64>,
    /// Pair creation time, epoch milliseconds
    #[serde(default, deserialize_with = "lenient_i64")]
    pair_created_at: Option<i64>,
    #[serde(default)]
    info: Option<Info>,
    /// Not part of the documented schema; present on some pairs
    #[serde(default)]
    price_history: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct BaseToken {
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
}

/// Values keyed by time window (m5, h1, h6, h24)
#[derive(Debug, Default, Deserialize)]
struct Windows {
    #[serde(default, deserialize_with = "lenient_f64")]
    m5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    h1: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    h6: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Liquidity {
    #[serde(default, deserialize_with = "lenient_f64")]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Info {
    #[serde(default, deserialize_with = "lenient_string")]
    image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    websites: Vec<Website>,
    #[serde(default, deserialize_with = "lenient_vec")]
    socials: Vec<Social>,
}

#[derive(Debug, Deserialize)]
struct Website {
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Social {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
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
            request: tokens_request,
            map: map_snapshot,
        },
        history: Some(HistoryCall {
            request: history_request,
            map: map_history,
        }),
    }
}

fn tokens_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/latest/dex/tokens/{}", token))
}

fn history_request(token: &TokenAddress, _window: &HistoryWindow) -> ProviderRequest {
    tokens_request(token)
}

fn first_pair(payload: Value) -> Result<Pair, MarketDataError> {
    let response: TokensResponse = decode(PROVIDER, payload)?;
    response
        .pairs
        .and_then(|pairs| pairs.into_iter().next())
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, NOT_FOUND))
}

fn map_snapshot(_token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    let pair = first_pair(payload)?;
    let price_change = pair.price_change.unwrap_or_default();
    let volume = pair.volume.unwrap_or_default();
    let (name, symbol) = pair
        .base_token
        .map(|t| (t.name, t.symbol))
        .unwrap_or_default();

    let mut snapshot = MarketSnapshot {
        name,
        symbol: upper(symbol),
        price: pair.price_usd,
        market_cap: pair.market_cap,
        volume_24h: volume.h24,
        price_change_24h: price_change.h24,
        created_at: pair.pair_created_at.map(normalize_epoch_millis),
        ..Default::default()
    };

    if let Some(info) = pair.info {
        snapshot.image = info.image_url;
        snapshot.website = info.websites.into_iter().find_map(|w| w.url);
        for social in info.socials {
            let kind = social.kind.unwrap_or_default().to_ascii_lowercase();
            let slot = match kind.as_str() {
                "twitter" | "x" => &mut snapshot.twitter,
                "telegram" => &mut snapshot.telegram,
                "discord" => &mut snapshot.discord,
                _ => continue,
            };
            if slot.is_none() {
                *slot = social.url;
            }
        }
    }

    snapshot.insert_extra("priceChange5m", price_change.m5.map(|v| json!(v)));
    snapshot.insert_extra("priceChange1h", price_change.h1.map(|v| json!(v)));
    snapshot.insert_extra("priceChange6h", price_change.h6.map(|v| json!(v)));
    snapshot.insert_extra("liquidity", pair.liquidity.and_then(|l| l.usd).map(|v| json!(v)));
    snapshot.insert_extra("fdv", pair.fdv.map(|v| json!(v)));
    snapshot.insert_extra("pairAddress", pair.pair_address.map(Value::String));
    snapshot.insert_extra("dexId", pair.dex_id.map(Value::String));

    Ok(snapshot)
}

fn map_history(_token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let pair = first_pair(payload)?;
    let points = pair
        .price_history
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<HistoryEntry>(entry).ok())
        .filter_map(|entry| {
            let timestamp = normalize_epoch_millis(entry.timestamp?);
            Some(PricePoint::new(timestamp, entry.price?, entry.volume))
        })
        .collect();
    Ok(points)
}
