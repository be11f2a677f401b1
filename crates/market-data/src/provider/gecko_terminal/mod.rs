//! GeckoTerminal source.
//!
//! Reads the Solana token resource (`/networks/solana/tokens/{address}`) and
//! its daily OHLCV series. No API key is required.
//! API documentation: https://api.geckoterminal.com/docs

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{
    seconds_to_millis, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress,
};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{
    decode, lenient_f64, lenient_string, lenient_vec, non_zero, number, upper,
};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::GeckoTerminal;
const NETWORK: &str = "solana";
const NOT_FOUND: &str = "Token not found on GeckoTerminal";
const HISTORY_NOT_FOUND: &str = "Price history not found";

// ============================================================================
// API Response Structures
// ============================================================================

/// JSON:API style envelope used by every GeckoTerminal endpoint
#[derive(Debug, Deserialize)]
struct Document<A> {
    #[serde(default = "Option::default")]
    data: Option<Resource<A>>,
}

#[derive(Debug, Deserialize)]
struct Resource<A> {
    attributes: A,
}

#[derive(Debug, Deserialize)]
struct TokenAttributes {
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price_usd: Option<f64>,
    #[serde(default)]
    price_change_percentage: Option<H24>,
    #[serde(default)]
    volume_usd: Option<H24>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    fdv_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_reserve_in_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct H24 {
    #[serde(default, deserialize_with = "lenient_f64")]
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OhlcvAttributes {
    /// [timestamp_s, open, high, low, close, volume]
    #[serde(default, deserialize_with = "lenient_vec")]
    ohlcv_list: Vec<Vec<Value>>,
}

// ============================================================================
// Profile
// ============================================================================

pub fn profile() -> SourceProfile {
    SourceProfile {
        id: PROVIDER,
        current: CurrentCall::Single {
            request: token_request,
            map: map_snapshot,
        },
        history: Some(HistoryCall {
            request: ohlcv_request,
            map: map_history,
        }),
    }
}

fn token_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/networks/{}/tokens/{}", NETWORK, token))
}

fn ohlcv_request(token: &TokenAddress, window: &HistoryWindow) -> ProviderRequest {
    ProviderRequest::get(
        PROVIDER,
        format!("/networks/{}/tokens/{}/ohlcv/day", NETWORK, token),
    )
    .query("limit", window.days)
}

fn map_snapshot(_token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    let document: Document<TokenAttributes> = decode(PROVIDER, payload)?;
    let attributes = document
        .data
        .map(|r| r.attributes)
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, NOT_FOUND))?;

    let mut snapshot = MarketSnapshot {
        name: attributes.name,
        symbol: upper(attributes.symbol),
        image: attributes.image_url.filter(|url| url != "missing.png"),
        price: attributes.price_usd,
        price_change_24h: attributes.price_change_percentage.and_then(|p| p.h24),
        volume_24h: non_zero(attributes.volume_usd.and_then(|v| v.h24)),
        market_cap: non_zero(attributes.market_cap_usd),
        ..Default::default()
    };
    snapshot.insert_extra("fdv", non_zero(attributes.fdv_usd).map(|v| json!(v)));
    snapshot.insert_extra(
        "totalReserveUsd",
        attributes.total_reserve_in_usd.map(|v| json!(v)),
    );

    Ok(snapshot)
}

fn map_history(_token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let document: Document<OhlcvAttributes> = decode(PROVIDER, payload)?;
    let candles = document
        .data
        .map(|r| r.attributes.ohlcv_list)
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, HISTORY_NOT_FOUND))?;

    Ok(candles
        .iter()
        .filter_map(|candle| {
            let timestamp = seconds_to_millis(number(candle.first()?)? as i64);
            let close = number(candle.get(4)?)?;
            let volume = candle.get(5).and_then(number);
            Some(PricePoint::new(timestamp, close, volume))
        })
        .collect())
}
