//! Birdeye source.
//!
//! Birdeye wraps every payload in `{ success, data }` and only answers for
//! the chain named in the `x-chain` header, which the transport sets to
//! `solana` together with the API key.
//! API documentation: https://docs.birdeye.so

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{
    seconds_to_millis, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress,
};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{decode, lenient_f64, lenient_i64, lenient_string, upper};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::Birdeye;
const NOT_FOUND: &str = "No data received from Birdeye";
const HISTORY_NOT_FOUND: &str = "No price history data available";
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct BirdeyeResponse<D> {
    #[serde(default)]
    success: bool,
    #[serde(default = "Option::default")]
    data: Option<D>,
}

/// `data` of /defi/token_overview
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenOverview {
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    decimals: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(
        default,
        alias = "price_change_24h",
        rename = "priceChange24hPercent",
        deserialize_with = "lenient_f64"
    )]
    price_change_24h: Option<f64>,
    #[serde(default, alias = "volume_24h", rename = "v24hUSD", deserialize_with = "lenient_f64")]
    volume_24h: Option<f64>,
    #[serde(default, alias = "market_cap", rename = "mc", deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    liquidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    holder: Option<i64>,
    #[serde(default, alias = "image_uri", rename = "logoURI", deserialize_with = "lenient_string")]
    image: Option<String>,
    #[serde(
        default,
        alias = "last_trade_unix_time",
        rename = "lastTradeUnixTime",
        deserialize_with = "lenient_i64"
    )]
    last_trade_unix_time: Option<i64>,
}

/// `data` of /defi/history_price
#[derive(Debug, Deserialize)]
struct PriceHistory {
    #[serde(default)]
    items: Option<Vec<PriceItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceItem {
    #[serde(default, deserialize_with = "lenient_i64")]
    unix_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    value: Option<f64>,
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
            request: overview_request,
            map: map_snapshot,
        },
        history: Some(HistoryCall {
            request: history_request,
            map: map_history,
        }),
    }
}

fn overview_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, "/defi/token_overview").query("address", token)
}

fn history_request(token: &TokenAddress, window: &HistoryWindow) -> ProviderRequest {
    let time_from = Utc::now().timestamp() - i64::from(window.days) * SECONDS_PER_DAY;
    ProviderRequest::get(PROVIDER, "/defi/history_price")
        .query("address", token)
        .query("type", "1D")
        .query("time_from", time_from)
}

/// Unwrap `{ success, data }`; anything but a successful payload is `message`.
fn unwrap_data<D>(payload: Value, message: &str) -> Result<D, MarketDataError>
where
    D: for<'de> Deserialize<'de>,
{
    let response: BirdeyeResponse<D> = decode(PROVIDER, payload)?;
    match response {
        BirdeyeResponse {
            success: true,
            data: Some(data),
        } => Ok(data),
        _ => Err(MarketDataError::not_found(PROVIDER, message)),
    }
}

fn map_snapshot(_token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    let overview: TokenOverview = unwrap_data(payload, NOT_FOUND)?;

    let mut snapshot = MarketSnapshot {
        name: overview.name,
        symbol: upper(overview.symbol),
        image: overview.image,
        price: overview.price,
        price_change_24h: overview.price_change_24h,
        volume_24h: overview.volume_24h,
        market_cap: overview.market_cap,
        holders: overview.holder.and_then(|h| u64::try_from(h).ok()),
        ..Default::default()
    };
    snapshot.insert_extra("liquidity", overview.liquidity.map(|v| json!(v)));
    snapshot.insert_extra("decimals", overview.decimals.map(|v| json!(v)));
    snapshot.insert_extra(
        "lastTradeAt",
        overview
            .last_trade_unix_time
            .map(|t| json!(seconds_to_millis(t))),
    );

    Ok(snapshot)
}

fn map_history(_token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let history: PriceHistory = unwrap_data(payload, HISTORY_NOT_FOUND)?;
    let items = history
        .items
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, HISTORY_NOT_FOUND))?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            Some(PricePoint::new(
                seconds_to_millis(item.unix_time?),
                item.value?,
                item.volume,
            ))
        })
        .collect())
}
