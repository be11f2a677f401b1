//! CoinGecko source.
//!
//! Looks tokens up by Solana contract address. The demo API key, when
//! configured, is attached by the transport as `x_cg_demo_api_key`.
//! API documentation: https://docs.coingecko.com/reference/coins-contract-address

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{
    amount_text, decode, lenient_f64, lenient_i64, lenient_string, lenient_vec, non_zero, number,
    upper,
};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::CoinGecko;
const PLATFORM_ID: &str = "solana";
const NOT_FOUND: &str = "Token not found on CoinGecko";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /coins/{platform}/contract/{address}
#[derive(Debug, Deserialize)]
struct CoinResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default)]
    image: Option<Image>,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default, deserialize_with = "lenient_i64")]
    market_cap_rank: Option<i64>,
    #[serde(default)]
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
struct Image {
    #[serde(default, deserialize_with = "lenient_string")]
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Description {
    #[serde(default, deserialize_with = "lenient_string")]
    en: Option<String>,
}

/// Per-currency value map, only USD is read
#[derive(Debug, Default, Deserialize)]
struct Usd {
    #[serde(default, deserialize_with = "lenient_f64")]
    usd: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: Usd,
    #[serde(default)]
    market_cap: Usd,
    #[serde(default)]
    fully_diluted_valuation: Usd,
    #[serde(default)]
    total_volume: Usd,
    #[serde(default)]
    high_24h: Usd,
    #[serde(default)]
    low_24h: Usd,
    #[serde(default)]
    ath: Usd,
    #[serde(default)]
    atl: Usd,
    #[serde(default, deserialize_with = "lenient_f64")]
    price_change_percentage_24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap_change_percentage_24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    circulating_supply: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_supply: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    max_supply: Option<f64>,
}

/// Response from /coins/{platform}/contract/{address}/market_chart
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// [timestamp_ms, price] pairs
    #[serde(default, deserialize_with = "lenient_vec")]
    prices: Vec<Vec<Value>>,
    /// [timestamp_ms, volume] pairs, aligned with `prices`
    #[serde(default, deserialize_with = "lenient_vec")]
    total_volumes: Vec<Vec<Value>>,
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
            request: market_chart_request,
            map: map_history,
        }),
    }
}

fn coin_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/coins/{}/contract/{}", PLATFORM_ID, token))
}

fn market_chart_request(token: &TokenAddress, window: &HistoryWindow) -> ProviderRequest {
    ProviderRequest::get(
        PROVIDER,
        format!("/coins/{}/contract/{}/market_chart", PLATFORM_ID, token),
    )
    .query("vs_currency", "usd")
    .query("days", window.days)
}

fn map_snapshot(_token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    let coin: CoinResponse = decode(PROVIDER, payload)?;
    if coin.id.is_none() && coin.name.is_none() {
        return Err(MarketDataError::not_found(PROVIDER, NOT_FOUND));
    }

    let market = coin.market_data.unwrap_or_default();
    let mut snapshot = MarketSnapshot {
        name: coin.name,
        symbol: upper(coin.symbol),
        image: coin.image.and_then(|i| i.large),
        description: coin.description.and_then(|d| d.en),
        price: non_zero(market.current_price.usd),
        market_cap: non_zero(market.market_cap.usd),
        volume_24h: non_zero(market.total_volume.usd),
        price_change_24h: market.price_change_percentage_24h,
        total_supply: non_zero(market.total_supply).map(amount_text),
        ..Default::default()
    };

    snapshot.insert_extra("coingeckoId", coin.id.map(Value::String));
    snapshot.insert_extra("marketCapRank", coin.market_cap_rank.map(|v| json!(v)));
    snapshot.insert_extra("fdv", market.fully_diluted_valuation.usd.map(|v| json!(v)));
    snapshot.insert_extra("high24h", non_zero(market.high_24h.usd).map(|v| json!(v)));
    snapshot.insert_extra("low24h", non_zero(market.low_24h.usd).map(|v| json!(v)));
    snapshot.insert_extra("ath", non_zero(market.ath.usd).map(|v| json!(v)));
    snapshot.insert_extra("atl", non_zero(market.atl.usd).map(|v| json!(v)));
    snapshot.insert_extra(
        "marketCapChangePercentage24h",
        market.market_cap_change_percentage_24h.map(|v| json!(v)),
    );
    snapshot.insert_extra(
        "circulatingSupply",
        non_zero(market.circulating_supply).map(|v| json!(v)),
    );
    snapshot.insert_extra("maxSupply", market.max_supply.map(|v| json!(v)));

    Ok(snapshot)
}

fn map_history(_token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let chart: MarketChartResponse = decode(PROVIDER, payload)?;

    let points = chart
        .prices
        .iter()
        .enumerate()
        .filter_map(|(index, pair)| {
            let timestamp = number(pair.first()?)? as i64;
            let price = number(pair.get(1)?)?;
            let volume = chart
                .total_volumes
                .get(index)
                .and_then(|v| v.get(1))
                .and_then(number);
            Some(PricePoint::new(timestamp, price, volume))
        })
        .collect();
    Ok(points)
}
