//! DeFi Llama coins source.
//!
//! Prices are keyed by `{chain}:{address}`.
//! API documentation: https://defillama.com/docs/api

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{
    seconds_to_millis, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress,
};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{
    decode, lenient_f64, lenient_i64, lenient_string, lenient_vec, non_zero, upper,
};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::DefiLlama;
const CHAIN: &str = "solana";
const NOT_FOUND: &str = "Token not found on DeFi Llama";
const HISTORY_NOT_FOUND: &str = "Price history not found";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /prices/current and /prices/historical
#[derive(Debug, Deserialize)]
struct CoinsResponse<C> {
    #[serde(default = "HashMap::new")]
    coins: HashMap<String, C>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCoin {
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    volume24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price_change24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    decimals: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HistoricalCoin {
    #[serde(default, deserialize_with = "lenient_vec")]
    prices: Vec<HistoricalPrice>,
}

#[derive(Debug, Deserialize)]
struct HistoricalPrice {
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient_i64")]
    timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
}

// ============================================================================
// Profile
// ============================================================================

pub fn profile() -> SourceProfile {
    SourceProfile {
        id: PROVIDER,
        current: CurrentCall::Single {
            request: current_request,
            map: map_snapshot,
        },
        history: Some(HistoryCall {
            request: historical_request,
            map: map_history,
        }),
    }
}

fn coin_key(token: &TokenAddress) -> String {
    format!("{}:{}", CHAIN, token)
}

fn current_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/prices/current/{}", coin_key(token)))
}

fn historical_request(token: &TokenAddress, window: &HistoryWindow) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/prices/historical/{}", coin_key(token)))
        .query("span", window.days)
}

fn map_snapshot(token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    let mut response: CoinsResponse<CurrentCoin> = decode(PROVIDER, payload)?;
    let coin = response
        .coins
        .remove(&coin_key(token))
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, NOT_FOUND))?;

    let mut snapshot = MarketSnapshot {
        symbol: upper(coin.symbol),
        price: non_zero(coin.price),
        market_cap: non_zero(coin.market_cap),
        volume_24h: non_zero(coin.volume24h),
        price_change_24h: coin.price_change24h,
        ..Default::default()
    };
    snapshot.insert_extra("decimals", coin.decimals.map(|v| json!(v)));
    snapshot.insert_extra("confidence", coin.confidence.map(|v| json!(v)));

    Ok(snapshot)
}

fn map_history(token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let mut response: CoinsResponse<HistoricalCoin> = decode(PROVIDER, payload)?;
    let coin = response
        .coins
        .remove(&coin_key(token))
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, HISTORY_NOT_FOUND))?;

    Ok(coin
        .prices
        .into_iter()
        .filter_map(|p| Some(PricePoint::new(seconds_to_millis(p.timestamp?), p.price?, None)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::adapter::testing::token;

    #[test]
    fn test_maps_keyed_coin() {
        let key = coin_key(&token());
        let payload = json!({
            "coins": {
                key: {
                    "decimals": 6,
                    "symbol": "usdc",
                    "price": 0.9998,
                    "timestamp": 1700000000,
                    "confidence": 0.99
                }
            }
        });
        let snapshot = map_snapshot(&token(), payload).unwrap();
        assert_eq!(snapshot.symbol.as_deref(), Some("USDC"));
        assert_eq!(snapshot.price, Some(0.9998));
        assert!(snapshot.market_cap.is_none());
        assert!(snapshot.volume_24h.is_none());
        assert_eq!(snapshot.extras["decimals"], json!(6));
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let err = map_snapshot(&token(), json!({ "coins": {} })).unwrap_err();
        assert_eq!(err.to_string(), NOT_FOUND);
    }

    #[test]
    fn test_history_null_prices_is_empty() {
        let key = coin_key(&token());
        let payload = json!({ "coins": { key: { "prices": null } } });
        let points = map_history(&token(), payload).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_history_converts_seconds() {
        let key = coin_key(&token());
        let payload = json!({
            "coins": {
                key: {
                    "prices": [
                        { "timestamp": 1700000000, "price": 1.0 },
                        { "timestamp": 1700086400, "price": 1.01 }
                    ]
                }
            }
        });
        let points = map_history(&token(), payload).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], PricePoint::new(1_700_086_400_000, 1.01, None));

        let request = historical_request(&token(), &HistoryWindow::default());
        assert_eq!(
            request.path,
            format!("/prices/historical/{}", coin_key(&token()))
        );
        assert_eq!(request.query_value("span"), Some("7"));
    }
}
