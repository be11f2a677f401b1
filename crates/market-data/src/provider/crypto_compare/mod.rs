//! CryptoCompare source.
//!
//! CryptoCompare is keyed by ticker rather than mint address; the token key
//! is sent upper-cased as `fsym`. Long Solana mints are rarely listed, so
//! this source commonly reports not-found.
//! API documentation: https://min-api.cryptocompare.com/documentation

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{
    seconds_to_millis, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress,
};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{amount_text, decode, lenient_f64, lenient_i64, lenient_string};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::CryptoCompare;
const QUOTE_CURRENCY: &str = "USD";
const NOT_FOUND: &str = "Token not found on CryptoCompare";
const HISTORY_NOT_FOUND: &str = "Price history not found";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /data/pricemultifull
#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct PriceMultiFullResponse {
    #[serde(default)]
    raw: HashMap<String, HashMap<String, RawQuote>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct RawQuote {
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    mktcap: Option<f64>,
    #[serde(default, rename = "TOTALVOLUME24HTO", deserialize_with = "lenient_f64")]
    total_volume_24h_to: Option<f64>,
    #[serde(default, rename = "CHANGEPCT24HOUR", deserialize_with = "lenient_f64")]
    change_pct_24h: Option<f64>,
    #[serde(default, rename = "HIGH24HOUR", deserialize_with = "lenient_f64")]
    high_24h: Option<f64>,
    #[serde(default, rename = "LOW24HOUR", deserialize_with = "lenient_f64")]
    low_24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    supply: Option<f64>,
}

/// Response from /data/v2/histoday
#[derive(Debug, Deserialize)]
struct HistoDayResponse {
    #[serde(rename = "Response", default, deserialize_with = "lenient_string")]
    response: Option<String>,
    #[serde(rename = "Data", default)]
    data: Option<HistoDayData>,
}

#[derive(Debug, Deserialize)]
struct HistoDayData {
    #[serde(rename = "Data", default)]
    data: Option<Vec<Candle>>,
}

#[derive(Debug, Deserialize)]
struct Candle {
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient_i64")]
    time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    close: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    volumeto: Option<f64>,
}

// ============================================================================
// Profile
// ============================================================================

pub fn profile() -> SourceProfile {
    SourceProfile {
        id: PROVIDER,
        current: CurrentCall::Single {
            request: price_request,
            map: map_snapshot,
        },
        history: Some(HistoryCall {
            request: histoday_request,
            map: map_history,
        }),
    }
}

fn symbol_key(token: &TokenAddress) -> String {
    token.as_str().to_uppercase()
}

fn price_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, "/data/pricemultifull")
        .query("fsym", symbol_key(token))
        .query("tsyms", QUOTE_CURRENCY)
}

fn histoday_request(token: &TokenAddress, window: &HistoryWindow) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, "/data/v2/histoday")
        .query("fsym", symbol_key(token))
        .query("tsym", QUOTE_CURRENCY)
        .query("limit", window.days)
}

fn map_snapshot(token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    let mut response: PriceMultiFullResponse = decode(PROVIDER, payload)?;
    let quote = response
        .raw
        .remove(&symbol_key(token))
        .and_then(|mut by_currency| by_currency.remove(QUOTE_CURRENCY))
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, NOT_FOUND))?;

    let mut snapshot = MarketSnapshot {
        price: quote.price,
        market_cap: quote.mktcap,
        volume_24h: quote.total_volume_24h_to,
        price_change_24h: quote.change_pct_24h,
        total_supply: quote.supply.map(amount_text),
        ..Default::default()
    };
    snapshot.insert_extra("high24h", quote.high_24h.map(|v| json!(v)));
    snapshot.insert_extra("low24h", quote.low_24h.map(|v| json!(v)));

    Ok(snapshot)
}

fn map_history(_token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let response: HistoDayResponse = decode(PROVIDER, payload)?;
    if response.response.as_deref() == Some("Error") {
        return Err(MarketDataError::not_found(PROVIDER, HISTORY_NOT_FOUND));
    }

    let candles = response
        .data
        .and_then(|d| d.data)
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, HISTORY_NOT_FOUND))?;

    Ok(candles
        .into_iter()
        .filter_map(|c| {
            Some(PricePoint::new(
                seconds_to_millis(c.time?),
                c.close?,
                c.volumeto,
            ))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker() -> TokenAddress {
        // Any base58 string is a valid key for this source
        TokenAddress::parse("bonkbonkbonkbonkbonkbonkbonkbonk").unwrap()
    }

    #[test]
    fn test_request_uses_upper_cased_key() {
        let request = price_request(&ticker());
        assert_eq!(request.path, "/data/pricemultifull");
        assert_eq!(
            request.query_value("fsym"),
            Some("BONKBONKBONKBONKBONKBONKBONKBONK")
        );
        assert_eq!(request.query_value("tsyms"), Some("USD"));
    }

    #[test]
    fn test_maps_raw_usd_quote() {
        let payload = json!({
            "RAW": {
                "BONKBONKBONKBONKBONKBONKBONKBONK": {
                    "USD": {
                        "PRICE": 0.0000231,
                        "MKTCAP": 1500000000.0,
                        "TOTALVOLUME24HTO": 45000000.0,
                        "CHANGEPCT24HOUR": 4.2,
                        "HIGH24HOUR": 0.000024,
                        "LOW24HOUR": 0.000021,
                        "SUPPLY": 88000000000000.0
                    }
                }
            }
        });
        let snapshot = map_snapshot(&ticker(), payload).unwrap();
        assert_eq!(snapshot.price, Some(0.0000231));
        assert_eq!(snapshot.market_cap, Some(1500000000.0));
        assert_eq!(snapshot.volume_24h, Some(45000000.0));
        assert_eq!(snapshot.price_change_24h, Some(4.2));
        assert_eq!(snapshot.total_supply.as_deref(), Some("88000000000000"));
        assert!(snapshot.name.is_none());
        assert_eq!(snapshot.extras["high24h"], json!(0.000024));
    }

    #[test]
    fn test_unlisted_token_is_not_found() {
        let payload = json!({
            "Response": "Error",
            "Message": "There is no data for any of the toSymbols USD ."
        });
        let err = map_snapshot(&ticker(), payload).unwrap_err();
        assert_eq!(err.to_string(), NOT_FOUND);

        let err = map_snapshot(&ticker(), json!({ "RAW": { "OTHER": {} } })).unwrap_err();
        assert_eq!(err.to_string(), NOT_FOUND);
    }

    #[test]
    fn test_history_converts_seconds() {
        let payload = json!({
            "Response": "Success",
            "Data": { "Data": [
                { "time": 1700000000, "close": 1.5, "volumeto": 1200.0 },
                { "time": 1700086400, "close": 1.7 }
            ]}
        });
        let points = map_history(&ticker(), payload).unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint::new(1_700_000_000_000, 1.5, Some(1200.0)),
                PricePoint::new(1_700_086_400_000, 1.7, None),
            ]
        );
    }

    #[test]
    fn test_history_error_response() {
        let err = map_history(&ticker(), json!({ "Response": "Error" })).unwrap_err();
        assert_eq!(err.to_string(), HISTORY_NOT_FOUND);

        let request = histoday_request(&ticker(), &HistoryWindow::default());
        assert_eq!(request.query_value("limit"), Some("7"));
    }
}
