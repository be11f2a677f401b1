//! Bitquery source.
//!
//! Single GraphQL endpoint; every call is a POST of `{ query, variables }`.
//! The API key is attached by the transport as `X-API-KEY`.
//! API documentation: https://docs.bitquery.io

use chrono::{Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{
    seconds_to_millis, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress,
};
use crate::provider::adapter::{CurrentCall, HistoryCall, SourceProfile};
use crate::provider::json::{decode, lenient_f64, lenient_i64, lenient_string, non_zero, upper};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::Bitquery;
const NOT_FOUND: &str = "Token not found on Bitquery";
const HISTORY_NOT_FOUND: &str = "Price history not found";

const TOKEN_QUERY: &str = r#"
query ($token: String!, $since: ISO8601DateTime) {
  solana(network: solana) {
    dexTrades(
      baseCurrency: {is: $token}
      options: {limit: 1, desc: "block.height"}
    ) {
      block { timestamp { unixtime } }
      baseCurrency { symbol name decimals }
      quotePrice
      tradeAmount(in: USD)
    }
    trades24h: dexTrades(
      baseCurrency: {is: $token}
      time: {since: $since}
    ) {
      count
      tradeAmount(in: USD)
      uniqueSenders: count(uniq: senders)
    }
  }
}
"#;

const HISTORY_QUERY: &str = r#"
query ($token: String!, $limit: Int!) {
  solana(network: solana) {
    dexTrades(
      baseCurrency: {is: $token}
      options: {limit: $limit, desc: "block.height"}
    ) {
      block { timestamp { unixtime } }
      quotePrice
      tradeAmount(in: USD)
    }
  }
}
"#;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<GraphqlData>,
}

#[derive(Debug, Deserialize)]
struct GraphqlData {
    #[serde(default)]
    solana: Option<SolanaData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolanaData {
    #[serde(default)]
    dex_trades: Option<Vec<Trade>>,
    #[serde(default, rename = "trades24h")]
    trades_24h: Option<Vec<TradeAggregate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Trade {
    #[serde(default)]
    block: Option<Block>,
    #[serde(default)]
    base_currency: Option<Currency>,
    #[serde(default, deserialize_with = "lenient_f64")]
    quote_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    trade_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Block {
    #[serde(default)]
    timestamp: Option<BlockTimestamp>,
}

#[derive(Debug, Deserialize)]
struct BlockTimestamp {
    #[serde(default, deserialize_with = "lenient_i64")]
    unixtime: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Currency {
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    decimals: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeAggregate {
    #[serde(default, deserialize_with = "lenient_i64")]
    count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    trade_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    unique_senders: Option<i64>,
}

impl Trade {
    fn unixtime(&self) -> Option<i64> {
        self.block.as_ref()?.timestamp.as_ref()?.unixtime
    }
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
            request: history_request,
            map: map_history,
        }),
    }
}

fn token_request(token: &TokenAddress) -> ProviderRequest {
    let since = (Utc::now() - Duration::hours(24)).to_rfc3339_opts(SecondsFormat::Secs, true);
    ProviderRequest::post(
        PROVIDER,
        "",
        json!({
            "query": TOKEN_QUERY,
            "variables": { "token": token.as_str(), "since": since },
        }),
    )
}

fn history_request(token: &TokenAddress, window: &HistoryWindow) -> ProviderRequest {
    ProviderRequest::post(
        PROVIDER,
        "",
        json!({
            "query": HISTORY_QUERY,
            "variables": { "token": token.as_str(), "limit": window.max_points },
        }),
    )
}

fn solana_data(payload: Value, message: &str) -> Result<SolanaData, MarketDataError> {
    let response: GraphqlResponse = decode(PROVIDER, payload)?;
    response
        .data
        .and_then(|d| d.solana)
        .ok_or_else(|| MarketDataError::not_found(PROVIDER, message))
}

fn map_snapshot(_token: &TokenAddress, payload: Value) -> Result<MarketSnapshot, MarketDataError> {
    let solana = solana_data(payload, NOT_FOUND)?;
    let latest = solana.dex_trades.and_then(|t| t.into_iter().next());
    let window = solana.trades_24h.and_then(|t| t.into_iter().next());

    let latest_trade_at = latest.as_ref().and_then(Trade::unixtime);
    let (currency, quote_price) = match latest {
        Some(trade) => (trade.base_currency, trade.quote_price),
        None => (None, None),
    };
    let (name, symbol, decimals) = match currency {
        Some(c) => (c.name, c.symbol, c.decimals),
        None => (None, None, None),
    };

    let mut snapshot = MarketSnapshot {
        name,
        symbol: upper(symbol),
        price: non_zero(quote_price),
        ..Default::default()
    };

    if let Some(window) = window {
        snapshot.volume_24h = non_zero(window.trade_amount);
        snapshot.insert_extra("trades24h", window.count.map(|v| json!(v)));
        snapshot.insert_extra("uniqueTraders24h", window.unique_senders.map(|v| json!(v)));
    }
    snapshot.insert_extra("decimals", decimals.map(|v| json!(v)));
    snapshot.insert_extra(
        "lastTradeAt",
        latest_trade_at.map(|t| json!(seconds_to_millis(t))),
    );

    Ok(snapshot)
}

fn map_history(_token: &TokenAddress, payload: Value) -> Result<Vec<PricePoint>, MarketDataError> {
    let solana = solana_data(payload, HISTORY_NOT_FOUND)?;

    Ok(solana
        .dex_trades
        .unwrap_or_default()
        .into_iter()
        .filter_map(|trade| {
            let timestamp = seconds_to_millis(trade.unixtime()?);
            Some(PricePoint::new(timestamp, trade.quote_price?, trade.trade_amount))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::adapter::testing::token;
    use crate::provider::transport::HttpMethod;

    #[test]
    fn test_token_request_is_graphql_post() {
        let request = token_request(&token());
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "");

        let body = request.body.unwrap();
        assert!(body["query"].as_str().unwrap().contains("trades24h"));
        assert_eq!(body["variables"]["token"], json!(token().as_str()));
        assert!(body["variables"]["since"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_maps_latest_trade_and_window() {
        let payload = json!({
            "data": {
                "solana": {
                    "dexTrades": [{
                        "block": { "timestamp": { "unixtime": 1700000000 } },
                        "baseCurrency": { "symbol": "bonk", "name": "Bonk", "decimals": 5 },
                        "quotePrice": 0.0000232,
                        "tradeAmount": 125.5
                    }],
                    "trades24h": [{ "count": 15234, "tradeAmount": 8750000.0, "uniqueSenders": 3021 }]
                }
            }
        });
        let snapshot = map_snapshot(&token(), payload).unwrap();
        assert_eq!(snapshot.name.as_deref(), Some("Bonk"));
        assert_eq!(snapshot.symbol.as_deref(), Some("BONK"));
        assert_eq!(snapshot.price, Some(0.0000232));
        assert_eq!(snapshot.volume_24h, Some(8750000.0));
        assert_eq!(snapshot.extras["trades24h"], json!(15234));
        assert_eq!(snapshot.extras["uniqueTraders24h"], json!(3021));
        assert_eq!(snapshot.extras["lastTradeAt"], json!(1_700_000_000_000_i64));
    }

    #[test]
    fn test_no_trades_leaves_fields_absent() {
        let payload = json!({ "data": { "solana": { "dexTrades": [], "trades24h": [] } } });
        let snapshot = map_snapshot(&token(), payload).unwrap();
        assert!(snapshot.price.is_none());
        assert!(snapshot.volume_24h.is_none());
    }

    #[test]
    fn test_graphql_errors_are_not_found() {
        let payload = json!({ "data": null, "errors": [{ "message": "Unauthorized" }] });
        let err = map_snapshot(&token(), payload).unwrap_err();
        assert_eq!(err.to_string(), NOT_FOUND);
    }

    #[test]
    fn test_history_maps_trades() {
        let payload = json!({
            "data": { "solana": { "dexTrades": [
                { "block": { "timestamp": { "unixtime": 1700000060 } }, "quotePrice": 1.1, "tradeAmount": 20.0 },
                { "block": { "timestamp": { "unixtime": 1700000000 } }, "quotePrice": 1.0 }
            ] } }
        });
        let points = map_history(&token(), payload).unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint::new(1_700_000_060_000, 1.1, Some(20.0)),
                PricePoint::new(1_700_000_000_000, 1.0, None),
            ]
        );

        let request = history_request(&token(), &HistoryWindow::default());
        assert_eq!(request.body.unwrap()["variables"]["limit"], json!(100));
    }
}
