//! RugCheck source.
//!
//! The only composite source: the risk report (`/v1/tokens/{mint}/report`)
//! and the token info (`/v1/tokens/{mint}`) are fetched concurrently and
//! must both succeed. RugCheck has no price history.
//! API documentation: https://api.rugcheck.xyz/swagger/index.html

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{MarketSnapshot, ProviderId, SecurityReport, TokenAddress};
use crate::provider::adapter::{CurrentCall, SourceProfile};
use crate::provider::json::{decode, lenient_f64, lenient_i64, lenient_string, lenient_vec, upper};
use crate::provider::transport::ProviderRequest;

const PROVIDER: ProviderId = ProviderId::RugCheck;
const INCOMPLETE: &str = "Failed to get complete token summary";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /v1/tokens/{mint}/report
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    #[serde(default, deserialize_with = "lenient_f64")]
    score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_risk: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    total_risks: Option<i64>,
    /// Kept as received
    #[serde(default, deserialize_with = "lenient_vec")]
    risks: Vec<Value>,
    /// Kept as received
    #[serde(default, deserialize_with = "lenient_vec")]
    markets: Vec<Value>,
}

/// Response from /v1/tokens/{mint}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenInfoResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    mint: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    supply: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    decimals: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    owner_balance: Option<f64>,
    #[serde(default)]
    is_mutable: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    update_authority: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    freeze_authority: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    uri: Option<String>,
}

// ============================================================================
// Profile
// ============================================================================

pub fn profile() -> SourceProfile {
    SourceProfile {
        id: PROVIDER,
        current: CurrentCall::Composite {
            first: report_request,
            second: token_info_request,
            map: map_snapshot,
            incomplete: INCOMPLETE,
        },
        history: None,
    }
}

fn report_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/v1/tokens/{}/report", token))
}

fn token_info_request(token: &TokenAddress) -> ProviderRequest {
    ProviderRequest::get(PROVIDER, format!("/v1/tokens/{}", token))
}

fn security_report(report: ReportResponse) -> Option<SecurityReport> {
    Some(SecurityReport::new(
        report.score?,
        report.total_risk,
        report.total_risks.and_then(|n| u32::try_from(n).ok()),
        report.risks,
        report.markets,
    ))
}

fn map_snapshot(
    _token: &TokenAddress,
    report: Value,
    info: Value,
) -> Result<MarketSnapshot, MarketDataError> {
    if !report.is_object() || !info.is_object() {
        return Err(MarketDataError::not_found(PROVIDER, INCOMPLETE));
    }

    let report: ReportResponse = decode(PROVIDER, report)?;
    let security =
        security_report(report).ok_or_else(|| MarketDataError::not_found(PROVIDER, INCOMPLETE))?;
    let info: TokenInfoResponse = decode(PROVIDER, info)?;

    let mut snapshot = MarketSnapshot {
        name: info.name,
        symbol: upper(info.symbol),
        total_supply: info.supply,
        security: Some(security),
        ..Default::default()
    };

    snapshot.insert_extra("mint", info.mint.map(Value::String));
    snapshot.insert_extra("decimals", info.decimals.map(|v| json!(v)));
    snapshot.insert_extra("owner", info.owner.map(Value::String));
    snapshot.insert_extra("ownerBalance", info.owner_balance.map(|v| json!(v)));
    snapshot.insert_extra("isMutable", info.is_mutable.map(Value::Bool));
    snapshot.insert_extra("updateAuthority", info.update_authority.map(Value::String));
    snapshot.insert_extra("freezeAuthority", info.freeze_authority.map(Value::String));
    snapshot.insert_extra("metadataUri", info.uri.map(Value::String));

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryWindow;
    use crate::provider::adapter::testing::{adapter, token, FakeTransport};
    use crate::provider::TokenDataSource;

    fn report() -> Value {
        json!({
            "token": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "score": 42.0,
            "totalRisk": 1850.0,
            "totalRisks": 2,
            "risks": [
                { "name": "Mutable metadata", "level": "warn", "description": "Token metadata can be changed by the owner" },
                { "name": "Freeze Authority still enabled", "level": "danger", "description": "Tokens can be frozen" }
            ],
            "markets": [
                { "marketId": "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2", "score": 10.0, "risks": [] }
            ]
        })
    }

    fn info() -> Value {
        json!({
            "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "owner": "Own3r",
            "ownerBalance": 0,
            "decimals": 6,
            "supply": "1000000000",
            "isMutable": true,
            "updateAuthority": "Upd4te",
            "freezeAuthority": null,
            "name": "Risky Dog",
            "symbol": "rdog",
            "uri": "https://arweave.net/meta"
        })
    }

    #[test]
    fn test_maps_report_and_info() {
        let snapshot = map_snapshot(&token(), report(), info()).unwrap();
        assert_eq!(snapshot.name.as_deref(), Some("Risky Dog"));
        assert_eq!(snapshot.symbol.as_deref(), Some("RDOG"));
        assert_eq!(snapshot.total_supply.as_deref(), Some("1000000000"));

        let security = snapshot.security.unwrap();
        assert_eq!(security.score, 42.0);
        assert!(security.is_high_risk);
        assert_eq!(security.total_risks, Some(2));
        assert_eq!(security.risks.len(), 2);
        assert_eq!(security.markets[0]["score"], json!(10.0));

        assert_eq!(snapshot.extras["isMutable"], json!(true));
        assert!(!snapshot.extras.contains_key("freezeAuthority"));
    }

    #[test]
    fn test_risks_and_markets_pass_through_unmodified() {
        let risks = json!([
            { "name": "Low Liquidity", "value": "$812.40", "description": "Low amount of liquidity", "score": 1200, "level": "danger" },
            { "level": "warn", "score": 50 }
        ]);
        let markets = json!([
            {
                "pubkey": "Pool111",
                "marketType": "raydium",
                "lp": { "lpLockedPct": 99, "lpLockedUSD": 1200.5 },
                "risks": null
            }
        ]);
        let payload = json!({ "score": 60, "risks": risks.clone(), "markets": markets.clone() });

        let security = map_snapshot(&token(), payload, info()).unwrap().security.unwrap();
        assert_eq!(Value::Array(security.risks.clone()), risks);
        assert_eq!(Value::Array(security.markets.clone()), markets);
        assert!(security.is_medium_risk);

        let serialized = serde_json::to_value(&security).unwrap();
        assert_eq!(serialized["markets"], markets);
        assert_eq!(serialized["risks"][0]["value"], json!("$812.40"));
        assert_eq!(serialized["isMediumRisk"], json!(true));
    }

    #[test]
    fn test_null_lists_are_empty() {
        let payload = json!({ "score": 80, "risks": null, "markets": null });
        let security = map_snapshot(&token(), payload, info()).unwrap().security.unwrap();
        assert!(security.risks.is_empty());
        assert!(security.markets.is_empty());
        assert!(security.is_low_risk);
    }

    #[test]
    fn test_report_without_score_is_incomplete() {
        let err = map_snapshot(&token(), json!({ "risks": [] }), info()).unwrap_err();
        assert_eq!(err.to_string(), INCOMPLETE);

        let err = map_snapshot(&token(), report(), Value::Null).unwrap_err();
        assert_eq!(err.to_string(), INCOMPLETE);
    }

    #[tokio::test]
    async fn test_one_failed_call_fails_the_source() {
        let report_path = format!("/v1/tokens/{}/report", token());
        let info_path = format!("/v1/tokens/{}", token());

        let (source, transport) =
            adapter(profile(), FakeTransport::new().with(&report_path, report()));
        let envelope = source.fetch_current(&token()).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some(INCOMPLETE));
        assert_eq!(transport.request_count(), 2);

        let (source, _) = adapter(
            profile(),
            FakeTransport::new()
                .with(&report_path, report())
                .with(&info_path, info()),
        );
        let envelope = source.fetch_current(&token()).await;
        assert!(envelope.success);
        assert!(envelope.data.unwrap().security.is_some());
    }

    #[tokio::test]
    async fn test_has_no_history() {
        let (source, transport) = adapter(profile(), FakeTransport::new());
        assert!(!source.supports_history());
        let envelope = source.fetch_history(&token(), &HistoryWindow::default()).await;
        assert_eq!(
            envelope.error.as_deref(),
            Some("Price history not supported by RugCheck")
        );
        assert_eq!(transport.request_count(), 0);
    }
}
