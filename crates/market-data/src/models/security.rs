use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Score below which a token is considered high risk.
const HIGH_RISK_BELOW: f64 = 50.0;
/// Score from which a token is considered low risk.
const LOW_RISK_FROM: f64 = 75.0;

/// Token security report, passed through to summaries unmodified.
///
/// `risks` and `markets` are the provider's entries as received; fields this
/// crate does not interpret are kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub score: f64,
    pub total_risk: Option<f64>,
    pub total_risks: Option<u32>,
    pub risks: Vec<Value>,
    pub markets: Vec<Value>,
    pub is_high_risk: bool,
    pub is_medium_risk: bool,
    pub is_low_risk: bool,
}

impl SecurityReport {
    /// Build a report, deriving the risk bands from the score.
    pub fn new(
        score: f64,
        total_risk: Option<f64>,
        total_risks: Option<u32>,
        risks: Vec<Value>,
        markets: Vec<Value>,
    ) -> Self {
        Self {
            score,
            total_risk,
            total_risks,
            risks,
            markets,
            is_high_risk: score < HIGH_RISK_BELOW,
            is_medium_risk: (HIGH_RISK_BELOW..LOW_RISK_FROM).contains(&score),
            is_low_risk: score >= LOW_RISK_FROM,
        }
    }
}
