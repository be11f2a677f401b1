//! Summary view over an aggregation result.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::models::{AggregateResult, ProviderId, TokenSummary, PROVIDER_COUNT};

/// Decimal places kept in the success rate.
pub const SUCCESS_RATE_DP: u32 = 2;

/// `100 * successful / total`, rounded to [`SUCCESS_RATE_DP`] places.
///
/// A zero `total` yields zero.
pub fn success_rate(successful: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(successful) * Decimal::ONE_HUNDRED / Decimal::from(total))
        .round_dp(SUCCESS_RATE_DP)
}

/// Build the summary for an aggregation result.
///
/// The denominator is always the number of known providers, not the number
/// of sources that happened to be registered.
pub fn summarize(result: &AggregateResult) -> TokenSummary {
    let sources: BTreeMap<ProviderId, bool> = ProviderId::ALL
        .into_iter()
        .map(|provider| {
            let succeeded = result
                .sources
                .get(&provider)
                .is_some_and(|envelope| envelope.success);
            (provider, succeeded)
        })
        .collect();

    let successful = sources.values().filter(|ok| **ok).count();

    let security = result
        .sources
        .get(&ProviderId::RugCheck)
        .and_then(|envelope| envelope.data())
        .and_then(|snapshot| snapshot.security.clone());

    let details = &result.token_details;
    TokenSummary {
        address: details.address.clone(),
        name: details.name.clone(),
        symbol: details.symbol.clone(),
        price: details.price,
        market_cap: details.market_cap,
        volume_24h: details.volume_24h,
        price_change_24h: details.price_change_24h,
        holders: details.holders,
        success_rate: success_rate(successful, PROVIDER_COUNT),
        sources,
        security,
        timestamp: Utc::now(),
    }
}
