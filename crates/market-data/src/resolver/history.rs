//! Price history resolver - tries sources in order until one has data.
//!
//! Unlike current data, history is never merged: the first source that
//! returns a successful, non-empty series wins and later sources are not
//! contacted.

use log::{debug, info, warn};

use crate::models::{Envelope, HistoryWindow, PricePoint, ProviderId, TokenAddress};
use crate::provider::catch_panic;
use crate::registry::SourceRegistry;

use super::skip_reason::{ResolutionDiagnostics, SkipReason};

/// Error message when no source produced a series.
pub const NO_HISTORY: &str = "No price history available from any source";

/// Sequential, first-non-empty-wins history resolver.
///
/// Default order:
/// 1. DexScreener
/// 2. CoinGecko
/// 3. GeckoTerminal
/// 4. DeFi Llama
/// 5. Birdeye
/// 6. Pump.fun
///
/// Providers in the order without a registered source are skipped.
#[derive(Clone, Debug)]
pub struct HistoryResolver {
    order: Vec<ProviderId>,
}

impl Default for HistoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryResolver {
    pub const DEFAULT_ORDER: [ProviderId; 6] = [
        ProviderId::DexScreener,
        ProviderId::CoinGecko,
        ProviderId::GeckoTerminal,
        ProviderId::DefiLlama,
        ProviderId::Birdeye,
        ProviderId::PumpFun,
    ];

    pub fn new() -> Self {
        Self::with_order(Self::DEFAULT_ORDER.to_vec())
    }

    /// Resolver with a custom source order.
    pub fn with_order(order: Vec<ProviderId>) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &[ProviderId] {
        &self.order
    }

    /// Resolve a price series for `token`.
    pub async fn resolve(
        &self,
        registry: &SourceRegistry,
        token: &TokenAddress,
        window: &HistoryWindow,
    ) -> Envelope<Vec<PricePoint>> {
        self.resolve_with_diagnostics(registry, token, window).await.0
    }

    /// Resolve a price series, also reporting why each earlier source was passed over.
    pub async fn resolve_with_diagnostics(
        &self,
        registry: &SourceRegistry,
        token: &TokenAddress,
        window: &HistoryWindow,
    ) -> (Envelope<Vec<PricePoint>>, ResolutionDiagnostics) {
        let mut diagnostics = ResolutionDiagnostics::new();

        for &provider in &self.order {
            let Some(source) = registry.get(provider) else {
                debug!("No source registered for '{}', skipping", provider);
                diagnostics.record_skip(provider, SkipReason::NotRegistered);
                continue;
            };

            let envelope = match catch_panic(source.fetch_history(token, window)).await {
                Ok(envelope) => envelope,
                Err(message) => {
                    warn!("History source '{}' panicked: {}", provider, message);
                    diagnostics.record_skip(provider, SkipReason::Panicked { message });
                    continue;
                }
            };

            if !envelope.is_success() {
                let message = envelope
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string());
                debug!("History source '{}' failed: {}, trying next", provider, message);
                diagnostics.record_skip(provider, SkipReason::Failed { message });
                continue;
            }

            let points = envelope.into_data().unwrap_or_default();
            if points.is_empty() {
                debug!("History source '{}' returned no points, trying next", provider);
                diagnostics.record_skip(provider, SkipReason::Empty);
                continue;
            }

            info!(
                "Resolved {} price points for {} from '{}'",
                points.len(),
                token,
                provider
            );
            diagnostics.record_success(provider, points.len());
            return (Envelope::ok(points), diagnostics);
        }

        warn!("No price history for {} from any source", token);
        (Envelope::failure(NO_HISTORY), diagnostics)
    }
}
