//! Token aggregator for orchestrating the provider fan-out.
//!
//! One aggregation:
//! 1. Validate the token key (the only failure surfaced to callers)
//! 2. Query every registered source concurrently, waiting for all of them
//! 3. Resolve price history sequentially, alongside step 2
//! 4. Reconcile the successful snapshots into canonical token details

use std::collections::BTreeMap;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{
    AggregateResult, Envelope, HistoryWindow, MarketSnapshot, ProviderId, TokenAddress,
    TokenSummary,
};
use crate::provider::catch_panic;
use crate::reconcile::{FieldReconciler, PriorityTable};
use crate::registry::SourceRegistry;
use crate::resolver::HistoryResolver;

use super::summary::summarize;

/// Aggregates token data across all registered sources.
pub struct TokenAggregator {
    registry: SourceRegistry,
    reconciler: FieldReconciler,
    history: HistoryResolver,
    window: HistoryWindow,
}

impl TokenAggregator {
    /// Create an aggregator over the given sources with default policies.
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry,
            reconciler: FieldReconciler::default(),
            history: HistoryResolver::new(),
            window: HistoryWindow::default(),
        }
    }

    /// Aggregator over the nine built-in HTTP sources.
    pub fn from_config(config: &MarketDataConfig) -> Self {
        Self::new(SourceRegistry::with_defaults(config)).with_history_window(config.history_window)
    }

    /// [`from_config`](Self::from_config) with configuration read from the environment.
    pub fn from_env() -> Self {
        Self::from_config(&MarketDataConfig::from_env())
    }

    pub fn with_priority_table(mut self, table: PriorityTable) -> Self {
        self.reconciler = FieldReconciler::new(table);
        self
    }

    pub fn with_history_resolver(mut self, history: HistoryResolver) -> Self {
        self.history = history;
        self
    }

    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Aggregate everything known about a token.
    ///
    /// Provider failures never fail the call; they show up as failure
    /// envelopes in `sources` and as absent fields in `token_details`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::InvalidTokenAddress`] if `token_key` is not
    /// a valid Solana address. No provider is contacted in that case.
    pub async fn get_token_details(
        &self,
        token_key: &str,
    ) -> Result<AggregateResult, MarketDataError> {
        let token = TokenAddress::parse(token_key)?;
        info!("Aggregating {} across {} sources", token, self.registry.len());

        let (sources, price_history) = futures::join!(
            self.fetch_all(&token),
            self.history.resolve(&self.registry, &token, &self.window)
        );

        let successful: BTreeMap<ProviderId, MarketSnapshot> = sources
            .iter()
            .filter_map(|(provider, envelope)| Some((*provider, envelope.data()?.clone())))
            .collect();

        let (token_details, provenance) = self.reconciler.reconcile(&token, &successful);

        info!(
            "Aggregated {}: {}/{} sources succeeded, history {}",
            token,
            successful.len(),
            sources.len(),
            if price_history.success { "found" } else { "unavailable" }
        );

        Ok(AggregateResult {
            token_details,
            sources,
            provenance,
            price_history,
        })
    }

    /// Aggregate a token and condense the result into a summary.
    ///
    /// # Errors
    ///
    /// Same as [`get_token_details`](Self::get_token_details).
    pub async fn get_token_summary(
        &self,
        token_key: &str,
    ) -> Result<TokenSummary, MarketDataError> {
        let result = self.get_token_details(token_key).await?;
        Ok(summarize(&result))
    }

    /// Query every registered source concurrently and report all nine providers.
    async fn fetch_all(
        &self,
        token: &TokenAddress,
    ) -> BTreeMap<ProviderId, Envelope<MarketSnapshot>> {
        let calls = self.registry.sources().map(|source| async move {
            let provider = source.id();
            let envelope = match catch_panic(source.fetch_current(token)).await {
                Ok(envelope) => envelope,
                Err(message) => {
                    warn!("Source '{}' panicked: {}", provider, message);
                    Envelope::failure(format!("Source panicked: {}", message))
                }
            };
            debug!("Source '{}' settled: success={}", provider, envelope.success);
            (provider, envelope)
        });

        let mut sources: BTreeMap<_, _> = join_all(calls).await.into_iter().collect();

        for provider in ProviderId::ALL {
            sources.entry(provider).or_insert_with(|| {
                Envelope::from_result(Err(MarketDataError::SourceNotConfigured { provider }))
            });
        }

        sources
    }
}
