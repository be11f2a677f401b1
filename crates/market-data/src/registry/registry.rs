//! Source registry.
//!
//! Holds at most one [`TokenDataSource`] per [`ProviderId`]. The aggregator
//! and the history resolver look sources up by id; a provider without a
//! registered source is reported as "not configured" rather than skipped
//! silently.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::config::MarketDataConfig;
use crate::models::ProviderId;
use crate::provider::{profile_for, HttpTransport, SourceAdapter, TokenDataSource, Transport};

/// Registry of token data sources keyed by provider.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<ProviderId, Arc<dyn TokenDataSource>>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all nine built-in sources over an HTTP transport.
    pub fn with_defaults(config: &MarketDataConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(config.clone())))
    }

    /// Registry with all nine built-in sources sharing `transport`.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        let mut registry = Self::new();
        for provider in ProviderId::ALL {
            registry.register(Arc::new(SourceAdapter::new(
                profile_for(provider),
                transport.clone(),
            )));
        }
        registry
    }

    /// Register a source, replacing any source already registered for its id.
    ///
    /// Returns the replaced source, if any.
    pub fn register(
        &mut self,
        source: Arc<dyn TokenDataSource>,
    ) -> Option<Arc<dyn TokenDataSource>> {
        let id = source.id();
        let previous = self.sources.insert(id, source);
        if previous.is_some() {
            debug!("Replaced source for provider '{}'", id);
        }
        previous
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_source(mut self, source: Arc<dyn TokenDataSource>) -> Self {
        self.register(source);
        self
    }

    pub fn get(&self, provider: ProviderId) -> Option<&Arc<dyn TokenDataSource>> {
        self.sources.get(&provider)
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.sources.contains_key(&provider)
    }

    /// Registered sources in report order.
    pub fn sources(&self) -> impl Iterator<Item = &Arc<dyn TokenDataSource>> {
        self.sources.values()
    }

    /// Registered provider ids in report order.
    pub fn providers(&self) -> Vec<ProviderId> {
        self.sources.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
