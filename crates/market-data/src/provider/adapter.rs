//! Generic source adapter driven by a per-provider [`SourceProfile`].
//!
//! The nine providers differ only in which requests they issue and how the
//! payloads map onto [`MarketSnapshot`] / [`PricePoint`]. A profile captures
//! exactly that; [`SourceAdapter`] does the rest.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Envelope, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress};

use super::traits::TokenDataSource;
use super::transport::{ProviderRequest, Transport};

pub type RequestFn = fn(&TokenAddress) -> ProviderRequest;
pub type HistoryRequestFn = fn(&TokenAddress, &HistoryWindow) -> ProviderRequest;
pub type SnapshotFn = fn(&TokenAddress, Value) -> Result<MarketSnapshot, MarketDataError>;
pub type CompositeSnapshotFn =
    fn(&TokenAddress, Value, Value) -> Result<MarketSnapshot, MarketDataError>;
pub type SeriesFn = fn(&TokenAddress, Value) -> Result<Vec<PricePoint>, MarketDataError>;

/// How a provider's current data is fetched.
#[derive(Clone, Copy)]
pub enum CurrentCall {
    /// One request, one mapping.
    Single { request: RequestFn, map: SnapshotFn },

    /// Two independent requests issued concurrently. Both must succeed;
    /// otherwise the call fails with `incomplete`.
    Composite {
        first: RequestFn,
        second: RequestFn,
        map: CompositeSnapshotFn,
        incomplete: &'static str,
    },
}

/// How a provider's price history is fetched.
#[derive(Clone, Copy)]
pub struct HistoryCall {
    pub request: HistoryRequestFn,
    pub map: SeriesFn,
}

/// Everything provider-specific about a source.
#[derive(Clone, Copy)]
pub struct SourceProfile {
    pub id: ProviderId,
    pub current: CurrentCall,
    pub history: Option<HistoryCall>,
}

/// A [`TokenDataSource`] that executes a [`SourceProfile`] over a [`Transport`].
pub struct SourceAdapter {
    profile: SourceProfile,
    transport: Arc<dyn Transport>,
}

impl SourceAdapter {
    pub fn new(profile: SourceProfile, transport: Arc<dyn Transport>) -> Self {
        Self { profile, transport }
    }

    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    async fn request(&self, request: ProviderRequest) -> Envelope<Value> {
        Envelope::from_result(self.transport.send(&request).await)
    }

    fn log_outcome<T>(&self, operation: &str, envelope: &Envelope<T>) {
        match &envelope.error {
            Some(error) if !envelope.success => {
                warn!("[{}] {} failed: {}", self.profile.id, operation, error)
            }
            _ => debug!("[{}] {} succeeded", self.profile.id, operation),
        }
    }
}

#[async_trait]
impl TokenDataSource for SourceAdapter {
    fn id(&self) -> ProviderId {
        self.profile.id
    }

    fn supports_history(&self) -> bool {
        self.profile.history.is_some()
    }

    async fn fetch_current(&self, token: &TokenAddress) -> Envelope<MarketSnapshot> {
        let envelope = match self.profile.current {
            CurrentCall::Single { request, map } => self
                .request(request(token))
                .await
                .and_then(|payload| map(token, payload)),
            CurrentCall::Composite {
                first,
                second,
                map,
                incomplete,
            } => {
                let (a, b) = futures::join!(
                    self.request(first(token)),
                    self.request(second(token))
                );
                Envelope::both(a, b, incomplete).and_then(|(a, b)| map(token, a, b))
            }
        };

        self.log_outcome("current data", &envelope);
        envelope
    }

    async fn fetch_history(
        &self,
        token: &TokenAddress,
        window: &HistoryWindow,
    ) -> Envelope<Vec<PricePoint>> {
        let Some(call) = self.profile.history else {
            return Envelope::failure(format!(
                "Price history not supported by {}",
                self.profile.id.display_name()
            ));
        };

        let envelope = self
            .request((call.request)(token, window))
            .await
            .and_then(|payload| (call.map)(token, payload));

        self.log_outcome("price history", &envelope);
        envelope
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-response transport shared by the provider tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Answers requests by path; unknown paths get a 404.
    #[derive(Default)]
    pub struct FakeTransport {
        responses: HashMap<String, Value>,
        pub requests: Mutex<Vec<ProviderRequest>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, path: &str, body: Value) -> Self {
            self.responses.insert(path.to_string(), body);
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: &ProviderRequest) -> Result<Value, MarketDataError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .get(&request.path)
                .cloned()
                .ok_or_else(|| MarketDataError::HttpStatus {
                    provider: request.provider,
                    status: 404,
                    body: "not found".to_string(),
                })
        }
    }

    pub fn token() -> TokenAddress {
        TokenAddress::parse("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").unwrap()
    }

    pub fn adapter(
        profile: SourceProfile,
        transport: FakeTransport,
    ) -> (SourceAdapter, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        (SourceAdapter::new(profile, transport.clone()), transport)
    }
}
