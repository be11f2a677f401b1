//! Token data source trait definitions.

use async_trait::async_trait;

use crate::models::{Envelope, HistoryWindow, MarketSnapshot, PricePoint, ProviderId, TokenAddress};

/// Anything that can answer "what does this provider know about a token".
///
/// Implementations never return errors: every failure (network, timeout,
/// malformed payload, unknown token) is reported as a failure envelope.
/// The aggregator additionally guards against implementations that panic.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use memescope_market_data::provider::TokenDataSource;
///
/// struct StaticSource(MarketSnapshot);
///
/// #[async_trait]
/// impl TokenDataSource for StaticSource {
///     fn id(&self) -> ProviderId {
///         ProviderId::Birdeye
///     }
///
///     async fn fetch_current(&self, _token: &TokenAddress) -> Envelope<MarketSnapshot> {
///         Envelope::ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait TokenDataSource: Send + Sync {
    /// Provider this source speaks for.
    fn id(&self) -> ProviderId;

    /// Whether [`fetch_history`](Self::fetch_history) can return data.
    fn supports_history(&self) -> bool {
        false
    }

    /// Fetch the provider's current view of the token.
    async fn fetch_current(&self, token: &TokenAddress) -> Envelope<MarketSnapshot>;

    /// Fetch a price series for the token.
    ///
    /// Default implementation reports history as unsupported.
    async fn fetch_history(
        &self,
        token: &TokenAddress,
        window: &HistoryWindow,
    ) -> Envelope<Vec<PricePoint>> {
        let _ = (token, window);
        Envelope::failure(format!(
            "Price history not supported by {}",
            self.id().display_name()
        ))
    }
}
