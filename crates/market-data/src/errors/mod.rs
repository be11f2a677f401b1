//! Error types for the market data crate.
//!
//! [`MarketDataError`] covers everything that can go wrong between the
//! aggregator and a provider. Only [`MarketDataError::InvalidTokenAddress`]
//! ever reaches callers of the aggregation API; every other variant is turned
//! into a failure [`Envelope`](crate::models::Envelope) at the adapter boundary.

use thiserror::Error;

use crate::models::ProviderId;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The token identifier was rejected before any provider was contacted.
    #[error("Invalid token address: {0}")]
    InvalidTokenAddress(String),

    /// The provider answered but does not know the token.
    ///
    /// The message is the provider-specific, human readable reason and is
    /// surfaced verbatim as the envelope error.
    #[error("{message}")]
    NotFound {
        /// The provider that reported the token as unknown
        provider: ProviderId,
        /// Provider-specific reason
        message: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: ProviderId,
    },

    /// The provider answered with a non-2xx status.
    #[error("HTTP {status} from {provider}: {body}")]
    HttpStatus {
        /// The provider that returned the status
        provider: ProviderId,
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The provider payload could not be decoded.
    #[error("Failed to parse {provider} response: {message}")]
    Parse {
        /// The provider whose payload was malformed
        provider: ProviderId,
        /// Decoder message
        message: String,
    },

    /// No source is registered for this provider.
    #[error("Source not configured: {provider}")]
    SourceNotConfigured {
        /// The provider without a registered source
        provider: ProviderId,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Shorthand for a [`MarketDataError::NotFound`].
    pub fn not_found(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::NotFound {
            provider,
            message: message.into(),
        }
    }

    /// Shorthand for a [`MarketDataError::Parse`].
    pub fn parse(provider: ProviderId, message: impl ToString) -> Self {
        Self::Parse {
            provider,
            message: message.to_string(),
        }
    }

    /// The provider this error is attributed to, if any.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::NotFound { provider, .. }
            | Self::Timeout { provider }
            | Self::HttpStatus { provider, .. }
            | Self::Parse { provider, .. }
            | Self::SourceNotConfigured { provider } => Some(*provider),
            Self::InvalidTokenAddress(_) | Self::Network(_) => None,
        }
    }
}
