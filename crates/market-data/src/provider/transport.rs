//! Transport collaborator: turns a [`ProviderRequest`] into decoded JSON.
//!
//! Adapters only describe *what* to ask a provider. Base URLs, credentials,
//! the user agent and the per-call timeout belong to the transport.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::ProviderId;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Provider-relative request description.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderRequest {
    pub provider: ProviderId,
    pub method: HttpMethod,
    /// Path appended to the provider's base URL (may be empty)
    pub path: String,
    pub query: Vec<(String, String)>,
    /// JSON body, POST only
    pub body: Option<Value>,
}

impl ProviderRequest {
    pub fn get(provider: ProviderId, path: impl Into<String>) -> Self {
        Self {
            provider,
            method: HttpMethod::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(provider: ProviderId, path: impl Into<String>, body: Value) -> Self {
        Self {
            provider,
            method: HttpMethod::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Value of a query parameter, if set.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Executes provider requests. One outbound call per `send`, no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ProviderRequest) -> Result<Value, MarketDataError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
    config: MarketDataConfig,
}

impl HttpTransport {
    pub fn new(config: MarketDataConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn url(&self, request: &ProviderRequest) -> String {
        format!("{}{}", self.config.base_url(request.provider), request.path)
    }

    /// Query parameters and headers carrying the provider's API key.
    fn credentials(
        &self,
        provider: ProviderId,
    ) -> (Vec<(&'static str, &str)>, Vec<(&'static str, &str)>) {
        let mut query = Vec::new();
        let mut headers = Vec::new();

        match provider {
            ProviderId::CoinGecko => {
                if let Some(key) = &self.config.coingecko_api_key {
                    query.push(("x_cg_demo_api_key", key.as_str()));
                }
            }
            ProviderId::CryptoCompare => {
                if let Some(key) = &self.config.crypto_compare_api_key {
                    query.push(("api_key", key.as_str()));
                }
            }
            ProviderId::Bitquery => {
                if let Some(key) = &self.config.bitquery_api_key {
                    headers.push(("X-API-KEY", key.as_str()));
                }
            }
            ProviderId::Birdeye => {
                headers.push(("x-chain", "solana"));
                if let Some(key) = &self.config.birdeye_api_key {
                    headers.push(("X-API-KEY", key.as_str()));
                }
            }
            _ => {}
        }

        (query, headers)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ProviderRequest) -> Result<Value, MarketDataError> {
        let provider = request.provider;
        let url = self.url(request);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        let (auth_query, auth_headers) = self.credentials(provider);
        builder = builder.query(&request.query).query(&auth_query);
        for (name, value) in auth_headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(
            "[{}] {:?} {} with {} params",
            provider,
            request.method,
            request.path,
            request.query.len()
        );

        let response = builder.send().await.map_err(|e| {
            warn!("[{}] request failed: {}", provider, e);
            if e.is_timeout() {
                MarketDataError::Timeout { provider }
            } else {
                MarketDataError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[{}] HTTP {} for {}", provider, status, request.path);
            return Err(status_error(provider, status, &body));
        }

        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| MarketDataError::parse(provider, e))
    }
}

fn status_error(provider: ProviderId, status: StatusCode, body: &str) -> MarketDataError {
    let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    MarketDataError::HttpStatus {
        provider,
        status: status.as_u16(),
        body,
    }
}
