//! Authenticated Amadeus client with a single retry on expired tokens

use std::fmt;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::auth::{Credential, TokenCache};
use super::model::ErrorResponse;
use crate::config::AmadeusConfig;
use crate::{Result, TripScoutError};

/// A GET request against the Amadeus API, rebuildable for the retry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    path: String,
    query: Vec<(String, String)>,
}

impl ProviderRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter; order is preserved.
    #[must_use]
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        for (i, (key, value)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

impl fmt::Display for ProviderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.url(""))
    }
}

/// Amadeus API client
pub struct AmadeusClient {
    http: Client,
    base_url: String,
    tokens: TokenCache,
}

impl AmadeusClient {
    /// Create a new client; every request is bounded by the configured timeout.
    pub fn new(config: &AmadeusConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tripscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TripScoutError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            tokens: TokenCache::new(http.clone(), config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Issue an authenticated request and decode the JSON body.
    ///
    /// A 401 carrying the expired-token code drops the rejected credential and
    /// retries once with a fresh one.
    #[instrument(name = "amadeus_call", level = "debug", skip(self, request), fields(request = %request))]
    pub async fn call<T: DeserializeOwned>(&self, request: &ProviderRequest) -> Result<T> {
        let url = request.url(&self.base_url);

        let credential = self.tokens.get_token().await?;
        let mut response = self.send(&url, &credential).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let error_text = response.text().await.unwrap_or_default();
            let error: ErrorResponse = serde_json::from_str(&error_text).map_err(|_| {
                TripScoutError::provider_status(401, "Amadeus API call failed with 401")
            })?;

            if !error.is_token_expired() {
                return Err(Self::failure(StatusCode::UNAUTHORIZED, &error_text));
            }

            warn!("Amadeus access token expired, refreshing and retrying once");
            self.tokens.invalidate_if(&credential).await;
            let credential = self.tokens.get_token().await?;
            response = self.send(&url, &credential).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::failure(status, &error_text));
        }

        let body = response.bytes().await?;
        debug!("Amadeus responded with {} bytes", body.len());
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send(&self, url: &str, credential: &Credential) -> Result<Response> {
        Ok(self
            .http
            .get(url)
            .bearer_auth(credential.access_token())
            .send()
            .await?)
    }

    fn failure(status: StatusCode, error_text: &str) -> TripScoutError {
        warn!("Amadeus API error {}: {}", status, error_text);
        TripScoutError::provider_status(
            status.as_u16(),
            format!("Amadeus API call failed: {error_text}"),
        )
    }
}
