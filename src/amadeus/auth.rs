//! Cached client-credentials token for the Amadeus API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::model::TokenResponse;
use crate::config::AmadeusConfig;
use crate::{Result, TripScoutError};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";

/// A bearer token together with the instant it stops being handed out.
#[derive(Clone)]
pub struct Credential {
    access_token: String,
    refresh_at: Instant,
}

impl Credential {
    /// `refresh_at` is `expires_in` minus the safety margin, never earlier than now.
    #[must_use]
    pub fn new(access_token: String, expires_in: Duration, safety_margin: Duration) -> Self {
        Self {
            access_token,
            refresh_at: Instant::now() + expires_in.saturating_sub(safety_margin),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn refresh_at(&self) -> Instant {
        self.refresh_at
    }

    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Instant::now())
    }

    #[must_use]
    pub fn is_usable_at(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_at", &self.refresh_at)
            .finish()
    }
}

struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

/// Single cached credential shared by every provider call.
///
/// The lock is held for the whole token exchange, so concurrent callers on a cold
/// or stale cache wait for one exchange and all receive its result.
pub struct TokenCache {
    http: Client,
    token_url: String,
    credentials: Option<ClientCredentials>,
    safety_margin: Duration,
    cached: Mutex<Option<Credential>>,
    exchanges: AtomicUsize,
}

impl TokenCache {
    pub fn new(http: Client, config: &AmadeusConfig) -> Self {
        let credentials = match (&config.api_key, &config.api_secret) {
            (Some(client_id), Some(client_secret)) => Some(ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        };

        Self {
            http,
            token_url: format!("{}{}", config.base_url.trim_end_matches('/'), TOKEN_PATH),
            credentials,
            safety_margin: config.token_safety_margin(),
            cached: Mutex::new(None),
            exchanges: AtomicUsize::new(0),
        }
    }

    /// Returns the cached credential, exchanging a new one when it is missing or stale.
    #[instrument(name = "get_token", level = "debug", skip(self))]
    pub async fn get_token(&self) -> Result<Credential> {
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref().filter(|c| c.is_usable()) {
            debug!("Using cached access token");
            return Ok(credential.clone());
        }

        let credential = self.exchange().await?;
        *cached = Some(credential.clone());
        Ok(credential)
    }

    /// Drops the cached credential; the next `get_token` re-authenticates.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.lock().await;
        if cached.take().is_some() {
            debug!("Invalidated cached access token");
        }
    }

    /// Drops the cached credential only while it is still the rejected one.
    ///
    /// Callers that were all rejected with the same token then share a single
    /// refresh instead of discarding each other's replacement.
    pub async fn invalidate_if(&self, rejected: &Credential) {
        let mut cached = self.cached.lock().await;
        if cached
            .as_ref()
            .is_some_and(|c| c.access_token == rejected.access_token)
        {
            cached.take();
            debug!("Invalidated rejected access token");
        }
    }

    /// Number of token exchanges performed so far
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    async fn exchange(&self) -> Result<Credential> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            TripScoutError::auth("Amadeus API key and secret must be set in configuration")
        })?;

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TripScoutError::auth(format!("Amadeus auth request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TripScoutError::auth(format!(
                "Amadeus auth failed with status {status}: {error_text}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            TripScoutError::auth(format!("Failed to parse Amadeus auth response: {e}"))
        })?;

        self.exchanges.fetch_add(1, Ordering::SeqCst);
        info!("Obtained Amadeus access token valid for {}s", token.expires_in);

        Ok(Credential::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
            self.safety_margin,
        ))
    }
}
