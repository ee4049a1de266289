// Authenticator
// Token cache and single-flight acquisition on top of the grant flows

use chrono::Utc;
use reqwest::{Client, Url};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

use super::grant::{self, Grant};
use super::types::{AccessToken, CachedToken, ClientCredentials, UserCredentials};
use crate::error::AuthError;

/// OAuth2 authenticator.
///
/// Owns the cached token and one grant flow, chosen at construction. The
/// data-fetch client calls [`get_access_token`](Self::get_access_token)
/// before every request; a warm cache is served with no network call and
/// without touching the acquisition lock.
#[derive(Debug)]
pub struct Authenticator {
    /// Authorization server base, always with a trailing slash
    base_url: Url,

    /// Grant flow this instance was configured with
    grant: Grant,

    /// HTTP client; carries the session cookies the authorization-code
    /// flow depends on
    client: Client,

    /// Cached token, written only after a successful acquisition
    cached: RwLock<Option<CachedToken>>,

    /// Serializes acquisitions and holds the most recent in-flight failure
    acquire: Mutex<FlightState>,

    /// Bumped once per finished acquisition attempt, success or failure.
    /// Read before queueing on the lock to detect an attempt that completed
    /// while waiting.
    generation: AtomicU64,
}

#[derive(Debug)]
struct FlightState {
    last_error: Option<AuthError>,
}

impl Authenticator {
    /// Authenticator using the client-credentials flow
    pub fn client_credentials(
        base_url: &str,
        credentials: ClientCredentials,
    ) -> Result<Self, AuthError> {
        let base_url = parse_base_url(base_url)?;
        Self::with_grant(base_url, Grant::ClientCredentials(credentials))
    }

    /// Authenticator using the browser-less authorization-code flow.
    /// Fails immediately if the authorization server address is not https;
    /// credentials never travel over an unencrypted transport.
    pub fn authorization_code(
        base_url: &str,
        credentials: UserCredentials,
    ) -> Result<Self, AuthError> {
        let base_url = parse_base_url(base_url)?;
        if base_url.scheme() != "https" {
            return Err(AuthError::Configuration(
                "Only https is supported for the authorization-code flow".to_string(),
            ));
        }
        Self::with_grant(base_url, Grant::AuthorizationCode(credentials))
    }

    /// Authorization-code authenticator without the https requirement,
    /// for tests that run against a plain-http mock server
    #[cfg(any(test, feature = "test-utils"))]
    pub fn authorization_code_insecure(
        base_url: &str,
        credentials: UserCredentials,
    ) -> Result<Self, AuthError> {
        let base_url = parse_base_url(base_url)?;
        Self::with_grant(base_url, Grant::AuthorizationCode(credentials))
    }

    fn with_grant(base_url: Url, grant: Grant) -> Result<Self, AuthError> {
        Ok(Self {
            base_url,
            grant,
            client: super::http_client()?,
            cached: RwLock::new(None),
            acquire: Mutex::new(FlightState { last_error: None }),
            generation: AtomicU64::new(0),
        })
    }

    /// Get a usable bearer token.
    ///
    /// With `force_update` false a cached token inside its safety margin is
    /// returned as-is. Otherwise one acquisition runs through the configured
    /// grant flow; concurrent callers during a miss coalesce onto that single
    /// attempt and all receive its result. A failed acquisition never touches
    /// the cache.
    pub async fn get_access_token(&self, force_update: bool) -> Result<AccessToken, AuthError> {
        if !force_update {
            if let Some(token) = self.cached_token().await {
                return Ok(token);
            }
        }

        let observed = self.generation.load(Ordering::Acquire);
        let mut flight = self.acquire.lock().await;

        // An acquisition finished while we were queued on the lock; share
        // its outcome instead of going to the network again.
        if !force_update && self.generation.load(Ordering::Acquire) != observed {
            if let Some(err) = &flight.last_error {
                return Err(err.clone());
            }
            if let Some(token) = self.cached_token().await {
                return Ok(token);
            }
        }

        let result = self.grant.acquire(&self.client, &self.base_url).await;

        match result {
            Ok(token) => {
                let mut cached = self.cached.write().await;
                *cached = Some(CachedToken {
                    token: token.clone(),
                    issued_at: Utc::now(),
                });
                flight.last_error = None;
                self.generation.fetch_add(1, Ordering::AcqRel);
                tracing::debug!(expires_in = token.expires_in, "Token acquired");
                Ok(token)
            }
            Err(err) => {
                tracing::error!("Token acquisition failed: {err}");
                flight.last_error = Some(err.clone());
                self.generation.fetch_add(1, Ordering::AcqRel);
                Err(err)
            }
        }
    }

    /// Exchange a refresh token for a new access token.
    /// Deliberately cache-neutral: the result is handed to the caller and the
    /// shared cache is neither consulted nor updated.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        grant::refresh(&self.client, &self.base_url, refresh_token).await
    }

    async fn cached_token(&self) -> Option<AccessToken> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|entry| entry.is_valid_at(Utc::now()))
            .map(|entry| entry.token.clone())
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, AuthError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| AuthError::Configuration(format!("invalid base url {base_url}: {e}")))?;

    // Endpoint paths are joined onto the base, which only works with a
    // trailing slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
