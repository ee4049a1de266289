// OAuth2 core
// Token lifecycle: acquisition, caching, expiry, refresh

mod grant;
mod manager;
mod types;

pub use manager::Authenticator;
pub use types::{AccessToken, CachedToken, ClientCredentials, UserCredentials};

use crate::error::AuthError;

/// HTTP client used for all authorization-server traffic.
/// Cookie store on: the authorization-code flow spans several requests that
/// the server ties together through session cookies. The bounded timeout
/// keeps a hung authorization server from stalling callers indefinitely.
pub(crate) fn http_client() -> Result<reqwest::Client, AuthError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| AuthError::Configuration(format!("failed to create HTTP client: {e}")))
}
