// OAuth2 types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Safety margin subtracted from the nominal token lifetime, so a token
/// is never handed out when it could die mid-request.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Bearer token as returned by the authorization server's token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque token content, used verbatim in `Authorization: Bearer <token>`
    pub access_token: String,

    /// Token lifetime in seconds from issuance
    pub expires_in: u64,

    /// Refresh token; only present for flows that support refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type, informational (normally "Bearer")
    #[serde(default)]
    pub token_type: String,
}

/// Cached token together with the instant it was acquired.
/// Owned exclusively by the [`Authenticator`](super::Authenticator);
/// set on every successful acquisition, never cleared on failure.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: AccessToken,
    pub issued_at: DateTime<Utc>,
}

impl CachedToken {
    /// Whether the token is still usable at `now`, applying the safety margin
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let lifetime = Duration::seconds(self.token.expires_in as i64 - EXPIRY_MARGIN_SECS);
        self.issued_at + lifetime > now
    }
}

/// Immutable credential set for the client-credentials flow
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Immutable credential set for the authorization-code flow.
/// Username and password drive the simulated browser login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub redirect_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: u64) -> AccessToken {
        AccessToken {
            access_token: "abc".to_string(),
            expires_in,
            refresh_token: None,
            token_type: "Bearer".to_string(),
        }
    }

    #[test]
    fn test_cached_token_valid_inside_margin() {
        let issued_at = Utc::now();
        let cached = CachedToken {
            token: token(3600),
            issued_at,
        };

        // 61 seconds before nominal expiry: still valid
        assert!(cached.is_valid_at(issued_at + Duration::seconds(3600 - 61)));

        // 59 seconds before nominal expiry: inside the margin, expired
        assert!(!cached.is_valid_at(issued_at + Duration::seconds(3600 - 59)));
    }

    #[test]
    fn test_short_lived_token_is_always_expired() {
        // Lifetime shorter than the margin: never valid
        let cached = CachedToken {
            token: token(30),
            issued_at: Utc::now(),
        };
        assert!(!cached.is_valid_at(cached.issued_at));
    }

    #[test]
    fn test_token_deserializes_without_optional_fields() {
        let token: AccessToken =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":3600}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
        assert!(token.refresh_token.is_none());
        assert_eq!(token.token_type, "");
    }
}
