// Error handling module
// Defines the authentication and API error taxonomies

use thiserror::Error;

/// Errors produced by the OAuth2 core.
///
/// Clonable on purpose: a failed acquisition is shared with every caller
/// that was waiting on the same in-flight attempt.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// Invalid construction-time configuration (e.g. non-https authorization server)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login rejected, grant denied, missing authorization code, or a
    /// non-success response from the token endpoint
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Connection refused, timeout, or other transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Token response did not match the expected shape
    #[error("Malformed token response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Parse(err.to_string())
        } else {
            AuthError::Transport(err.to_string())
        }
    }
}

/// Errors produced by the data-fetch client
#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable bearer token; the outer request was never sent
    #[error("No token available: {0}")]
    Auth(#[from] AuthError),

    /// Non-success response from the hydrology API
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected DTO shape
    #[error("Malformed API response: {0}")]
    Parse(String),

    /// Transport-level failure while talking to the hydrology API
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Result type alias for data-fetch operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        let err = AuthError::Configuration("Only https is supported".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Only https is supported"
        );

        let err = AuthError::Authentication("login rejected".to_string());
        assert_eq!(err.to_string(), "Authentication failed: login rejected");

        let err = AuthError::Parse("missing access_token".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed token response: missing access_token"
        );
    }

    #[test]
    fn test_auth_error_is_clonable() {
        let err = AuthError::Transport("connection refused".to_string());
        let shared = err.clone();
        assert_eq!(err.to_string(), shared.to_string());
    }

    #[test]
    fn test_api_error_from_auth_error() {
        let err = ApiError::from(AuthError::Authentication("no token".to_string()));
        assert_eq!(
            err.to_string(),
            "No token available: Authentication failed: no token"
        );
    }

    #[test]
    fn test_api_error_messages() {
        let err = ApiError::Api {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - not found");
    }
}
