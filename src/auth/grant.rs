// Grant flows
// How a fresh token is obtained from the authorization server

use reqwest::{Client, Url};

use super::types::{AccessToken, ClientCredentials, UserCredentials};
use crate::error::AuthError;

/// The grant flow an authenticator was configured with.
/// Selected at construction based on which credential fields were supplied.
#[derive(Debug, Clone)]
pub enum Grant {
    /// Service-to-service flow: a single form POST to the token endpoint
    ClientCredentials(ClientCredentials),

    /// Browser-less authorization-code flow: login, consent, code exchange
    AuthorizationCode(UserCredentials),
}

impl Grant {
    /// Obtain a fresh token from the authorization server.
    /// Stateless between calls apart from the session cookies the HTTP
    /// client carries for the authorization-code flow.
    pub async fn acquire(&self, client: &Client, base: &Url) -> Result<AccessToken, AuthError> {
        match self {
            Grant::ClientCredentials(creds) => {
                tracing::debug!("Acquiring token via client credentials");
                let form = [
                    ("grant_type", "client_credentials"),
                    ("client_id", creds.client_id.as_str()),
                    ("client_secret", creds.client_secret.as_str()),
                ];
                request_token(client, base, &form).await
            }
            Grant::AuthorizationCode(creds) => {
                tracing::debug!("Acquiring token via authorization code");
                let code = fetch_authorization_code(client, base, creds).await?;
                let form = [
                    ("grant_type", "authorization_code"),
                    ("code", code.as_str()),
                    ("redirect_uri", creds.redirect_uri.as_str()),
                    ("client_id", creds.client_id.as_str()),
                    ("client_secret", creds.client_secret.as_str()),
                ];
                request_token(client, base, &form).await
            }
        }
    }
}

/// Exchange a refresh token for a new access token.
/// Independent of the token cache; callers decide whether to adopt the result.
pub async fn refresh(
    client: &Client,
    base: &Url,
    refresh_token: &str,
) -> Result<AccessToken, AuthError> {
    tracing::debug!("Exchanging refresh token");
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];
    request_token(client, base, &form).await
}

/// Simulate the browser part of the authorization-code dance:
/// log in with username/password, then post an implicit consent and read the
/// authorization code off the final redirected URL.
async fn fetch_authorization_code(
    client: &Client,
    base: &Url,
    creds: &UserCredentials,
) -> Result<String, AuthError> {
    // Login. The server hands back session cookies that the following
    // authorize request must carry.
    let login_url = endpoint(base, "Account/login")?;
    let login_form = [
        ("username", creds.username.as_str()),
        ("password", creds.password.as_str()),
        ("isPersistent", "True"),
        ("submit.Signin", "submit.Signin"),
    ];

    let response = client.post(login_url).form(&login_form).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::Authentication(format!(
            "login rejected with status {status}"
        )));
    }

    // Implicit consent. The server answers with a redirect chain whose final
    // URL query string carries the authorization code.
    let mut grant_url = endpoint(base, "authorize")?;
    grant_url
        .query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("state", "")
        .append_pair("client_id", &creds.client_id)
        .append_pair("scope", "")
        .append_pair("redirect_uri", &creds.redirect_uri);

    let response = client
        .post(grant_url)
        .form(&[("submit.Grant", "submit.Grant")])
        .send()
        .await?;

    response
        .url()
        .query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            AuthError::Authentication("authorize redirect carried no code parameter".to_string())
        })
}

/// POST a form to the token endpoint and parse the token response.
/// Anything other than a success status with a parseable body is a failure.
async fn request_token(
    client: &Client,
    base: &Url,
    form: &[(&str, &str)],
) -> Result<AccessToken, AuthError> {
    let token_url = endpoint(base, "token")?;

    let response = client.post(token_url).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "Token endpoint returned an error");
        return Err(AuthError::Authentication(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let token: AccessToken = response
        .json()
        .await
        .map_err(|e| AuthError::Parse(e.to_string()))?;

    if token.access_token.is_empty() {
        return Err(AuthError::Parse(
            "token response carried an empty access_token".to_string(),
        ));
    }

    Ok(token)
}

fn endpoint(base: &Url, path: &str) -> Result<Url, AuthError> {
    base.join(path)
        .map_err(|e| AuthError::Configuration(format!("invalid endpoint {path}: {e}")))
}
