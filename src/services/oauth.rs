//! OAuth authorization-code exchange against the identity provider.

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client credentials registered with the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Provider token endpoint body. GitHub answers 200 for failures too and
/// reports them through `error` / `error_description`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProviderToken {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("token endpoint unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned {status} with an unreadable body")]
    Malformed { status: u16 },
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn exchange(
        &self,
        credentials: &OAuthCredentials,
        code: &str,
    ) -> Result<ProviderToken, OAuthError>;
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// GitHub's `login/oauth/access_token` endpoint.
#[derive(Clone)]
pub struct GitHubOAuth {
    client: reqwest::Client,
    token_url: String,
}

impl GitHubOAuth {
    pub fn new(client: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for GitHubOAuth {
    async fn exchange(
        &self,
        credentials: &OAuthCredentials,
        code: &str,
    ) -> Result<ProviderToken, OAuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .header(header::ACCEPT, "application/json")
            .json(&ExchangeRequest {
                client_id: &credentials.client_id,
                client_secret: &credentials.client_secret,
                code,
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|_| OAuthError::Malformed { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_the_secret() {
        let credentials = OAuthCredentials {
            client_id: "id-123".into(),
            client_secret: "shh".into(),
        };
        let printed = format!("{credentials:?}");
        assert!(printed.contains("id-123"));
        assert!(!printed.contains("shh"));
    }

    #[test]
    fn provider_error_body_decodes() {
        let token: ProviderToken = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired.","error_uri":"https://docs"}"#,
        )
        .unwrap();
        assert_eq!(token.error.as_deref(), Some("bad_verification_code"));
        assert!(token.access_token.is_none());
    }
}
