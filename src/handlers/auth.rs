//! Bearer-token extraction.
//!
//! The token is opaque here: it is never inspected or verified locally. The
//! repository host accepts or rejects it on the first call that uses it.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::errors::AppError;

/// Token from an `Authorization: Bearer <token>` header.
///
/// Rejects with 401 before the handler runs, so no outbound call can happen
/// for an unauthenticated request.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| BearerToken(token.to_string()))
            .ok_or_else(AppError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(header: Option<&str>) -> Result<BearerToken, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("authorization", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        BearerToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn accepts_bearer_tokens() {
        let token = extract(Some("Bearer gho_abc")).await.unwrap();
        assert_eq!(token.as_str(), "gho_abc");
    }

    #[tokio::test]
    async fn rejects_missing_or_malformed_headers() {
        for header in [None, Some("gho_abc"), Some("Basic Zm9v"), Some("Bearer "), Some("bearer x")] {
            let err = extract(header).await.unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED, "{header:?}");
        }
    }

    #[test]
    fn debug_hides_the_token() {
        assert!(!format!("{:?}", BearerToken("gho_abc".into())).contains("gho_abc"));
    }
}
