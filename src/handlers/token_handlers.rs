//! `POST /exchange-token`: trade an OAuth authorization code for a token.

use axum::{Json, extract::State};
use bytes::Bytes;
use tracing::{info, warn};

use super::parse_json;
use crate::{
    errors::AppError,
    models::api::{TokenGrant, TokenRequest},
    state::AppState,
};

/// Exchange `{code}` for `{access_token, token_type, scope}`.
///
/// Pure pass-through: the token is neither stored nor inspected. Provider
/// rejections come back as 400 with the provider's description attached.
pub async fn exchange_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenGrant>, AppError> {
    let credentials = state.config().oauth_credentials().ok_or_else(|| {
        warn!("token exchange requested but OAuth client credentials are not configured");
        AppError::configuration()
    })?;

    let request: TokenRequest = parse_json(&body)?;
    let code = request
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing authorization code"))?;

    let token = state.tokens().exchange(&credentials, &code).await?;

    if let Some(error) = token.error {
        warn!(%error, "provider rejected authorization code");
        return Err(AppError::bad_request("Token exchange failed")
            .with_details(token.error_description.unwrap_or(error)));
    }

    let access_token = token.access_token.ok_or_else(|| {
        AppError::bad_request("Token exchange failed")
            .with_details("provider response carried no access token")
    })?;

    info!(scope = token.scope.as_deref().unwrap_or(""), "authorization code exchanged");

    Ok(Json(TokenGrant {
        access_token,
        token_type: token.token_type,
        scope: token.scope,
    }))
}
