//! HTTP handlers for the function endpoints and health probes.

pub mod auth;
pub mod content_handlers;
pub mod health_handlers;
pub mod image_handlers;
pub mod token_handlers;

use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Decode a JSON request body; malformed input is the caller's fault.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request("Invalid JSON body").with_details(err.to_string()))
}

/// Fallback for any method other than `POST` / `OPTIONS` on a function route.
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}
