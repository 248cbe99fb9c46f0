use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{
    models::document::DocumentError,
    services::{content_service::ContentError, host::HostError, oauth::OAuthError},
};

/// A lightweight error carried back to the admin panel.
///
/// `details` holds upstream text (host or provider messages). It is returned
/// verbatim so a single operator can see what went wrong.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Shortcut for a 500 Internal Server Error with upstream detail attached.
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").with_details(details)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Missing or invalid token",
        )
    }

    /// Required settings are absent; raised before any outbound call.
    pub fn configuration() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), "{}", self);
        }

        let mut body = json!({
            "error": self.message,
            "status": self.status.as_u16()
        });
        if let Some(details) = self.details {
            body["details"] = json!(details);
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<HostError> for AppError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Conflict { .. } => {
                AppError::new(StatusCode::CONFLICT, "Content changed on the host")
                    .with_details(err.to_string())
            }
            other => AppError::internal(other.to_string()),
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::EmptySection => AppError::bad_request("Missing section or data"),
            other => AppError::internal(other.to_string()),
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Document(err) => err.into(),
            ContentError::Host(err) => err.into(),
            stale @ ContentError::Stale { .. } => {
                AppError::new(StatusCode::CONFLICT, "Content changed since it was read")
                    .with_details(stale.to_string())
            }
        }
    }
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_conflicts_are_409_other_failures_500() {
        let conflict: AppError = HostError::Conflict {
            path: "data.json".into(),
            reason: "sha mismatch".into(),
        }
        .into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let api: AppError = HostError::Api {
            status: 401,
            message: "Bad credentials".into(),
        }
        .into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Internal server error");
        assert!(api.details.unwrap().contains("Bad credentials"));
    }

    #[test]
    fn blank_sections_are_client_errors_corrupt_stores_are_not() {
        let err: AppError = ContentError::Document(DocumentError::EmptySection).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing section or data");

        let corrupt: AppError = ContentError::Document(DocumentError::NotAnObject).into();
        assert_eq!(corrupt.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
