//! Request and response bodies of the function endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /exchange-token` body.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub code: Option<String>,
}

/// Token fields handed back to the admin panel exactly as the provider sent them.
#[derive(Debug, Serialize, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// `POST /update-content` body. Both fields are optional here so that a
/// missing one produces a 400 with a useful message instead of a parse error.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub section: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub path: String,
    pub filename: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}
