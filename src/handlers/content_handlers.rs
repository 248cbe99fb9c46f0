//! `POST /update-content`: replace one section of the site document.

use axum::{Json, extract::State};
use bytes::Bytes;
use tracing::warn;

use super::{auth::BearerToken, parse_json};
use crate::{
    errors::AppError,
    models::api::{UpdateRequest, UpdateResponse},
    state::AppState,
};

pub async fn update_content(
    State(state): State<AppState>,
    token: BearerToken,
    body: Bytes,
) -> Result<Json<UpdateResponse>, AppError> {
    let repo = state.config().repository().ok_or_else(|| {
        warn!("content update requested but GITHUB_OWNER / GITHUB_REPO are not configured");
        AppError::configuration()
    })?;

    let request: UpdateRequest = parse_json(&body)?;
    let (section, data) = match (request.section, request.data) {
        (Some(section), Some(data)) if !section.trim().is_empty() => (section, data),
        _ => return Err(AppError::bad_request("Missing section or data")),
    };

    let commit = state
        .content()
        .update_section(token.as_str(), &repo, &section, data)
        .await?;

    Ok(Json(UpdateResponse {
        success: true,
        message: format!("{} updated successfully", commit.section),
        commit: commit.commit_sha,
    }))
}
