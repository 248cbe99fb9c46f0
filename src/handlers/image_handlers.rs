//! `POST /upload-image`: commit an image from a multipart form.
//!
//! Expected fields: `image` (file part with a filename) and an optional
//! `category` text part.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderMap, header},
};
use bytes::Bytes;
use tracing::{debug, warn};

use super::auth::BearerToken;
use crate::{
    errors::AppError,
    models::{
        api::UploadResponse,
        image::{ImageCategory, ImageUpload, base_name},
    },
    state::AppState,
};

pub async fn upload_image(
    State(state): State<AppState>,
    token: BearerToken,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let repo = state.config().repository().ok_or_else(|| {
        warn!("image upload requested but GITHUB_OWNER / GITHUB_REPO are not configured");
        AppError::configuration()
    })?;

    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with("multipart/form-data"));
    if !is_multipart {
        return Err(AppError::bad_request(
            "Content-Type must be multipart/form-data",
        ));
    }

    let multipart = multipart.map_err(|rejection| {
        AppError::bad_request("Invalid multipart form data").with_details(rejection.body_text())
    })?;
    let upload = read_upload(multipart).await?;

    let stored = state.images().store(token.as_str(), &repo, upload).await?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        path: stored.path,
        filename: stored.filename,
        message: "Image uploaded successfully".into(),
        commit: stored.commit,
    }))
}

/// Pull the image part and optional category out of the form.
async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    let mut image: Option<(String, Bytes)> = None;
    let mut category = ImageCategory::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().map(str::to_owned).unwrap_or_default();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                debug!(%filename, size = bytes.len(), "received image part");
                image = Some((filename, bytes));
            }
            Some("category") => {
                let value = field.text().await.map_err(multipart_error)?;
                category = ImageCategory::parse(&value);
            }
            other => debug!(field = ?other, "ignoring form field"),
        }
    }

    match image {
        Some((filename, bytes)) if !base_name(&filename).trim().is_empty() && !bytes.is_empty() => {
            Ok(ImageUpload {
                filename,
                category,
                bytes,
            })
        }
        _ => Err(AppError::bad_request("Missing image data or filename")),
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    let status = err.status();
    let message = if status == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        "Image exceeds the upload size limit"
    } else {
        "Invalid multipart form data"
    };
    AppError::new(status, message).with_details(err.body_text())
}
