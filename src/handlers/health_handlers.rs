//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness: are OAuth and repository settings present?

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::BTreeMap;

/// `GET /healthz`
///
/// Liveness: the process is up and serving. Answers 200 whatever the config.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Reports which configuration groups are missing. No outbound calls are
/// made: a token is needed to talk to the host, and probes carry none.
/// HTTP 200 when every check passes, HTTP 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config();

    let mut checks = BTreeMap::new();
    checks.insert(
        "oauth",
        check(
            config.oauth_credentials().is_some(),
            "GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET must be set",
        ),
    );
    checks.insert(
        "repository",
        check(
            config.repository().is_some(),
            "GITHUB_OWNER and GITHUB_REPO must be set",
        ),
    );

    let overall_ok = checks.values().all(|c| c.ok);
    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

fn check(ok: bool, hint: &str) -> CheckStatus {
    CheckStatus {
        ok,
        error: (!ok).then(|| hint.to_string()),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: BTreeMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
