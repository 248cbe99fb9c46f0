//! GitHub REST "contents" API as a [`ContentHost`].
//!
//! - `GET  /repos/{owner}/{repo}/contents/{path}?ref={branch}` reads a file
//! - `PUT  /repos/{owner}/{repo}/contents/{path}` creates or updates it
//!
//! File bodies travel base64-encoded in both directions.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use reqwest::{StatusCode, Url, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::host::{
    CommitIdentity, CommitInfo, ContentHost, FileWrite, HostError, HostResult, RemoteFile,
    Repository,
};

const API_VERSION: &str = "2022-11-28";
const GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Clone)]
pub struct GitHubHost {
    client: reqwest::Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    path: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    committer: Person<'a>,
    author: Person<'a>,
}

#[derive(Debug, Serialize)]
struct Person<'a> {
    name: &'a str,
    email: &'a str,
}

impl<'a> From<&'a CommitIdentity> for Person<'a> {
    fn from(identity: &'a CommitIdentity) -> Self {
        Self {
            name: &identity.name,
            email: &identity.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    commit: Option<ShaRef>,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

impl GitHubHost {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}` with every segment percent-encoded.
    fn contents_url(&self, repo: &Repository, path: &str) -> HostResult<Url> {
        let mut url =
            Url::parse(&self.api_base).map_err(|err| HostError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| HostError::Url(self.api_base.clone()))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl ContentHost for GitHubHost {
    async fn get_file(
        &self,
        token: &str,
        repo: &Repository,
        path: &str,
    ) -> HostResult<Option<RemoteFile>> {
        let url = self.contents_url(repo, path)?;
        debug!(%url, branch = %repo.branch, "fetching file");

        let response = self
            .client
            .get(url)
            .query(&[("ref", repo.branch.as_str())])
            .bearer_auth(token)
            .header(header::ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: ContentsResponse = response.json().await?;
                decode_contents(body).map(Some)
            }
            status => Err(api_error(status, response).await),
        }
    }

    async fn put_file(
        &self,
        token: &str,
        repo: &Repository,
        write: FileWrite,
    ) -> HostResult<CommitInfo> {
        let url = self.contents_url(repo, &write.path)?;
        let body = PutContentsRequest {
            message: &write.message,
            content: general_purpose::STANDARD.encode(&write.content),
            branch: &repo.branch,
            sha: write.sha.as_deref(),
            committer: Person::from(&write.identity),
            author: Person::from(&write.identity),
        };
        debug!(%url, creating = write.sha.is_none(), "committing file");

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .header(header::ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: PutContentsResponse = response.json().await?;
                Ok(CommitInfo {
                    commit_sha: body.commit.and_then(|c| c.sha),
                })
            }
            StatusCode::CONFLICT => {
                let reason = api_message(response).await;
                Err(HostError::Conflict {
                    path: write.path,
                    reason,
                })
            }
            status => Err(api_error(status, response).await),
        }
    }
}

/// Turn a contents payload into raw bytes.
///
/// GitHub wraps the base64 body at 60 columns, so whitespace is stripped
/// before decoding. Files above the API's inline limit come back with
/// `encoding: "none"` and no content; those are refused rather than read as empty.
fn decode_contents(body: ContentsResponse) -> HostResult<RemoteFile> {
    match body.encoding.as_deref() {
        None | Some("base64") => {}
        Some(other) => {
            return Err(HostError::Payload {
                path: body.path,
                reason: format!("unsupported encoding `{other}` (file too large?)"),
            });
        }
    }

    let compact: String = body
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let content = general_purpose::STANDARD
        .decode(compact)
        .map_err(|err| HostError::Payload {
            path: body.path.clone(),
            reason: err.to_string(),
        })?;

    Ok(RemoteFile {
        path: body.path,
        sha: body.sha,
        content: Bytes::from(content),
    })
}

async fn api_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ApiMessage>().await {
        Ok(ApiMessage {
            message: Some(message),
        }) => message,
        _ => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> HostError {
    HostError::Api {
        status: status.as_u16(),
        message: api_message(response).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::{Value, json};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    const STORED: &[u8] = br#"{"hero":{"name":"Ana"}}"#;

    type Received = Arc<Mutex<Vec<Value>>>;

    /// Minimal stand-in for the contents API, keyed on the file path.
    async fn read(
        Path((_, _, path)): Path<(String, String, String)>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        if query.get("ref").map(String::as_str) != Some("main") {
            return (StatusCode::BAD_REQUEST, "missing ref").into_response();
        }
        match path.as_str() {
            "data.json" => {
                let encoded = general_purpose::STANDARD.encode(STORED);
                let wrapped = format!("{}\n{}\n", &encoded[..8], &encoded[8..]);
                Json(json!({
                    "sha": "abc",
                    "path": "data.json",
                    "content": wrapped,
                    "encoding": "base64"
                }))
                .into_response()
            }
            "private.json" => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Bad credentials" })),
            )
                .into_response(),
            "broken.json" => (StatusCode::BAD_GATEWAY, "<html>oops</html>").into_response(),
            _ => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
        }
    }

    async fn write(State(received): State<Received>, Json(body): Json<Value>) -> Response {
        let stale = body["sha"] == "stale";
        received.lock().unwrap().push(body);
        if stale {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "message": "data.json does not match abc" })),
            )
                .into_response();
        }
        (
            StatusCode::OK,
            Json(json!({ "content": { "sha": "def" }, "commit": { "sha": "c0ffee" } })),
        )
            .into_response()
    }

    async fn stub_host() -> (GitHubHost, Received) {
        let received = Received::default();
        let router = Router::new()
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(read).put(write),
            )
            .with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let host = GitHubHost::new(reqwest::Client::new(), format!("http://{addr}"));
        (host, received)
    }

    fn update(sha: &str) -> FileWrite {
        FileWrite {
            path: "data.json".into(),
            message: "Update hero section via CMS".into(),
            content: Bytes::from_static(STORED),
            sha: Some(sha.into()),
            identity: CommitIdentity {
                name: "Portfolio CMS".into(),
                email: "cms@portfolio.com".into(),
            },
        }
    }

    fn host() -> GitHubHost {
        GitHubHost::new(reqwest::Client::new(), "https://api.github.com")
    }

    fn repo() -> Repository {
        Repository {
            owner: "ana".into(),
            name: "portfolio".into(),
            branch: "main".into(),
        }
    }

    #[test]
    fn contents_url_encodes_segments() {
        let url = host().contents_url(&repo(), "images/blog/my photo.png").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/ana/portfolio/contents/images/blog/my%20photo.png"
        );
    }

    #[test]
    fn contents_url_respects_base_path() {
        let host = GitHubHost::new(reqwest::Client::new(), "https://ghe.example.com/api/v3/");
        let url = host.contents_url(&repo(), "data.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/ana/portfolio/contents/data.json"
        );
    }

    #[test]
    fn decodes_wrapped_base64() {
        let body = ContentsResponse {
            sha: "abc".into(),
            path: "data.json".into(),
            content: "eyJzaXRl\nIjoge319\n".into(),
            encoding: Some("base64".into()),
        };
        let file = decode_contents(body).unwrap();
        assert_eq!(file.content.as_ref(), br#"{"site": {}}"#);
        assert_eq!(file.sha, "abc");
    }

    #[test]
    fn refuses_oversized_payloads() {
        let body = ContentsResponse {
            sha: "abc".into(),
            path: "data.json".into(),
            content: String::new(),
            encoding: Some("none".into()),
        };
        assert!(matches!(
            decode_contents(body),
            Err(HostError::Payload { .. })
        ));
    }

    #[tokio::test]
    async fn reads_map_status_codes() {
        let (host, _) = stub_host().await;

        let file = host.get_file("t", &repo(), "data.json").await.unwrap().unwrap();
        assert_eq!(file.sha, "abc");
        assert_eq!(file.content.as_ref(), STORED);

        assert!(host.get_file("t", &repo(), "missing.json").await.unwrap().is_none());

        match host.get_file("t", &repo(), "private.json").await {
            Err(HostError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected {other:?}"),
        }

        match host.get_file("t", &repo(), "broken.json").await {
            Err(HostError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn writes_send_identity_and_return_the_commit() {
        let (host, received) = stub_host().await;

        let commit = host.put_file("t", &repo(), update("abc")).await.unwrap();
        assert_eq!(commit.commit_sha.as_deref(), Some("c0ffee"));

        let body = received.lock().unwrap()[0].clone();
        assert_eq!(body["sha"], "abc");
        assert_eq!(body["branch"], "main");
        assert_eq!(body["message"], "Update hero section via CMS");
        assert_eq!(body["committer"]["name"], "Portfolio CMS");
        assert_eq!(body["author"]["email"], "cms@portfolio.com");
        assert_eq!(
            body["content"],
            general_purpose::STANDARD.encode(STORED).as_str()
        );
    }

    #[tokio::test]
    async fn write_conflicts_are_reported_as_such() {
        let (host, _) = stub_host().await;
        match host.put_file("t", &repo(), update("stale")).await {
            Err(HostError::Conflict { path, reason }) => {
                assert_eq!(path, "data.json");
                assert_eq!(reason, "data.json does not match abc");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
