//! The version-control host seen as a file store with commits.
//!
//! Everything the services persist goes through [`ContentHost`]: read one
//! file on a branch, or commit a full new copy of it. Writes are whole-file;
//! the host serializes them per path.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Owner/name/branch triple that every host call is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

/// Name and email recorded as author and committer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// A file as currently stored on the branch.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub path: String,
    /// Blob sha; required to update the file.
    pub sha: String,
    pub content: Bytes,
}

/// A full-file write. `sha: None` creates the file, `Some` updates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FileWrite {
    pub path: String,
    pub message: String,
    pub content: Bytes,
    pub sha: Option<String>,
    pub identity: CommitIdentity,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitInfo {
    pub commit_sha: Option<String>,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("write conflict on `{path}`: {reason}")]
    Conflict { path: String, reason: String },
    #[error("host responded {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unreadable file `{path}`: {reason}")]
    Payload { path: String, reason: String },
    #[error("invalid host url: {0}")]
    Url(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type HostResult<T> = Result<T, HostError>;

/// File access on a remote repository, authorized per call by the caller's token.
#[async_trait]
pub trait ContentHost: Send + Sync {
    /// Fetch a file. An absent file is `Ok(None)`, not an error.
    async fn get_file(
        &self,
        token: &str,
        repo: &Repository,
        path: &str,
    ) -> HostResult<Option<RemoteFile>>;

    /// Commit a full copy of `write.path` on the repository branch.
    async fn put_file(
        &self,
        token: &str,
        repo: &Repository,
        write: FileWrite,
    ) -> HostResult<CommitInfo>;
}
