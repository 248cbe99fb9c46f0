//! ContentService: replace one section of the site document and commit it.
//!
//! Read, modify and write are separate host calls, so two editors saving at
//! the same time can overwrite each other (last writer wins). With
//! `strict_writes` the blob sha seen on the first read must still be current
//! right before the commit; otherwise the update fails with a conflict.

use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::host::{CommitIdentity, ContentHost, FileWrite, HostError, Repository};
use crate::models::document::{DocumentError, SiteDocument};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("`{path}` changed since it was read (read {read:?}, now {current:?})")]
    Stale {
        path: String,
        read: Option<String>,
        current: Option<String>,
    },
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Outcome of a committed section update.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionCommit {
    pub section: String,
    pub commit_sha: Option<String>,
    /// True when the content file did not exist and was created.
    pub created: bool,
}

#[derive(Clone)]
pub struct ContentService {
    host: Arc<dyn ContentHost>,
    content_path: String,
    identity: CommitIdentity,
    strict_writes: bool,
}

impl ContentService {
    pub fn new(
        host: Arc<dyn ContentHost>,
        content_path: impl Into<String>,
        identity: CommitIdentity,
        strict_writes: bool,
    ) -> Self {
        Self {
            host,
            content_path: content_path.into(),
            identity,
            strict_writes,
        }
    }

    /// Replace `section` with `data` and commit the whole document.
    ///
    /// A blank section name is refused before any host call. `data` is stored
    /// as sent; sections that stray from their usual shape are only logged. A
    /// missing content file starts from the default layout; any other read
    /// failure aborts with nothing written.
    pub async fn update_section(
        &self,
        token: &str,
        repo: &Repository,
        section: &str,
        data: Value,
    ) -> ContentResult<SectionCommit> {
        if section.trim().is_empty() {
            return Err(DocumentError::EmptySection.into());
        }

        let path = self.content_path.as_str();
        let base = self.host.get_file(token, repo, path).await?;
        let mut document = match &base {
            Some(file) => SiteDocument::from_slice(&file.content)?,
            None => {
                warn!(path, branch = %repo.branch, "content file missing; starting from default layout");
                SiteDocument::default_layout()
            }
        };

        document.replace_section(section, data);
        for problem in document.schema_problems() {
            warn!(path, %problem, "section does not match its usual shape; committing as-is");
        }
        let content = Bytes::from(document.to_pretty_bytes()?);

        // Re-check right before writing to pick create vs update.
        let current = self.host.get_file(token, repo, path).await?;
        let read_sha = base.map(|file| file.sha);
        let current_sha = current.map(|file| file.sha);
        if self.strict_writes && read_sha != current_sha {
            return Err(ContentError::Stale {
                path: path.to_string(),
                read: read_sha,
                current: current_sha,
            });
        }

        let created = current_sha.is_none();
        let message = if created {
            format!("Initial {path} via CMS")
        } else {
            format!("Update {section} section via CMS")
        };

        let commit = self
            .host
            .put_file(
                token,
                repo,
                FileWrite {
                    path: path.to_string(),
                    message,
                    content,
                    sha: current_sha,
                    identity: self.identity.clone(),
                },
            )
            .await?;

        info!(
            path,
            section,
            created,
            commit = commit.commit_sha.as_deref().unwrap_or("-"),
            "section committed"
        );

        Ok(SectionCommit {
            section: section.to_string(),
            commit_sha: commit.commit_sha,
            created,
        })
    }
}
