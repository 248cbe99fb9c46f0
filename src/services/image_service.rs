//! ImageService: commit uploaded images under their category directory.

use std::sync::Arc;
use tracing::info;

use super::host::{CommitIdentity, ContentHost, FileWrite, HostResult, Repository};
use crate::models::image::{ImageUpload, StoredImage, UploadClock, raw_url, unique_filename};

#[derive(Clone)]
pub struct ImageService {
    host: Arc<dyn ContentHost>,
    raw_base: String,
    identity: CommitIdentity,
    clock: Arc<UploadClock>,
}

impl ImageService {
    pub fn new(host: Arc<dyn ContentHost>, raw_base: impl Into<String>, identity: CommitIdentity) -> Self {
        Self {
            host,
            raw_base: raw_base.into(),
            identity,
            clock: Arc::new(UploadClock::new()),
        }
    }

    /// Commit the image as a new file and return its public URL.
    ///
    /// The generated name is unique, so the file is always created without
    /// checking for an existing one first.
    pub async fn store(
        &self,
        token: &str,
        repo: &Repository,
        upload: ImageUpload,
    ) -> HostResult<StoredImage> {
        let filename = unique_filename(&upload.filename, self.clock.next_millis());
        let path = format!("{}{}", upload.category.directory(), filename);

        let commit = self
            .host
            .put_file(
                token,
                repo,
                FileWrite {
                    path: path.clone(),
                    message: format!("Upload image: {filename}"),
                    content: upload.bytes,
                    sha: None,
                    identity: self.identity.clone(),
                },
            )
            .await?;

        info!(
            %path,
            commit = commit.commit_sha.as_deref().unwrap_or("-"),
            "image committed"
        );

        Ok(StoredImage {
            url: raw_url(&self.raw_base, &repo.owner, &repo.name, &repo.branch, &path),
            path,
            filename,
            commit: commit.commit_sha,
        })
    }
}
