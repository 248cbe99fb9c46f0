//! In-process [`ContentHost`] used for dry runs (`--backend memory`) and tests.
//!
//! Follows the same rules as the real host: creating requires the file to be
//! absent, updating requires the current blob sha. Every call is counted so
//! callers can check that no host traffic happened.

use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use super::host::{
    CommitInfo, ContentHost, FileWrite, HostError, HostResult, RemoteFile, Repository,
};

type FileKey = (String, String, String, String);

#[derive(Default)]
pub struct MemoryHost {
    files: Mutex<HashMap<FileKey, RemoteFile>>,
    writes: Mutex<Vec<FileWrite>>,
    reads: AtomicUsize,
    revision: AtomicU64,
}

fn key(repo: &Repository, path: &str) -> FileKey {
    (
        repo.owner.clone(),
        repo.name.clone(),
        repo.branch.clone(),
        path.to_string(),
    )
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sha(&self) -> String {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{revision:040x}")
    }

    /// Place a file directly, without recording a write.
    pub fn seed(&self, repo: &Repository, path: &str, content: impl Into<Bytes>) -> String {
        let sha = self.next_sha();
        let file = RemoteFile {
            path: path.to_string(),
            sha: sha.clone(),
            content: content.into(),
        };
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key(repo, path), file);
        sha
    }

    /// Current copy of a file, bypassing the read counter.
    pub fn file(&self, repo: &Repository, path: &str) -> Option<RemoteFile> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key(repo, path))
            .cloned()
    }

    /// Every accepted write, oldest first.
    pub fn writes(&self) -> Vec<FileWrite> {
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentHost for MemoryHost {
    async fn get_file(
        &self,
        _token: &str,
        repo: &Repository,
        path: &str,
    ) -> HostResult<Option<RemoteFile>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.file(repo, path))
    }

    async fn put_file(
        &self,
        _token: &str,
        repo: &Repository,
        write: FileWrite,
    ) -> HostResult<CommitInfo> {
        let mut files = self
            .files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let file_key = key(repo, &write.path);
        let current = files.get(&file_key).map(|file| file.sha.clone());

        match (&current, &write.sha) {
            (None, None) => {}
            (Some(found), Some(expected)) if found == expected => {}
            (Some(found), None) => {
                return Err(HostError::Conflict {
                    path: write.path,
                    reason: format!("file exists at {found} but no sha was supplied"),
                });
            }
            (found, Some(expected)) => {
                return Err(HostError::Conflict {
                    path: write.path,
                    reason: format!("expected {expected}, found {found:?}"),
                });
            }
        }

        let content_sha = self.next_sha();
        let commit_sha = self.next_sha();
        files.insert(
            file_key,
            RemoteFile {
                path: write.path.clone(),
                sha: content_sha,
                content: write.content.clone(),
            },
        );
        drop(files);

        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(write);

        Ok(CommitInfo {
            commit_sha: Some(commit_sha),
        })
    }
}
