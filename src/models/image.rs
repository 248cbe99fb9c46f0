//! Uploaded images: category directories and collision-free file naming.

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};

/// Where an upload lands in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageCategory {
    Portfolio,
    Blog,
    Profile,
    /// `general` and anything unrecognised.
    #[default]
    General,
}

impl ImageCategory {
    /// Map the submitted form value; unknown values fall back to `General`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "portfolio" => Self::Portfolio,
            "blog" => Self::Blog,
            "profile" => Self::Profile,
            _ => Self::General,
        }
    }

    /// Repository directory, always with a trailing slash.
    pub fn directory(self) -> &'static str {
        match self {
            Self::Portfolio => "images/portfolio/",
            Self::Blog => "images/blog/",
            Self::Profile => "images/profile/",
            Self::General => "images/uploads/",
        }
    }
}

/// An image received from the admin panel, ready to be committed.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub category: ImageCategory,
    pub bytes: bytes::Bytes,
}

/// Result of a committed upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoredImage {
    pub url: String,
    pub path: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Millisecond stamps that never repeat within the process.
///
/// Two uploads arriving in the same millisecond get consecutive stamps, so
/// `{base}_{stamp}{ext}` stays unique even for identical original names.
#[derive(Debug, Default)]
pub struct UploadClock {
    last: AtomicI64,
}

impl UploadClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}

/// Last path component of a client-supplied filename; browsers may send
/// `C:\fakepath\x.png`. Empty when the name ends in a separator.
pub fn base_name(original: &str) -> &str {
    original.rsplit(['/', '\\']).next().unwrap_or(original)
}

/// Build `{base}_{stamp}{ext}` from a client-supplied filename.
///
/// Only the [`base_name`] is kept, and anything outside `[A-Za-z0-9._-]`
/// becomes `-` so the name is safe in both repository paths and raw-content URLs.
pub fn unique_filename(original: &str, stamp: i64) -> String {
    let cleaned: String = base_name(original)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let (base, extension) = split_extension(&cleaned);
    format!("{base}_{stamp}{extension}")
}

/// Split at the last dot; a leading dot belongs to the base name.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}

/// Public raw-content URL for a committed path.
pub fn raw_url(raw_base: &str, owner: &str, repo: &str, branch: &str, path: &str) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        raw_base.trim_end_matches('/'),
        owner,
        repo,
        branch,
        path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_fixed_directories() {
        assert_eq!(ImageCategory::parse("portfolio").directory(), "images/portfolio/");
        assert_eq!(ImageCategory::parse(" blog \n").directory(), "images/blog/");
        assert_eq!(ImageCategory::parse("profile").directory(), "images/profile/");
        assert_eq!(ImageCategory::parse("general").directory(), "images/uploads/");
        assert_eq!(ImageCategory::parse("Portfolio"), ImageCategory::General);
        assert_eq!(ImageCategory::default(), ImageCategory::General);
    }

    #[test]
    fn base_name_drops_directories() {
        assert_eq!(base_name("C:\\fakepath\\shot.png"), "shot.png");
        assert_eq!(base_name("a/b/c.jpg"), "c.jpg");
        assert_eq!(base_name("photos/"), "");
        assert_eq!(base_name("plain.gif"), "plain.gif");
    }

    #[test]
    fn filename_keeps_base_and_extension() {
        assert_eq!(unique_filename("sunset.jpg", 42), "sunset_42.jpg");
        assert_eq!(unique_filename("archive.tar.gz", 1), "archive.tar_1.gz");
        assert_eq!(unique_filename("README", 1), "README_1");
        assert_eq!(unique_filename(".hidden", 1), ".hidden_1");
    }

    #[test]
    fn filename_drops_directories_and_odd_characters() {
        assert_eq!(
            unique_filename("C:\\fakepath\\my photo.png", 7),
            "my-photo_7.png"
        );
        assert_eq!(unique_filename("../../etc/passwd", 7), "passwd_7");
        assert_eq!(unique_filename("año nuevo.webp", 7), "a-o-nuevo_7.webp");
    }

    #[test]
    fn clock_never_repeats() {
        let clock = UploadClock::new();
        let stamps: Vec<i64> = (0..1000).map(|_| clock.next_millis()).collect();
        assert!(stamps.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn raw_url_follows_template() {
        assert_eq!(
            raw_url(
                "https://raw.githubusercontent.com/",
                "ana",
                "site",
                "main",
                "images/blog/a_1.png"
            ),
            "https://raw.githubusercontent.com/ana/site/main/images/blog/a_1.png"
        );
    }
}
