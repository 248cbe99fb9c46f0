//! Outbound side of the service: the repository host, the OAuth provider,
//! and the two write pipelines built on top of them.

pub mod content_service;
pub mod github;
pub mod host;
pub mod image_service;
pub mod memory;
pub mod oauth;
