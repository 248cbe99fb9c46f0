use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{
    config::{AppConfig, Backend},
    services::{
        content_service::ContentService,
        github::GitHubHost,
        host::ContentHost,
        image_service::ImageService,
        memory::MemoryHost,
        oauth::{GitHubOAuth, TokenProvider},
    },
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: AppConfig,
    tokens: Arc<dyn TokenProvider>,
    content: ContentService,
    images: ImageService,
}

impl AppState {
    /// Wire services around an explicit host and token provider.
    pub fn new(
        config: AppConfig,
        host: Arc<dyn ContentHost>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let content = ContentService::new(
            host.clone(),
            config.content_path.clone(),
            config.identity(),
            config.strict_writes,
        );
        let images = ImageService::new(host, config.raw_url.clone(), config.identity());

        Self {
            inner: Arc::new(InnerState {
                config,
                tokens,
                content,
                images,
            }),
        }
    }

    /// Build the production wiring: one shared HTTP client with the outbound
    /// timeout, the configured backend, and GitHub as the OAuth provider.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .context("building HTTP client")?;

        let host: Arc<dyn ContentHost> = match config.backend {
            Backend::Github => Arc::new(GitHubHost::new(client.clone(), config.api_url.clone())),
            Backend::Memory => Arc::new(MemoryHost::new()),
        };
        let tokens = Arc::new(GitHubOAuth::new(client, config.oauth_url.clone()));

        Ok(Self::new(config, host, tokens))
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn tokens(&self) -> &dyn TokenProvider {
        self.inner.tokens.as_ref()
    }

    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }

    pub fn images(&self) -> &ImageService {
        &self.inner.images
    }
}
