use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{env, fmt, str::FromStr, time::Duration};

use crate::services::{
    host::{CommitIdentity, Repository},
    oauth::OAuthCredentials,
};

/// Where content and images are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// GitHub REST API.
    Github,
    /// In-process store; nothing leaves the machine.
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(value, true)
            .map_err(|_| anyhow::anyhow!("unknown backend `{}` (github|memory)", value))
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
///
/// OAuth and repository settings are optional on purpose: the server starts
/// without them and the affected endpoints answer with a configuration error.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: String,
    pub content_path: String,
    pub api_url: String,
    pub oauth_url: String,
    pub raw_url: String,
    pub committer_name: String,
    pub committer_email: String,
    pub strict_writes: bool,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Content API for a GitHub-hosted portfolio site")]
pub struct Args {
    /// Host to bind to (overrides CMS_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CMS_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage backend (overrides CMS_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Repository owner (overrides GITHUB_OWNER)
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (overrides GITHUB_REPO)
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch that receives commits (overrides GITHUB_BRANCH)
    #[arg(long)]
    pub branch: Option<String>,

    /// Path of the site document inside the repository (overrides CMS_CONTENT_PATH)
    #[arg(long)]
    pub content_path: Option<String>,

    /// Fail content updates whose first read is no longer current
    #[arg(long)]
    pub strict_writes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            backend: Backend::Github,
            client_id: None,
            client_secret: None,
            owner: None,
            repo: None,
            branch: "main".into(),
            content_path: "data.json".into(),
            api_url: "https://api.github.com".into(),
            oauth_url: "https://github.com/login/oauth/access_token".into(),
            raw_url: "https://raw.githubusercontent.com".into(),
            committer_name: "Portfolio CMS".into(),
            committer_email: "cms@portfolio.com".into(),
            strict_writes: false,
            request_timeout: Duration::from_secs(15),
            max_upload_bytes: 10 * 1024 * 1024,
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse(), |key| env::var(key).ok())
    }

    /// Merge parsed flags over values produced by `lookup` (normally the process env).
    pub fn from_args(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let cfg = Self {
            host: args.host.or_else(|| var("CMS_HOST")).unwrap_or(defaults.host),
            port: match args.port {
                Some(port) => port,
                None => parse_var(&var, "CMS_PORT", defaults.port)?,
            },
            backend: match args.backend {
                Some(backend) => backend,
                None => parse_var(&var, "CMS_BACKEND", defaults.backend)?,
            },
            client_id: var("GITHUB_CLIENT_ID"),
            client_secret: var("GITHUB_CLIENT_SECRET"),
            owner: args.owner.or_else(|| var("GITHUB_OWNER")),
            repo: args.repo.or_else(|| var("GITHUB_REPO")),
            branch: args
                .branch
                .or_else(|| var("GITHUB_BRANCH"))
                .unwrap_or(defaults.branch),
            content_path: args
                .content_path
                .or_else(|| var("CMS_CONTENT_PATH"))
                .unwrap_or(defaults.content_path),
            api_url: var("GITHUB_API_URL").unwrap_or(defaults.api_url),
            oauth_url: var("GITHUB_OAUTH_URL").unwrap_or(defaults.oauth_url),
            raw_url: var("GITHUB_RAW_URL").unwrap_or(defaults.raw_url),
            committer_name: var("CMS_COMMITTER_NAME").unwrap_or(defaults.committer_name),
            committer_email: var("CMS_COMMITTER_EMAIL").unwrap_or(defaults.committer_email),
            strict_writes: args.strict_writes
                || parse_var(&var, "CMS_STRICT_WRITES", defaults.strict_writes)?,
            request_timeout: Duration::from_secs(parse_var(
                &var,
                "CMS_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            max_upload_bytes: parse_var(&var, "CMS_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// OAuth client credentials, if both halves are configured.
    pub fn oauth_credentials(&self) -> Option<OAuthCredentials> {
        Some(OAuthCredentials {
            client_id: self.client_id.clone()?,
            client_secret: self.client_secret.clone()?,
        })
    }

    /// Target repository, if owner and name are configured.
    pub fn repository(&self) -> Option<Repository> {
        Some(Repository {
            owner: self.owner.clone()?,
            name: self.repo.clone()?,
            branch: self.branch.clone(),
        })
    }

    pub fn identity(&self) -> CommitIdentity {
        CommitIdentity {
            name: self.committer_name.clone(),
            email: self.committer_email.clone(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("addr", &self.addr())
            .field("backend", &self.backend)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("content_path", &self.content_path)
            .field("api_url", &self.api_url)
            .field("strict_writes", &self.strict_writes)
            .field("request_timeout", &self.request_timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(default),
    }
}
