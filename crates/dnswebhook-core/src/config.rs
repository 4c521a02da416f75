//! Configuration types for the webhook
//!
//! Configuration is built once at startup and handed to the constructors by
//! value. Nothing in this crate reads flags or environment variables.

use crate::model::DomainFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default STACKIT DNS API endpoint
pub const DEFAULT_BASE_URL: &str = "https://dns.api.stackit.cloud";

/// Default number of concurrent workers per operation
pub const DEFAULT_WORKERS: usize = 10;

/// Default HTTP timeout for API requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the bearer credential attached to every API call
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// Static bearer token
    Token {
        /// The token value
        token: String,
    },

    /// Path to a key file holding the credential
    KeyFile {
        /// Location of the key file
        path: PathBuf,
    },
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<REDACTED>")
                .finish(),
            Credentials::KeyFile { path } => {
                f.debug_struct("KeyFile").field("path", path).finish()
            }
        }
    }
}

/// Remote API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the DNS API (no trailing path)
    pub base_url: String,

    /// Bearer credential source
    pub credentials: Credentials,

    /// Per-request HTTP timeout
    #[serde(default = "default_http_timeout")]
    pub timeout: Duration,
}

impl ApiConfig {
    /// Build the API configuration from the raw option values.
    ///
    /// Exactly one of `token` and `key_path` must be non-empty, and the base
    /// URL is required.
    pub fn from_options(
        base_url: &str,
        token: Option<&str>,
        key_path: Option<&str>,
    ) -> Result<Self, crate::Error> {
        if base_url.is_empty() {
            return Err(crate::Error::config("base-url is required"));
        }

        let token = token.filter(|t| !t.is_empty());
        let key_path = key_path.filter(|p| !p.is_empty());

        let credentials = match (token, key_path) {
            (Some(token), None) => Credentials::Token {
                token: token.to_string(),
            },
            (None, Some(path)) => Credentials::KeyFile {
                path: PathBuf::from(path),
            },
            _ => {
                return Err(crate::Error::config(
                    "exactly only one of auth-token or auth-key-path is required",
                ));
            }
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }

    /// Override the HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn default_http_timeout() -> Duration {
    DEFAULT_HTTP_TIMEOUT
}

/// Settings of the provider engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Project owning the zones
    pub project_id: String,

    /// Zone name patterns; empty means all active zones
    #[serde(default)]
    pub domain_filter: DomainFilter,

    /// Log mutations instead of sending them
    #[serde(default)]
    pub dry_run: bool,

    /// Worker pool size per operation
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ProviderConfig {
    /// Create a configuration with defaults for everything but the project
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            domain_filter: DomainFilter::default(),
            dry_run: false,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Set the domain filter
    pub fn with_domain_filter(mut self, domain_filter: DomainFilter) -> Self {
        self.domain_filter = domain_filter;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.project_id.is_empty() {
            return Err(crate::Error::config("project-id is required"));
        }
        if self.workers == 0 {
            return Err(crate::Error::config("worker count must be > 0"));
        }
        Ok(())
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}
