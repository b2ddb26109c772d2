use anyhow::{Context, Result};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// Every configured worker count is raised to at least this many workers,
/// matching the dispatch behavior of the original deployment.
pub const WORKER_FLOOR: usize = 12;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub wiki: WikiConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream link-source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    /// MediaWiki api.php endpoint queried for article links.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Client-identifying User-Agent sent on every outbound request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// Search engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Worker pool size; 0 means "use the platform parallelism".
    /// The effective count is never below [`WORKER_FLOOR`].
    #[serde(default)]
    pub worker_count: usize,
    /// Per-worker traversal deadline in seconds.
    #[serde(default = "default_worker_timeout_secs")]
    pub worker_timeout_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    format!("linkrace/{}", env!("CARGO_PKG_VERSION"))
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_worker_timeout_secs() -> u64 {
    // 30 minutes bounds unbounded graph exploration
    1800
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            worker_count: 0,
            worker_timeout_secs: default_worker_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Loads environment variables from .env file (if present) first, so
    /// `.env` can supply `RUST_LOG` and friends. Looks for the config file
    /// in this order:
    /// 1. Path specified in LINKRACE_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// An explicitly configured path must exist; a missing ./config.toml
    /// falls back to defaults since the service needs no secrets to run.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let (config_path, explicit) = match std::env::var("LINKRACE_CONFIG") {
            Ok(p) => (PathBuf::from(p), true),
            Err(_) => (PathBuf::from("config.toml"), false),
        };

        let config = if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
            toml::from_str(&config_str).context("Failed to parse config file")?
        } else if explicit {
            anyhow::bail!("Config file does not exist: {}", config_path.display());
        } else {
            log::debug!("No config.toml found, using defaults");
            Config::default()
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.wiki.api_url)
            .with_context(|| format!("wiki.api_url is not a valid URL: {}", self.wiki.api_url))?;

        if self.wiki.user_agent.trim().is_empty() {
            anyhow::bail!("wiki.user_agent must not be empty; the link API requires a client-identifying header");
        }

        if self.wiki.http_timeout_secs == 0 {
            anyhow::bail!("wiki.http_timeout_secs must be greater than 0");
        }

        if self.search.worker_timeout_secs == 0 {
            anyhow::bail!("search.worker_timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Effective worker pool size: the configured count, bounded below by
    /// the platform parallelism and by [`WORKER_FLOOR`].
    pub fn worker_count(&self) -> usize {
        let parallelism = std::thread::available_parallelism()
            .map_or(1, NonZeroUsize::get);
        self.search
            .worker_count
            .max(parallelism)
            .max(WORKER_FLOOR)
    }

    /// Per-worker traversal deadline
    pub fn worker_timeout(&self) -> Duration {
        Duration::from_secs(self.search.worker_timeout_secs)
    }

    /// Outbound HTTP timeout for single link-fetch requests
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.wiki.http_timeout_secs)
    }
}
