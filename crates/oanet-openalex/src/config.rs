//! API configuration and query description

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use oanet_core::RetryPolicy;
use serde::Deserialize;

use crate::filter::FilterSpec;
use crate::state::{Entity, PagingMode};

/// Public OpenAlex API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// Upstream maximum for `per-page`
pub const MAX_PER_PAGE: u32 = 200;

/// Courtesy email consulted by [`ApiConfig::load`] and [`ApiConfig::from_env`]
pub const EMAIL_ENV_VAR: &str = "OPENALEX_EMAIL";

/// Connection-level settings for one fetcher.
///
/// Passed explicitly to [`crate::ApiClient`]; nothing here is global.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Courtesy email for the polite pool, sent unmodified
    #[serde(deserialize_with = "deserialize_env_var")]
    pub email: Option<String>,
    pub per_page: u32,
    pub paging: PagingMode,
    /// Fixed sleep before every request
    pub rate_interval_ms: u64,
    pub retry: RetrySettings,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: None,
            per_page: MAX_PER_PAGE,
            paging: PagingMode::Auto,
            rate_interval_ms: 0,
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            base_delay_ms: policy.base_delay.as_millis() as u64,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl ApiConfig {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./oanet.toml (current directory)
    /// 2. ~/.config/oanet/config.toml
    ///
    /// If no config file found, returns default config. In every case a
    /// missing email is taken from `OPENALEX_EMAIL`.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("oanet.toml");
        if local_config.exists() {
            return Self::from_file(&local_config).map(Self::email_from_env);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "oanet") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config).map(Self::email_from_env);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::from_env())
    }

    /// Defaults plus the courtesy email from `OPENALEX_EMAIL`
    pub fn from_env() -> Self {
        Self::default().email_from_env()
    }

    fn email_from_env(mut self) -> Self {
        if self.email.is_none() {
            self.email = std::env::var(EMAIL_ENV_VAR).ok().filter(|e| !e.is_empty());
        }
        self
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ApiConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (1..=MAX_PER_PAGE).contains(&self.per_page),
            "per_page must be in 1..={MAX_PER_PAGE}, got {}",
            self.per_page
        );
        anyhow::ensure!(
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://"),
            "base_url must be an http(s) URL: {}",
            self.base_url
        );
        Ok(())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn rate_interval(&self) -> Duration {
        Duration::from_millis(self.rate_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
        }
    }

    /// `User-Agent` carrying the courtesy email when one is configured
    pub fn user_agent(&self) -> String {
        let base = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
        match &self.email {
            Some(email) => format!("{base} (mailto:{email})"),
            None => base.to_string(),
        }
    }
}

/// What to retrieve in one session
#[derive(Debug, Clone)]
pub struct Query {
    pub entity: Entity,
    pub filter: FilterSpec,
    pub search: Option<String>,
    /// Sort keys, `field` or `field:desc`
    pub sort: Vec<String>,
    /// Fields to return (empty = all)
    pub select: Vec<String>,
    /// Stop after this many records
    pub max_entities: Option<usize>,
}

impl Query {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            filter: FilterSpec::new(),
            search: None,
            sort: Vec::new(),
            select: Vec::new(),
            max_entities: None,
        }
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort(mut self, key: impl Into<String>) -> Self {
        self.sort.push(key.into());
        self
    }

    pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn max_entities(mut self, max: usize) -> Self {
        self.max_entities = Some(max);
        self
    }

    /// Query parameters except paging and page size
    pub fn base_params(&self, email: Option<&str>) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.filter.is_empty() {
            params.push(("filter".to_string(), self.filter.serialize()));
        }
        if let Some(term) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search".to_string(), term.to_string()));
        }
        if !self.sort.is_empty() {
            params.push(("sort".to_string(), self.sort.join(",")));
        }
        if !self.select.is_empty() {
            params.push(("select".to_string(), self.select.join(",")));
        }
        if let Some(email) = email {
            params.push(("mailto".to_string(), email.to_string()));
        }
        params
    }
}
