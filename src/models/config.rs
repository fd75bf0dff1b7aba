//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::lookup_name;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Time schedule site layout
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Faculty directory API
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Key-value cache for directory lookups
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retry policy for network operations
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if !self.schedule.url_template.contains("{sln}") {
            return Err(AppError::validation(
                "schedule.url_template must contain {sln}",
            ));
        }
        scraper::Selector::parse(&self.schedule.table_selector)
            .map_err(|e| AppError::selector(&self.schedule.table_selector, format!("{e:?}")))?;
        if self.schedule.header_marker_attr.trim().is_empty() {
            return Err(AppError::validation("schedule.header_marker_attr is empty"));
        }
        url::Url::parse(&self.directory.base_url)?;
        if self.cache.port == 0 {
            return Err(AppError::validation("cache.port must be > 0"));
        }
        if self.cache.timeout_secs == 0 {
            return Err(AppError::validation("cache.timeout_secs must be > 0"));
        }
        if self.retry.tries == 0 {
            return Err(AppError::validation("retry.tries must be > 0"));
        }
        if !self.retry.delay_secs.is_finite() || self.retry.delay_secs < 0.0 {
            return Err(AppError::validation(
                "retry.delay_secs must be a finite number >= 0",
            ));
        }
        if !self.retry.backoff.is_finite() || self.retry.backoff < 1.0 {
            return Err(AppError::validation(
                "retry.backoff must be a finite number >= 1.0",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page fetches in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Environment variable holding a session cookie for the schedule site
    #[serde(default = "defaults::cookie_env")]
    pub cookie_env: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            cookie_env: defaults::cookie_env(),
        }
    }
}

/// Time schedule page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Page URL with `{quarter}`, `{year}` and `{sln}` placeholders
    #[serde(default = "defaults::url_template")]
    pub url_template: String,

    /// CSS selector for the course tables, in page order
    #[serde(default = "defaults::table_selector")]
    pub table_selector: String,

    /// Row attribute that marks header/separator rows
    #[serde(default = "defaults::header_marker_attr")]
    pub header_marker_attr: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            url_template: defaults::url_template(),
            table_selector: defaults::table_selector(),
            header_marker_attr: defaults::header_marker_attr(),
        }
    }
}

impl ScheduleConfig {
    /// Build the page URL for a section.
    pub fn page_url(&self, quarter: &str, year: &str, sln: &str) -> String {
        self.url_template
            .replace("{quarter}", &normalize_quarter(quarter))
            .replace("{year}", year.trim())
            .replace("{sln}", sln.trim())
    }
}

/// Normalize a quarter name to its three-letter upper-case code.
///
/// `"autumn"` and `"Aut"` both become `"AUT"`; unrecognized names are
/// upper-cased as-is.
pub fn normalize_quarter(quarter: &str) -> String {
    let upper = quarter.trim().to_ascii_uppercase();
    match upper.as_str() {
        "AUTUMN" | "FALL" | "AU" => "AUT".to_string(),
        "WINTER" | "WI" => "WIN".to_string(),
        "SPRING" | "SP" => "SPR".to_string(),
        "SUMMER" | "SU" => "SUM".to_string(),
        _ => upper,
    }
}

/// Faculty directory API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Lookup endpoint; the name is appended as a path segment
    #[serde(default = "defaults::directory_url")]
    pub base_url: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::directory_url(),
        }
    }
}

/// Redis cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "defaults::cache_host")]
    pub host: String,

    #[serde(default = "defaults::cache_port")]
    pub port: u16,

    #[serde(default)]
    pub db: i64,

    /// Environment variable holding the cache password, if any
    #[serde(default = "defaults::cache_password_env")]
    pub password_env: String,

    /// Connect and command timeout in seconds
    #[serde(default = "defaults::cache_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub policy: CachePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: defaults::cache_host(),
            port: defaults::cache_port(),
            db: 0,
            password_env: defaults::cache_password_env(),
            timeout_secs: defaults::cache_timeout(),
            policy: CachePolicy::default(),
        }
    }
}

impl CacheConfig {
    /// Connection URL, reading the password from the environment.
    pub fn url(&self) -> String {
        match std::env::var(&self.password_env) {
            Ok(password) if !password.is_empty() => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            _ => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// Address without credentials, for log messages.
    pub fn address(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Expiry and key namespacing for cached directory lookups.
///
/// The defaults keep entries forever under the bare `"First Last"` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entry lifetime in seconds; `None` means no expiry
    #[serde(default)]
    pub ttl_secs: Option<u64>,

    /// Prefix prepended to every key
    #[serde(default)]
    pub key_prefix: String,
}

impl CachePolicy {
    /// Cache key for an instructor name.
    pub fn key(&self, first_name: &str, last_name: &str) -> String {
        format!("{}{}", self.key_prefix, lookup_name(first_name, last_name))
    }
}

/// Retry settings for network operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the final one
    #[serde(default = "defaults::tries")]
    pub tries: u32,

    /// Initial wait between attempts in seconds
    #[serde(default = "defaults::delay")]
    pub delay_secs: f64,

    /// Multiplier applied to the wait after each failure
    #[serde(default = "defaults::backoff")]
    pub backoff: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            tries: defaults::tries(),
            delay_secs: defaults::delay(),
            backoff: defaults::backoff(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; timeschd/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        250
    }
    pub fn cookie_env() -> String {
        "TIMESCHD_COOKIE".into()
    }

    // Schedule defaults
    pub fn url_template() -> String {
        "https://sdb.admin.uw.edu/timeschd/uwnetid/sln.asp?QTRYR={quarter}+{year}&SLN={sln}"
            .into()
    }
    pub fn table_selector() -> String {
        "table".into()
    }
    pub fn header_marker_attr() -> String {
        "bgcolor".into()
    }

    // Directory defaults
    pub fn directory_url() -> String {
        "http://www.uwfaculty-lmao.tk/faculty/api/v1/".into()
    }

    // Cache defaults
    pub fn cache_host() -> String {
        "localhost".into()
    }
    pub fn cache_port() -> u16 {
        6379
    }
    pub fn cache_password_env() -> String {
        "REDIS_PASSWORD".into()
    }
    pub fn cache_timeout() -> u64 {
        5
    }

    // Retry defaults
    pub fn tries() -> u32 {
        4
    }
    pub fn delay() -> f64 {
        3.0
    }
    pub fn backoff() -> f64 {
        2.0
    }
}
