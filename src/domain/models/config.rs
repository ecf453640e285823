use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the handle resolver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Name cache sizing and expiry
    #[serde(default)]
    pub cache: CacheConfig,

    /// Fetch scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Snapshot persistence configuration
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// HTTP resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Name cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Maximum number of entries kept before LRU eviction
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Age after which a successful entry is no longer served (seconds)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Consecutive failures before the cooldown applies
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// Wait after the last failure before retrying a backed-off handle (seconds)
    #[serde(default = "default_failure_cooldown_secs")]
    pub failure_cooldown_secs: u64,
}

const fn default_max_size() -> usize {
    15_000
}

const fn default_ttl_secs() -> u64 {
    2 * 24 * 60 * 60
}

const fn default_max_failures() -> u32 {
    3
}

const fn default_failure_cooldown_secs() -> u64 {
    3 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            ttl_secs: default_ttl_secs(),
            max_failures: default_max_failures(),
            failure_cooldown_secs: default_failure_cooldown_secs(),
        }
    }
}

impl CacheConfig {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub const fn failure_cooldown(&self) -> Duration {
        Duration::from_secs(self.failure_cooldown_secs)
    }
}

/// Fetch scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Maximum number of resolutions running at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

const fn default_max_concurrent() -> usize {
    6
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Snapshot persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PersistenceConfig {
    /// Quiet period between the first mutation and the flush (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Path of the JSON snapshot file
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,
}

const fn default_debounce_ms() -> u64 {
    1500
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(".handle-resolver/cache.json")
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            path: default_snapshot_path(),
        }
    }
}

impl PersistenceConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// How the HTTP resolver pulls a display name out of a channel page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Embedded `ytInitialData` JSON first, meta tags as fallback
    #[default]
    InitialDataThenMeta,
    /// Meta tags only
    MetaOnly,
}

/// HTTP resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolverConfig {
    /// Base URL handles are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every lookup
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name extraction strategy
    #[serde(default)]
    pub extraction: ExtractionStrategy,
}

fn default_base_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_user_agent() -> String {
    concat!("handle-resolver/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            extraction: ExtractionStrategy::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation for file logs: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
