//! Server configuration types.

use invoicely_common_i18n::Locale;
use invoicely_common_log::LogConfig;
use invoicely_notify::EmailConfig;
use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    #[serde(default)]
    pub server: ServerBindConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Response cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Outbound email configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Translation catalogs.
    #[serde(default)]
    pub i18n: I18nConfig,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Upper bound on any request body.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerBindConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerBindConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry (seconds).
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_expiry_secs: default_access_token_expiry(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json).
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional file that receives a copy of every line.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Subscriber settings; `INVOICELY_LOG_*` variables still win.
    pub fn to_log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_settings(&self.level, &self.format);
        config.file_path = self.file.clone();
        config.apply_env();
        config
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Allow any origin.
    #[serde(default)]
    pub allow_any_origin: bool,
    /// Allow credentials.
    #[serde(default)]
    pub allow_credentials: bool,
    /// Max age for preflight cache.
    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: u64,
}

fn default_cors_max_age() -> u64 {
    86400
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_any_origin: false,
            allow_credentials: false,
            max_age_secs: default_cors_max_age(),
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable the response cache.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Entry lifetime in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
    /// Capacity bound; the oldest insert is evicted when full.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
    /// How often expired entries are swept.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Larger responses are not cached.
    #[serde(default = "default_cache_max_body")]
    pub max_body_bytes: usize,
    /// Key entries by user so callers never share them.
    #[serde(default = "default_true")]
    pub vary_by_user: bool,
    /// Drop a resource's entries after a successful write to it.
    #[serde(default)]
    pub invalidate_on_write: bool,
}

fn default_cache_ttl_ms() -> u64 {
    300_000
}

fn default_cache_max_entries() -> usize {
    10_000
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_cache_max_body() -> usize {
    1024 * 1024
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: default_cache_ttl_ms(),
            max_entries: default_cache_max_entries(),
            sweep_interval_secs: default_sweep_interval(),
            max_body_bytes: default_cache_max_body(),
            vary_by_user: true,
            invalidate_on_write: false,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Root directory for stored files.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// Logo size limit.
    #[serde(default = "default_logo_max")]
    pub logo_max_bytes: u64,
    /// Attachment size limit.
    #[serde(default = "default_attachment_max")]
    pub attachment_max_bytes: u64,
    /// URL prefix stored files are served under.
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_logo_max() -> u64 {
    2 * 1024 * 1024
}

fn default_attachment_max() -> u64 {
    5 * 1024 * 1024
}

fn default_public_path() -> String {
    "/uploads".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            logo_max_bytes: default_logo_max(),
            attachment_max_bytes: default_attachment_max(),
            public_path: default_public_path(),
        }
    }
}

/// Translation catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Fallback locale.
    #[serde(default)]
    pub default_locale: Locale,
    /// Directory of `<code>.json` files merged over the embedded catalogs.
    #[serde(default)]
    pub locale_dir: Option<PathBuf>,
}
