// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub connection: ConnectionConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Layer store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Store file path, relative to the working directory unless absolute
    pub path: String,
}

/// Landing page and static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Directory holding the front-end assets
    pub static_dir: String,
    /// File under `static_dir` served for `/`; the built-in page is used when missing
    pub index_file: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Per-connection limits
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionConfig {
    /// Serve more than one request per connection
    pub keep_alive: bool,
    /// Upper bound on a connection's lifetime, in seconds; also the shutdown drain window
    pub timeout_secs: u64,
    /// Connections beyond this are dropped on accept
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}
