// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use serde_json::json;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub assets: AssetsConfig,
    pub clickhouse: ClickHouseConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    pub show_headers: bool,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Served root directory; no request may resolve outside it
    pub root: String,
}

/// ClickHouse connection configuration
///
/// Fields populated from the environment stay `None` when the variable is
/// absent so the connectivity probe can report which ones are set. Missing
/// credentials are not a startup error; they surface on the first outbound
/// call.
#[derive(Debug, Deserialize, Clone)]
pub struct ClickHouseConfig {
    pub url: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub proxy_url: Option<String>,
}

impl ClickHouseConfig {
    /// Full query endpoint URL, `CLICKHOUSE_URL` taking precedence over
    /// `CLICKHOUSE_HOST`
    pub fn endpoint(&self) -> Option<String> {
        self.url
            .as_deref()
            .or(self.host.as_deref())
            .map(|base| format!("{}/?database={}", base.trim_end_matches('/'), self.database))
    }

    /// Basic-auth username, defaulting like the hosted service does
    pub fn username(&self) -> &str {
        self.user.as_deref().unwrap_or("default")
    }

    /// Presence flags reported by the connectivity probe
    pub fn environment_flags(&self) -> serde_json::Value {
        json!({
            "hasUrl": self.url.is_some(),
            "hasUser": self.user.is_some(),
            "hasPassword": self.password.is_some(),
            "hasHost": self.host.is_some(),
            "hasProxy": self.proxy_url.is_some(),
        })
    }
}
