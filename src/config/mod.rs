// Configuration module entry point
// Loads the immutable process configuration and owns the shared state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AssetsConfig, ClickHouseConfig, Config, LoggingConfig, ServerConfig};

impl Config {
    /// Load configuration from "config.toml" plus environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; environment variables override it using the
    /// keys the dashboard deployment has always recognized.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("assets.root", "public")?
            .set_default("clickhouse.database", "default")?
            .set_override_option("server.port", env_unquoted("PORT"))?
            .set_override_option("clickhouse.url", env_unquoted("CLICKHOUSE_URL"))?
            .set_override_option("clickhouse.host", env_unquoted("CLICKHOUSE_HOST"))?
            .set_override_option("clickhouse.user", env_unquoted("CLICKHOUSE_USER"))?
            .set_override_option("clickhouse.password", env_unquoted("CLICKHOUSE_PASSWORD"))?
            .set_override_option("clickhouse.database", env_unquoted("CLICKHOUSE_DATABASE"))?
            .set_override_option("clickhouse.proxy_url", env_unquoted("FIXIE_URL"))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Read an environment variable, stripping surrounding quotes
///
/// Deployment tooling has a habit of exporting values like `"secret"`;
/// empty values count as unset.
fn env_unquoted(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
        })
        .unwrap_or(trimmed);

    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_config_file() {
        let cfg = Config::load_from("definitely-missing-config").expect("defaults should load");
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.assets.root, "public");
        assert_eq!(cfg.clickhouse.database, "default");
        assert_eq!(cfg.clickhouse.username(), "default");
    }

    #[test]
    fn env_values_are_unquoted() {
        std::env::set_var("TEST_ENV_UNQUOTED_A", "\"quoted\"");
        std::env::set_var("TEST_ENV_UNQUOTED_B", "  'single'  ");
        std::env::set_var("TEST_ENV_UNQUOTED_C", "");
        assert_eq!(env_unquoted("TEST_ENV_UNQUOTED_A").as_deref(), Some("quoted"));
        assert_eq!(env_unquoted("TEST_ENV_UNQUOTED_B").as_deref(), Some("single"));
        assert_eq!(env_unquoted("TEST_ENV_UNQUOTED_C"), None);
        assert_eq!(env_unquoted("TEST_ENV_UNQUOTED_MISSING"), None);
    }
}
