//! Outbound query transport module
//!
//! One HTTPS POST per query: SQL as a text/plain body with Basic auth,
//! optionally routed through a forward proxy. The trait seam exists so
//! handler tests can substitute a stub without a network.

use super::error::GatewayError;
use crate::config::ClickHouseConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Decoded tabular response from the analytical database
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub meta: Vec<Value>,
    #[serde(default)]
    pub statistics: Value,
}

/// Executes SQL text against the analytical database
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Send one query and return the raw response body
    async fn execute_raw(&self, sql: &str) -> Result<String, GatewayError>;

    /// Send one query and decode the `FORMAT JSON` response
    async fn execute(&self, sql: &str) -> Result<QueryResult, GatewayError> {
        let raw = self.execute_raw(sql).await?;
        serde_json::from_str(&raw)
            .map_err(|e| GatewayError::Upstream(format!("Invalid JSON from ClickHouse: {e}")))
    }
}

/// reqwest-backed transport for the hosted ClickHouse endpoint
pub struct ClickHouseTransport {
    client: reqwest::Client,
    endpoint: Option<String>,
    username: String,
    password: Option<String>,
}

impl ClickHouseTransport {
    /// Build the transport once at startup
    ///
    /// Missing endpoint or credentials are deliberately not an error here;
    /// they surface on the first outbound call. An unparseable proxy URL is
    /// a configuration error and does fail startup.
    pub fn from_config(config: &ClickHouseConfig) -> Result<Self, String> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy_url) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| format!("Invalid proxy URL '{proxy_url}': {e}"))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            username: config.username().to_string(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl QueryTransport for ClickHouseTransport {
    async fn execute_raw(&self, sql: &str) -> Result<String, GatewayError> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            GatewayError::Upstream("ClickHouse endpoint is not configured".to_string())
        })?;
        let password = self.password.as_deref().ok_or_else(|| {
            GatewayError::Upstream("ClickHouse password is not configured".to_string())
        })?;

        let response = self
            .client
            .post(endpoint)
            .basic_auth(&self.username, Some(password))
            .header("Content-Type", "text/plain")
            .body(sql.to_string())
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("ClickHouse request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Upstream(format!("Failed to read ClickHouse response: {e}")))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(GatewayError::Upstream(format!(
                "ClickHouse returned {status}: {body}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_credentials() -> ClickHouseConfig {
        ClickHouseConfig {
            url: None,
            host: None,
            user: None,
            password: None,
            database: "default".to_string(),
            proxy_url: None,
        }
    }

    #[test]
    fn builds_without_credentials() {
        // Startup must not require credentials
        assert!(ClickHouseTransport::from_config(&config_without_credentials()).is_ok());
    }

    #[test]
    fn rejects_invalid_proxy_url() {
        let mut cfg = config_without_credentials();
        cfg.proxy_url = Some("::not a url::".to_string());
        assert!(ClickHouseTransport::from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn unconfigured_endpoint_errors_at_call_time() {
        let transport =
            ClickHouseTransport::from_config(&config_without_credentials()).expect("build");
        let err = transport.execute_raw("SELECT 1").await.unwrap_err();
        assert!(err.to_string().contains("endpoint is not configured"));
    }

    #[tokio::test]
    async fn missing_password_errors_at_call_time() {
        let mut cfg = config_without_credentials();
        cfg.host = Some("https://example.invalid:8443".to_string());
        let transport = ClickHouseTransport::from_config(&cfg).expect("build");
        let err = transport.execute_raw("SELECT 1").await.unwrap_err();
        assert!(err.to_string().contains("password is not configured"));
    }

    #[test]
    fn query_result_tolerates_missing_fields() {
        let result: QueryResult = serde_json::from_str(r#"{"data":[{"a":1}]}"#).expect("decode");
        assert_eq!(result.data.len(), 1);
        assert!(result.meta.is_empty());
        assert!(result.statistics.is_null());
    }
}
