use std::time::Duration;

use async_trait::async_trait;
use crustio_common::error::{CrustioError, Result};

const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Where and how to push metric payloads. Read once at startup and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub url: String,
    pub source: String,
    pub user_id: String,
    pub api_key: String,
    pub interval: Duration,
}

impl MetricsConfig {
    /// Builds the config from `CRUSTIO_METRICS_*` environment variables.
    /// Returns `None` when the sink URL or credentials are absent, which
    /// disables reporting entirely.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("CRUSTIO_METRICS_URL").ok()?;
        let user_id = std::env::var("CRUSTIO_METRICS_USER_ID").ok()?;
        let api_key = std::env::var("CRUSTIO_METRICS_API_KEY").ok()?;
        let source =
            std::env::var("CRUSTIO_METRICS_SOURCE").unwrap_or_else(|_| "dev".to_string());
        let interval_secs = std::env::var("CRUSTIO_METRICS_INTERVAL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_INTERVAL_SECS);

        Some(Self {
            url,
            source,
            user_id,
            api_key,
            interval: Duration::from_secs(interval_secs),
        })
    }
}

#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn push(&self, payload: &str) -> Result<()>;
}

/// Ships one rendered payload per POST with a bearer credential. Failed
/// pushes surface as errors for the caller to log; there is no retry.
pub struct HttpSink {
    endpoint: String,
    credential: String,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            endpoint: config.url.clone(),
            credential: format!("{}:{}", config.user_id, config.api_key),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MetricsSink for HttpSink {
    async fn push(&self, payload: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.credential),
            )
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|err| {
                CrustioError::InternalError(format!(
                    "failed to push metrics to {}: {err}",
                    self.endpoint
                ))
            })?;

        if !response.status().is_success() {
            return Err(CrustioError::InternalError(format!(
                "metrics sink {} returned status {}",
                self.endpoint,
                response.status()
            )));
        }

        Ok(())
    }
}
