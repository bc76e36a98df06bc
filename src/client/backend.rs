use crate::core::{Catalog, StatusReport};
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{validate_url, Validate};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Bound on the status probe.
    pub status_timeout: Duration,
    /// Bound on the scan call; must cover the server's simulated latency.
    pub scan_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            status_timeout: Duration::from_secs(5),
            scan_timeout: Duration::from_secs(60),
        }
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        if self.status_timeout.is_zero() || self.scan_timeout.is_zero() {
            return Err(ScanError::InvalidConfigValueError {
                field: "timeout".to_string(),
                value: "0".to_string(),
                reason: "timeouts must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Thin wrapper over the two backend endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| ScanError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: Client::new(),
            base_url,
            config,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        match self.base_url.join(path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.config.base_url.trim_end_matches('/'), path),
        }
    }

    /// Any 2xx answer counts as online. The body is informational: a missing
    /// or unreadable one still yields a report.
    pub async fn status(&self) -> Result<StatusReport> {
        let endpoint = self.endpoint("/api/status");
        tracing::debug!("Probing backend status at: {}", endpoint);
        let response = self
            .client
            .get(&endpoint)
            .timeout(self.config.status_timeout)
            .send()
            .await
            .map_err(|e| ScanError::upstream(&endpoint, e))?;

        if !response.status().is_success() {
            return Err(ScanError::upstream(
                &endpoint,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ScanError::upstream(&endpoint, e))?;
        match serde_json::from_slice::<StatusReport>(&body) {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::debug!("Status body not understood ({}), assuming online", e);
                Ok(StatusReport {
                    status: "online".to_string(),
                    port: None,
                    uptime: None,
                })
            }
        }
    }

    /// Convenience probe: any failure counts as offline.
    pub async fn is_online(&self) -> bool {
        self.status().await.is_ok()
    }

    pub async fn scan(&self) -> Result<Catalog> {
        let endpoint = self.endpoint("/api/scan");
        tracing::debug!("Requesting scan from: {}", endpoint);
        let response = self
            .client
            .get(&endpoint)
            .timeout(self.config.scan_timeout)
            .send()
            .await
            .map_err(|e| ScanError::upstream(&endpoint, e))?;

        tracing::debug!("Scan response status: {}", response.status());
        if !response.status().is_success() {
            return Err(ScanError::upstream(
                &endpoint,
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .json::<Catalog>()
            .await
            .map_err(|e| ScanError::upstream(&endpoint, e))
    }
}
