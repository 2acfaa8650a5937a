// crates/studio-proxy-core/src/health.rs
// ============================================================================
// Module: Health Probe
// Description: HTTP health check driven by the Docker healthcheck settings.
// Purpose: Report whether the proxy health endpoint answers with success.
// Dependencies: reqwest, serde, studio-proxy-config, thiserror, tokio
// ============================================================================

//! ## Overview
//! A [`HealthProbe`] issues `GET` requests against the proxy health endpoint.
//! Each attempt is bounded by `DOCKER_HEALTHCHECK_TIMEOUT`. A 2xx status is
//! healthy; any other status or a transport failure is not.
//! [`HealthProbe::wait_until_healthy`] retries up to
//! `DOCKER_HEALTHCHECK_RETRIES` times, sleeping the interval in between.
//!
//! The probe only targets the local service, so the client ignores proxy
//! variables such as `HTTP_PROXY` that configure outbound browser traffic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use studio_proxy_config::ProxyConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Successful health check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Probed URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
    /// Attempt number that succeeded (1-based).
    pub attempt: u32,
}

/// Health check failures.
#[derive(Debug, Error)]
pub enum HealthError {
    /// HTTP client could not be built.
    #[error("health client error: {0}")]
    Client(String),
    /// Request failed before a response arrived.
    #[error("health request failed: {0}")]
    Request(String),
    /// Endpoint answered with a non-success status.
    #[error("health endpoint returned status {status}")]
    Unhealthy {
        /// HTTP status code.
        status: u16,
    },
}

/// HTTP health probe.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    /// HTTP client with the per-attempt timeout applied.
    client: reqwest::Client,
    /// Health endpoint URL.
    url: String,
    /// Maximum attempts for [`HealthProbe::wait_until_healthy`].
    retries: u32,
    /// Delay between attempts.
    interval: Duration,
}

// ============================================================================
// SECTION: Probe
// ============================================================================

impl HealthProbe {
    /// Builds a probe from the health settings; `url` overrides the default.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::Client`] when the HTTP client cannot be built.
    pub fn from_config(config: &ProxyConfig, url: Option<&str>) -> Result<Self, HealthError> {
        let url = url.map_or_else(|| default_url(config.ports.port), ToString::to_string);
        let client = reqwest::Client::builder()
            .timeout(config.health.timeout)
            .no_proxy()
            .build()
            .map_err(|err| HealthError::Client(err.to_string()))?;
        Ok(Self {
            client,
            url,
            retries: config.health.retries.max(1),
            interval: config.health.interval,
        })
    }

    /// Overrides the delay between attempts.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the probed URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the maximum number of attempts.
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Performs a single check.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError`] on transport failure or a non-2xx status.
    pub async fn check_once(&self) -> Result<HealthReport, HealthError> {
        self.attempt(1).await
    }

    /// Checks until healthy or the retry budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the error from the last attempt.
    pub async fn wait_until_healthy(&self) -> Result<HealthReport, HealthError> {
        let mut attempt = 1;
        loop {
            match self.attempt(attempt).await {
                Ok(report) => return Ok(report),
                Err(err) if attempt >= self.retries => return Err(err),
                Err(_) => {
                    attempt += 1;
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }

    /// Issues one request, tagging the report with `attempt`.
    async fn attempt(&self, attempt: u32) -> Result<HealthReport, HealthError> {
        let started = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| HealthError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HealthError::Unhealthy {
                status: status.as_u16(),
            });
        }
        Ok(HealthReport {
            url: self.url.clone(),
            status: status.as_u16(),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            attempt,
        })
    }
}

/// Default health URL for the API server port.
#[must_use]
pub fn default_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/health")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn default_url_uses_api_port() {
        let config = ProxyConfig::defaults().unwrap();
        let probe = HealthProbe::from_config(&config, None).unwrap();
        assert_eq!(probe.url(), default_url(config.ports.port));
        assert_eq!(probe.retries(), config.health.retries);
    }

    #[test]
    fn override_url_is_kept() {
        let config = ProxyConfig::defaults().unwrap();
        let probe = HealthProbe::from_config(&config, Some("http://localhost:9/ok")).unwrap();
        assert_eq!(probe.url(), "http://localhost:9/ok");
    }
}
