//! Health probe tests for studio-proxy-core.
// crates/studio-proxy-core/tests/health_probe.rs
// =============================================================================
// Module: Health Probe Tests
// Description: Status classification and retry behavior against a local server.
// Purpose: Ensure 2xx is healthy and retries stop at the configured budget.
// =============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only server setup may panic."
)]

use std::net::TcpListener;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use studio_proxy_core::HealthError;
use studio_proxy_core::HealthProbe;
use tiny_http::Response;
use tiny_http::Server;

mod common;

type TestResult = Result<(), String>;

/// Serves one response per status in order, then exits.
fn serve(statuses: Vec<u16>) -> (String, JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        for status in statuses {
            if let Ok(request) = server.recv() {
                let _ = request.respond(Response::empty(status));
            }
        }
    });
    (format!("http://{addr}/health"), handle)
}

fn probe(url: &str, retries: &str) -> Result<HealthProbe, String> {
    let config = common::config_with(&[
        ("DOCKER_HEALTHCHECK_TIMEOUT", "2s"),
        ("DOCKER_HEALTHCHECK_INTERVAL", "5s"),
        ("DOCKER_HEALTHCHECK_RETRIES", retries),
    ])?;
    let probe = HealthProbe::from_config(&config, Some(url)).map_err(|err| err.to_string())?;
    Ok(probe.with_interval(Duration::from_millis(10)))
}

#[tokio::test]
async fn success_status_is_healthy() -> TestResult {
    let (url, handle) = serve(vec![204]);
    let report = probe(&url, "1")?.check_once().await.map_err(|err| err.to_string())?;
    handle.join().map_err(|_| "server thread panicked".to_string())?;
    if report.status != 204 || report.attempt != 1 || report.url != url {
        return Err(format!("unexpected report status {}", report.status));
    }
    Ok(())
}

#[tokio::test]
async fn error_status_is_unhealthy() -> TestResult {
    let (url, handle) = serve(vec![503]);
    let result = probe(&url, "1")?.check_once().await;
    handle.join().map_err(|_| "server thread panicked".to_string())?;
    match result {
        Err(HealthError::Unhealthy {
            status: 503,
        }) => Ok(()),
        Err(err) => Err(format!("unexpected error: {err}")),
        Ok(_) => Err("503 must not be healthy".to_string()),
    }
}

#[tokio::test]
async fn wait_retries_until_success() -> TestResult {
    let (url, handle) = serve(vec![500, 503, 200]);
    let report = probe(&url, "3")?.wait_until_healthy().await.map_err(|err| err.to_string())?;
    handle.join().map_err(|_| "server thread panicked".to_string())?;
    if report.attempt != 3 || report.status != 200 {
        return Err(format!("expected success on attempt 3, got {}", report.attempt));
    }
    Ok(())
}

#[tokio::test]
async fn wait_returns_last_error_when_budget_is_spent() -> TestResult {
    let (url, handle) = serve(vec![500, 502]);
    let result = probe(&url, "2")?.wait_until_healthy().await;
    handle.join().map_err(|_| "server thread panicked".to_string())?;
    match result {
        Err(HealthError::Unhealthy {
            status: 502,
        }) => Ok(()),
        Err(err) => Err(format!("unexpected error: {err}")),
        Ok(_) => Err("probe should have failed".to_string()),
    }
}

#[tokio::test]
async fn closed_port_is_a_request_error() -> TestResult {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
        listener.local_addr().map_err(|err| err.to_string())?.port()
    };
    let url = format!("http://127.0.0.1:{port}/health");
    match probe(&url, "1")?.check_once().await {
        Err(HealthError::Request(_)) => Ok(()),
        Err(err) => Err(format!("unexpected error: {err}")),
        Ok(_) => Err("closed port must not be healthy".to_string()),
    }
}
