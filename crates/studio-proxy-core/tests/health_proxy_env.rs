//! Health probe proxy isolation tests for studio-proxy-core.
// crates/studio-proxy-core/tests/health_proxy_env.rs
// =============================================================================
// Module: Health Probe Proxy Environment Tests
// Description: Loopback health checks with outbound proxy variables set.
// Purpose: Ensure the probe never routes the local health check via a proxy.
// =============================================================================

//! This binary holds a single test because it mutates the process
//! environment before any client is built.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only server setup may panic."
)]

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use studio_proxy_core::HealthProbe;
use tiny_http::Response;
use tiny_http::Server;

mod common;

type TestResult = Result<(), String>;

/// Proxy variables honored by HTTP clients that read the environment.
const PROXY_VARS: [&str; 6] =
    ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"];

#[tokio::test]
async fn health_check_ignores_proxy_environment() -> TestResult {
    let dead_proxy = {
        let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
        format!("http://{}", listener.local_addr().map_err(|err| err.to_string())?)
    };
    for var in PROXY_VARS {
        common::env::set_var(var, &dead_proxy);
    }
    common::env::remove_var("NO_PROXY");
    common::env::remove_var("no_proxy");

    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}/health");
    let handle = thread::spawn(move || {
        if let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(10)) {
            let _ = request.respond(Response::empty(200));
        }
    });

    let proxied = reqwest::Client::new().get(&url).send().await;
    if proxied.is_ok() {
        return Err("environment proxy was not in effect for a default client".to_string());
    }

    let config = common::config_with(&[
        ("HTTP_PROXY", dead_proxy.as_str()),
        ("DOCKER_HEALTHCHECK_TIMEOUT", "2s"),
    ])?;
    let probe = HealthProbe::from_config(&config, Some(&url)).map_err(|err| err.to_string())?;
    let report = probe.check_once().await.map_err(|err| err.to_string())?;
    handle.join().map_err(|_| "server thread panicked".to_string())?;
    if report.status != 200 {
        return Err(format!("expected 200, got {}", report.status));
    }
    Ok(())
}
