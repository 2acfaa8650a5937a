//! Upload cleanup service tests for studio-proxy-core.
// crates/studio-proxy-core/tests/cleanup_service.rs
// =============================================================================
// Module: Upload Cleanup Service Tests
// Description: Sweep selection and background loop lifecycle.
// Purpose: Ensure only expired regular files are removed and shutdown is clean.
// =============================================================================

use std::fs;
use std::time::Duration;
use std::time::SystemTime;

use studio_proxy_config::CleanupConfig;
use studio_proxy_core::CleanupError;
use studio_proxy_core::CleanupService;
use studio_proxy_core::Logger;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

mod common;

type TestResult = Result<(), String>;

fn service(config: CleanupConfig) -> CleanupService {
    CleanupService::new(config, Logger::noop("cleanup"))
}

fn cleanup_config(dir: &std::path::Path, retention_days: u32) -> CleanupConfig {
    CleanupConfig {
        upload_dir: dir.to_path_buf(),
        retention_days,
        interval_hours: 1,
    }
}

#[test]
fn sweep_uses_file_modification_time() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let old = common::write_aged(dir.path(), "old.png", b"0123456789", common::DAY * 10)?;
    let recent = common::write_aged(dir.path(), "recent.png", b"01", common::DAY * 2)?;

    let report = service(cleanup_config(dir.path(), 7)).sweep(SystemTime::now());
    if report.deleted != 1 || report.bytes_freed != 10 || report.scanned != 2 {
        return Err(format!(
            "unexpected report: deleted {} freed {} scanned {}",
            report.deleted, report.bytes_freed, report.scanned
        ));
    }
    if old.exists() || !recent.exists() {
        return Err("wrong file removed".to_string());
    }
    if report.deleted_files != vec![old] {
        return Err("deleted file list mismatch".to_string());
    }
    Ok(())
}

#[test]
fn sweep_does_not_recurse_into_subdirectories() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let nested = dir.path().join("session");
    fs::create_dir(&nested).map_err(|err| err.to_string())?;
    let inner = common::write_aged(&nested, "inner.png", b"x", common::DAY * 30)?;

    let report = service(cleanup_config(dir.path(), 1)).sweep(SystemTime::now());
    if report.deleted != 0 || !inner.exists() || !nested.exists() {
        return Err("nested content must be left alone".to_string());
    }
    Ok(())
}

#[test]
fn missing_upload_directory_is_not_an_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let report = service(cleanup_config(&dir.path().join("absent"), 7)).sweep(SystemTime::now());
    if report.scanned != 0 || report.deleted != 0 {
        return Err("missing directory should produce an empty report".to_string());
    }
    Ok(())
}

#[tokio::test]
async fn background_loop_sweeps_and_stops() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let old = common::write_aged(dir.path(), "stale.bin", b"stale", common::DAY * 8)?;
    let service = service(cleanup_config(dir.path(), 7))
        .with_schedule(Duration::from_millis(20), Duration::from_millis(20));

    service.start().map_err(|err| err.to_string())?;
    let status = service.status();
    if !status.running || status.next_cleanup_at.is_none() {
        return Err("running service should report the next sweep".to_string());
    }
    if !matches!(service.start(), Err(CleanupError::AlreadyRunning)) {
        return Err("second start must be rejected".to_string());
    }

    let mut waited = Duration::ZERO;
    while old.exists() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }
    if old.exists() {
        return Err("background loop never removed the expired file".to_string());
    }

    service.stop().await;
    if service.is_running() {
        return Err("service should stop".to_string());
    }
    service.start().map_err(|err| err.to_string())?;
    service.stop().await;
    Ok(())
}

#[test]
fn status_reports_next_sweep_one_interval_ahead() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let service = service(CleanupConfig {
        interval_hours: 6,
        ..cleanup_config(dir.path(), 7)
    });
    let now = SystemTime::now();
    let status = service.status_at(now);
    if status.running {
        return Err("service was never started".to_string());
    }
    let expected = OffsetDateTime::from(now + Duration::from_secs(6 * 3_600))
        .format(&Rfc3339)
        .map_err(|err| err.to_string())?;
    let actual = status.next_cleanup_at.unwrap_or_default();
    if actual != expected {
        return Err(format!("expected next sweep {expected}, got `{actual}`"));
    }
    Ok(())
}

#[tokio::test]
async fn stop_without_start_is_a_no_op() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let service = service(cleanup_config(dir.path(), 7));
    service.stop().await;
    if service.is_running() {
        return Err("service should not be running".to_string());
    }
    Ok(())
}
