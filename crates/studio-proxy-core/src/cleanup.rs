// crates/studio-proxy-core/src/cleanup.rs
// ============================================================================
// Module: Upload Cleanup
// Description: Periodic deletion of expired uploaded files.
// Purpose: Keep the upload directory bounded by the retention period.
// Dependencies: serde, serde_json, studio-proxy-config, thiserror, time, tokio
// ============================================================================

//! ## Overview
//! [`CleanupService::sweep`] deletes regular files directly under the upload
//! directory whose modification time is older than the retention period.
//! Subdirectories and symlinks are left alone. A missing directory is not an
//! error.
//!
//! [`CleanupService::start`] spawns a single background task that waits one
//! interval, sweeps on the blocking pool, and repeats until
//! [`CleanupService::stop`] signals shutdown. A sweep that panics is logged
//! and retried after [`RETRY_BACKOFF`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::SystemTime;

use serde::Serialize;
use serde_json::json;
use studio_proxy_config::CleanupConfig;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::log::Logger;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delay before retrying after a failed sweep.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(3_600);

/// Bytes per mebibyte, for log output.
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Directory entries examined.
    pub scanned: usize,
    /// Files deleted.
    pub deleted: usize,
    /// Bytes freed by deletions.
    pub bytes_freed: u64,
    /// Expired files that could not be deleted.
    pub failed: usize,
    /// Paths of deleted files.
    pub deleted_files: Vec<PathBuf>,
}

/// Service status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupStatus {
    /// Whether the background task is running.
    pub running: bool,
    /// Retention period in days.
    pub retention_days: u32,
    /// Sweep interval in hours.
    pub interval_hours: u32,
    /// Upload directory.
    pub upload_dir: PathBuf,
    /// Next sweep, one interval from the status time (RFC 3339, UTC).
    ///
    /// `None` only when that instant cannot be represented as a calendar date.
    pub next_cleanup_at: Option<String>,
}

/// Errors raised by the cleanup service.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// The background task is already running.
    #[error("cleanup service is already running")]
    AlreadyRunning,
    /// No tokio runtime is available to spawn the task.
    #[error("cleanup service requires a tokio runtime: {0}")]
    NoRuntime(String),
}

/// Handle to the running background task.
struct RunningTask {
    /// Shutdown signal.
    shutdown: watch::Sender<bool>,
    /// Task handle.
    handle: JoinHandle<()>,
}

/// Sweep inputs shared with the background task.
struct Sweeper {
    /// Cleanup settings.
    config: CleanupConfig,
    /// Logger for sweep events.
    logger: Logger,
}

/// Upload cleanup service.
pub struct CleanupService {
    /// Shared sweep inputs.
    sweeper: Arc<Sweeper>,
    /// Time between sweeps.
    interval: Duration,
    /// Delay after a failed sweep.
    retry_backoff: Duration,
    /// Background task, when running.
    task: Mutex<Option<RunningTask>>,
}

// ============================================================================
// SECTION: Service
// ============================================================================

impl CleanupService {
    /// Creates a stopped service using the configured interval.
    #[must_use]
    pub fn new(config: CleanupConfig, logger: Logger) -> Self {
        let interval = config.interval();
        Self {
            sweeper: Arc::new(Sweeper {
                config,
                logger,
            }),
            interval,
            retry_backoff: RETRY_BACKOFF,
            task: Mutex::new(None),
        }
    }

    /// Overrides the sweep interval and retry backoff.
    #[must_use]
    pub fn with_schedule(mut self, interval: Duration, retry_backoff: Duration) -> Self {
        self.interval = interval;
        self.retry_backoff = retry_backoff;
        self
    }

    /// Deletes expired files as of `now`.
    #[must_use]
    pub fn sweep(&self, now: SystemTime) -> CleanupReport {
        self.sweeper.sweep(now)
    }

    /// Returns true while the background task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        task.as_ref().is_some_and(|running| !running.handle.is_finished())
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> CleanupStatus {
        self.status_at(SystemTime::now())
    }

    /// Returns the status as of `now`.
    #[must_use]
    pub fn status_at(&self, now: SystemTime) -> CleanupStatus {
        CleanupStatus {
            running: self.is_running(),
            retention_days: self.sweeper.config.retention_days,
            interval_hours: self.sweeper.config.interval_hours,
            upload_dir: self.sweeper.config.upload_dir.clone(),
            next_cleanup_at: now.checked_add(self.interval).and_then(format_rfc3339),
        }
    }

    /// Spawns the background sweep loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CleanupError::AlreadyRunning`] when a loop is active and
    /// [`CleanupError::NoRuntime`] outside a tokio runtime.
    pub fn start(&self) -> Result<(), CleanupError> {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|running| !running.handle.is_finished()) {
            self.sweeper.logger.warn(
                "cleanup_already_running",
                "cleanup service is already running",
                json!({}),
            );
            return Err(CleanupError::AlreadyRunning);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| CleanupError::NoRuntime(err.to_string()))?;
        let (shutdown, receiver) = watch::channel(false);
        let handle = runtime.spawn(run_loop(
            Arc::clone(&self.sweeper),
            self.interval,
            self.retry_backoff,
            receiver,
        ));
        *task = Some(RunningTask {
            shutdown,
            handle,
        });
        let config = &self.sweeper.config;
        self.sweeper.logger.info(
            "cleanup_started",
            "upload cleanup service started",
            json!({
                "upload_dir": config.upload_dir.display().to_string(),
                "retention_days": config.retention_days,
                "interval_hours": config.interval_hours,
            }),
        );
        Ok(())
    }

    /// Signals the background loop to stop and waits for it to exit.
    pub async fn stop(&self) {
        let running = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(running) = running else {
            return;
        };
        let _ = running.shutdown.send(true);
        if let Err(err) = running.handle.await {
            self.sweeper.logger.error(
                "cleanup_stop_failed",
                "cleanup task ended abnormally",
                json!({ "error": err.to_string() }),
            );
        }
        self.sweeper.logger.info("cleanup_stopped", "upload cleanup service stopped", json!({}));
    }
}

/// Background loop: wait, sweep, repeat until shutdown.
async fn run_loop(
    sweeper: Arc<Sweeper>,
    interval: Duration,
    retry_backoff: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut delay = interval;
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            () = tokio::time::sleep(delay) => {}
        }
        let worker = Arc::clone(&sweeper);
        match tokio::task::spawn_blocking(move || worker.sweep(SystemTime::now())).await {
            Ok(_) => delay = interval,
            Err(err) => {
                sweeper.logger.error(
                    "cleanup_sweep_failed",
                    "cleanup sweep failed; retrying after backoff",
                    json!({
                        "error": err.to_string(),
                        "retry_after_secs": retry_backoff.as_secs(),
                    }),
                );
                delay = retry_backoff;
            }
        }
    }
}

// ============================================================================
// SECTION: Sweep
// ============================================================================

impl Sweeper {
    /// Deletes expired regular files directly under the upload directory.
    fn sweep(&self, now: SystemTime) -> CleanupReport {
        let dir = &self.config.upload_dir;
        let mut report = CleanupReport::default();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.logger.info(
                    "cleanup_dir_missing",
                    "upload directory does not exist; skipping cleanup",
                    json!({ "upload_dir": dir.display().to_string() }),
                );
                return report;
            }
            Err(err) => {
                self.logger.error(
                    "cleanup_dir_unreadable",
                    "upload directory cannot be read",
                    json!({ "upload_dir": dir.display().to_string(), "error": err.to_string() }),
                );
                return report;
            }
        };
        let retention = self.config.retention();
        for entry in entries.flatten() {
            report.scanned += 1;
            let path = entry.path();
            let Ok(metadata) = fs::symlink_metadata(&path) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age <= retention {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    report.deleted += 1;
                    report.bytes_freed += metadata.len();
                    self.logger.debug(
                        "cleanup_file_deleted",
                        "deleted expired upload",
                        json!({ "path": path.display().to_string(), "bytes": metadata.len() }),
                    );
                    report.deleted_files.push(path);
                }
                Err(err) => {
                    report.failed += 1;
                    self.logger.warn(
                        "cleanup_delete_failed",
                        "failed to delete expired upload",
                        json!({ "path": path.display().to_string(), "error": err.to_string() }),
                    );
                }
            }
        }
        if report.deleted > 0 {
            self.logger.info(
                "cleanup_complete",
                "upload cleanup finished",
                json!({
                    "deleted": report.deleted,
                    "freed_mib": mebibytes(report.bytes_freed),
                    "failed": report.failed,
                }),
            );
        } else {
            self.logger.debug(
                "cleanup_complete",
                "no expired uploads found",
                json!({ "scanned": report.scanned }),
            );
        }
        report
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Formats a timestamp as RFC 3339 in UTC.
fn format_rfc3339(at: SystemTime) -> Option<String> {
    OffsetDateTime::from(at).format(&Rfc3339).ok()
}

/// Converts bytes to mebibytes rounded to two decimals.
#[allow(clippy::cast_precision_loss, reason = "Log output tolerates rounding.")]
fn mebibytes(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MIB * 100.0).round() / 100.0
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
        clippy::float_cmp,
        reason = "Test-only assertions are permitted."
    )]

    use std::path::Path;

    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);

    fn service(dir: &Path, retention_days: u32) -> CleanupService {
        CleanupService::new(
            CleanupConfig {
                upload_dir: dir.to_path_buf(),
                retention_days,
                interval_hours: 24,
            },
            Logger::noop("cleanup"),
        )
    }

    #[test]
    fn sweep_deletes_only_expired_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"12345").unwrap();
        fs::write(dir.path().join("b.png"), b"123").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.png"), b"1").unwrap();

        let service = service(dir.path(), 7);
        let fresh = service.sweep(SystemTime::now());
        assert_eq!(fresh.deleted, 0);
        assert_eq!(fresh.scanned, 3);

        let later = service.sweep(SystemTime::now() + DAY * 8);
        assert_eq!(later.deleted, 2);
        assert_eq!(later.bytes_freed, 8);
        assert_eq!(later.failed, 0);
        assert!(!dir.path().join("a.png").exists());
        assert!(dir.path().join("nested").join("c.png").exists());
    }

    #[test]
    fn sweep_keeps_files_within_retention() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();
        let report = service(dir.path(), 7).sweep(SystemTime::now() + DAY * 6);
        assert_eq!(report.deleted, 0);
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn missing_directory_is_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = service(&dir.path().join("absent"), 7).sweep(SystemTime::now());
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn stopped_status_reports_next_run_one_interval_ahead() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let status = service(dir.path(), 3).status_at(now);
        assert!(!status.running);
        assert_eq!(status.retention_days, 3);
        assert_eq!(status.interval_hours, 24);
        assert_eq!(status.next_cleanup_at.as_deref(), Some("2023-11-15T22:13:20Z"));
    }

    #[test]
    fn start_requires_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let result = service(dir.path(), 7).start();
        assert!(matches!(result, Err(CleanupError::NoRuntime(_))));
    }

    #[test]
    fn mebibytes_rounds() {
        assert_eq!(mebibytes(0), 0.0);
        assert_eq!(mebibytes(1024 * 1024 * 3 / 2), 1.5);
    }
}
