// crates/studio-proxy-core/src/lib.rs
// ============================================================================
// Module: Studio Proxy Core Library
// Description: Runtime consumers of the typed proxy configuration.
// Purpose: Logging, parameter resolution, models, cleanup, and health.
// Dependencies: rand, reqwest, serde, serde_json, studio-proxy-config,
//               thiserror, time, tokio
// ============================================================================

//! ## Overview
//! `studio-proxy-core` turns a loaded [`studio_proxy_config::ProxyConfig`]
//! into runtime behavior: a structured logger, per-request generation
//! parameter resolution with an apply cache, model catalog filtering, the
//! periodic upload cleanup service, and the health probe used by container
//! healthchecks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cleanup;
pub mod health;
pub mod log;
pub mod models;
pub mod params;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cleanup::CleanupError;
pub use cleanup::CleanupReport;
pub use cleanup::CleanupService;
pub use cleanup::CleanupStatus;
pub use health::HealthError;
pub use health::HealthProbe;
pub use health::HealthReport;
pub use log::LogLevel;
pub use log::LogSink;
pub use log::Logger;
pub use models::ModelCatalog;
pub use models::ModelEntry;
pub use models::ModelError;
pub use models::completion_id;
pub use params::GenerationRequest;
pub use params::ParamPlan;
pub use params::ParamsCache;
pub use params::ResolvedParams;
pub use params::resolve_params;
