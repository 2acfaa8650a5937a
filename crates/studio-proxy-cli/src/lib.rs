// crates/studio-proxy-cli/src/lib.rs
// ============================================================================
// Module: Studio Proxy CLI Library
// Description: Shared helpers for the studio-proxy binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: Standard library only.
// ============================================================================

//! ## Overview
//! The `studio-proxy` binary routes every user-facing string through the
//! [`i18n`] catalog and the [`t!`] macro.

pub mod i18n;
