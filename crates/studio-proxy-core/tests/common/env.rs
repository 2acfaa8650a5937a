// crates/studio-proxy-core/tests/common/env.rs
// =============================================================================
// Module: Test Environment Helpers
// Description: Wrappers for test-only process environment mutation.
// Purpose: Keep env var changes in one place with explicit safety notes.
// =============================================================================

#![allow(unsafe_code, reason = "Test harness mutates process env for proxy settings.")]

/// Sets an environment variable for the current process.
pub fn set_var(key: &str, value: &str) {
    // SAFETY: Called from a single-test binary before any client or server starts.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Removes an environment variable from the current process.
pub fn remove_var(key: &str) {
    // SAFETY: Called from a single-test binary before any client or server starts.
    unsafe {
        std::env::remove_var(key);
    }
}
