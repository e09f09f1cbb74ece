// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use drydock_provider::Environment;

/// Whether verbose structured recovery-event logging is enabled.
///
/// `RECOVERY_DEBUG=true` (or `1`) turns it on directly; so does a `DEBUG`
/// variable containing the `recovery` substring (the shared debug toggle
/// convention of the surrounding tooling).
pub fn recovery_debug_enabled() -> bool {
    if let Ok(v) = std::env::var("RECOVERY_DEBUG") {
        let v = v.trim().to_ascii_lowercase();
        if v == "true" || v == "1" {
            return true;
        }
    }
    std::env::var("DEBUG").is_ok_and(|v| v.to_ascii_lowercase().contains("recovery"))
}

/// Deployment environment for prebuilt-snapshot registry lookups.
///
/// `DRYDOCK_ENV=main` selects the main registry; anything else (or unset)
/// is dev.
pub fn environment() -> Environment {
    std::env::var("DRYDOCK_ENV")
        .map(|v| Environment::parse(&v))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
