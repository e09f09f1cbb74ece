// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream-facing sandbox gate.
//!
//! Tool handlers call [`assert_sandbox_healthy`] before touching a
//! project's sandbox. A broken sandbox surfaces as one generic user-visible
//! message; the structured reason and missing-file list stay in the logs
//! for operators. Live handles are served through a caller-owned
//! [`TtlCache`] so repeated tool calls in one turn skip the provider
//! round-trip.

use crate::health::HealthChecker;
use drydock_core::{Clock, ProjectId, TtlCache};
use drydock_provider::{SandboxHandle, SandboxProvider};
use drydock_store::{ProjectStore, StoreError};
use thiserror::Error;
use tracing::warn;

/// Generic user-visible message for any broken-sandbox state.
pub const UNAVAILABLE_MESSAGE: &str =
    "Sandbox unavailable; recovery is in progress. Please retry shortly.";

/// Cache of live sandbox handles, keyed by project.
pub type SandboxHandleCache = TtlCache<ProjectId, SandboxHandle>;

/// Handle cache TTL. Long enough to cover one agent turn's tool calls,
/// short enough that a recovered project picks up its new sandbox promptly.
pub const HANDLE_CACHE_TTL_MS: u64 = 30_000;

pub const HANDLE_CACHE_CAPACITY: usize = 256;

/// A handle cache sized for the guard's access pattern.
pub fn new_handle_cache() -> SandboxHandleCache {
    TtlCache::new(HANDLE_CACHE_TTL_MS, HANDLE_CACHE_CAPACITY)
}

/// Guard errors. `Unavailable` renders only the generic message.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("{UNAVAILABLE_MESSAGE}")]
    Unavailable { project_id: ProjectId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Require a healthy, reachable sandbox for the project.
///
/// Returns the live handle on success. Any broken state (and a healthy
/// state with no handle to give out, e.g. a brand-new project) maps to
/// [`GuardError::Unavailable`].
pub async fn assert_sandbox_healthy<S, P, C>(
    store: &S,
    provider: &P,
    clock: &C,
    cache: &SandboxHandleCache,
    project_id: &ProjectId,
) -> Result<SandboxHandle, GuardError>
where
    S: ProjectStore,
    P: SandboxProvider,
    C: Clock,
{
    let report = HealthChecker::new(store, provider).check(project_id).await?;
    if report.broken {
        warn!(
            project_id = %project_id,
            reason = %report.reason,
            missing_files = ?report.missing_files,
            "sandbox guard rejected project"
        );
        return Err(GuardError::Unavailable { project_id: project_id.clone() });
    }

    let now_ms = clock.epoch_ms();
    if let Some(handle) = cache.get(project_id, now_ms) {
        return Ok(handle);
    }

    match provider.get_sandbox(project_id).await {
        Ok(Some(handle)) => {
            cache.insert(project_id.clone(), handle.clone(), now_ms);
            Ok(handle)
        }
        Ok(None) => {
            warn!(project_id = %project_id, "healthy report but no live sandbox handle");
            Err(GuardError::Unavailable { project_id: project_id.clone() })
        }
        Err(error) => {
            warn!(project_id = %project_id, error = %error, "sandbox handle lookup failed");
            Err(GuardError::Unavailable { project_id: project_id.clone() })
        }
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
