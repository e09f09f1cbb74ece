// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox health checking.
//!
//! Side-effect-free except logging: given a project, decide whether its
//! sandbox is usable. Expected unhealthy states are structured results,
//! never errors — a provider failure while listing files is itself an
//! unhealthy state (the sandbox can't be trusted), not an exception.

use drydock_core::{Project, ProjectId, SandboxId};
use drydock_provider::{FileListing, SandboxProvider};
use drydock_store::{ProjectStore, StoreError};
use tracing::{debug, warn};

/// Why a project is (or is not) considered broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReason {
    /// Not broken: all required files present
    Healthy,
    /// Not broken: brand-new project, nothing generated yet
    NewProjectNoGeneration,
    /// Not broken: sandbox belongs to a non-canonical provider, out of scope
    ForeignProvider,
    /// Broken: fragments exist but no sandbox is assigned
    MissingSandbox,
    /// Broken: live sandbox is missing required files
    MissingCriticalFiles,
    /// Broken: the sandbox file listing itself failed
    ListFilesFailed,
}

drydock_core::simple_display! {
    HealthReason {
        Healthy => "healthy",
        NewProjectNoGeneration => "new-project-no-generation-yet",
        ForeignProvider => "foreign-provider",
        MissingSandbox => "missing-sandbox",
        MissingCriticalFiles => "missing-critical-files",
        ListFilesFailed => "list-files-failed",
    }
}

/// Structured health-check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub broken: bool,
    pub sandbox_id: Option<SandboxId>,
    pub reason: HealthReason,
    /// Labels of required-file patterns with zero matches
    pub missing_files: Vec<String>,
}

impl HealthReport {
    fn ok(reason: HealthReason, sandbox_id: Option<SandboxId>) -> Self {
        Self { broken: false, sandbox_id, reason, missing_files: Vec::new() }
    }

    fn broken(reason: HealthReason, sandbox_id: Option<SandboxId>) -> Self {
        Self { broken: true, sandbox_id, reason, missing_files: Vec::new() }
    }
}

/// Required-file pattern labels, as they appear in `missing_files`.
pub const MANIFEST_LABEL: &str = "package.json";
pub const BUILD_CONFIG_LABEL: &str = "build config (vite/webpack/next)";
pub const ENTRY_POINT_LABEL: &str = "entry point (src/main.* or src/index.*)";
pub const TYPECHECK_CONFIG_LABEL: &str = "tsconfig.json or jsconfig.json";

/// Health checker over a store and a sandbox provider.
pub struct HealthChecker<'a, S, P> {
    store: &'a S,
    provider: &'a P,
}

impl<'a, S, P> HealthChecker<'a, S, P>
where
    S: ProjectStore,
    P: SandboxProvider,
{
    pub fn new(store: &'a S, provider: &'a P) -> Self {
        Self { store, provider }
    }

    /// Evaluate the health rules in order; first match wins.
    pub async fn check(&self, project_id: &ProjectId) -> Result<HealthReport, StoreError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.clone()))?;

        let Some(sandbox_id) = project.sandbox_id.clone() else {
            return self.check_missing_sandbox(&project).await;
        };

        // Foreign/unmanaged sandboxes are exempt: the health concept only
        // applies to sandboxes this core provisioned.
        if project.has_foreign_sandbox() {
            debug!(project_id = %project_id, provider = ?project.sandbox_provider, "foreign provider, health not applicable");
            return Ok(HealthReport::ok(HealthReason::ForeignProvider, Some(sandbox_id)));
        }

        let listing = match self.provider.list_files(&sandbox_id).await {
            Ok(listing) => listing,
            Err(error) => {
                // Treated identically to missing critical files for
                // recovery-triggering purposes; logged, not surfaced.
                warn!(project_id = %project_id, sandbox_id = %sandbox_id, error = %error, "sandbox file listing failed");
                return Ok(HealthReport::broken(
                    HealthReason::ListFilesFailed,
                    Some(sandbox_id),
                ));
            }
        };

        let missing = missing_required_files(&listing);
        if missing.is_empty() {
            Ok(HealthReport::ok(HealthReason::Healthy, Some(sandbox_id)))
        } else {
            debug!(project_id = %project_id, sandbox_id = %sandbox_id, ?missing, "critical files missing");
            Ok(HealthReport {
                broken: true,
                sandbox_id: Some(sandbox_id),
                reason: HealthReason::MissingCriticalFiles,
                missing_files: missing,
            })
        }
    }

    async fn check_missing_sandbox(
        &self,
        project: &Project,
    ) -> Result<HealthReport, StoreError> {
        let fragment_count = self.store.count_fragments(&project.id).await?;
        if fragment_count == 0 {
            // A brand-new project isn't broken, it just hasn't built anything.
            debug!(project_id = %project.id, "new project, no generation yet");
            return Ok(HealthReport::ok(HealthReason::NewProjectNoGeneration, None));
        }
        Ok(HealthReport::broken(HealthReason::MissingSandbox, None))
    }
}

/// Evaluate the required-file patterns against a live file listing.
fn missing_required_files(listing: &FileListing) -> Vec<String> {
    let mut missing = Vec::new();

    if !listing.contains_key("package.json") {
        missing.push(MANIFEST_LABEL.to_string());
    }

    if !listing.keys().any(|path| is_build_config(path)) {
        missing.push(BUILD_CONFIG_LABEL.to_string());
    }

    if !listing.keys().any(|path| is_entry_point(path)) {
        missing.push(ENTRY_POINT_LABEL.to_string());
    }

    let has_typescript_source = listing
        .keys()
        .any(|path| path.starts_with("src/") && (path.ends_with(".ts") || path.ends_with(".tsx")));
    if has_typescript_source && !listing.keys().any(|path| is_typecheck_config(path)) {
        missing.push(TYPECHECK_CONFIG_LABEL.to_string());
    }

    missing
}

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "mts"];

fn is_build_config(path: &str) -> bool {
    for stem in ["vite.config.", "webpack.config.", "next.config."] {
        if let Some(ext) = path.strip_prefix(stem) {
            return SCRIPT_EXTENSIONS.contains(&ext);
        }
    }
    false
}

fn is_entry_point(path: &str) -> bool {
    for stem in ["src/main.", "src/index."] {
        if let Some(ext) = path.strip_prefix(stem) {
            return SCRIPT_EXTENSIONS.contains(&ext);
        }
    }
    false
}

fn is_typecheck_config(path: &str) -> bool {
    (path.starts_with("tsconfig") || path.starts_with("jsconfig")) && path.ends_with(".json")
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
