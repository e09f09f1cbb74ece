// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox recovery orchestration.
//!
//! Given a project whose sandbox is missing or broken, select the best
//! historical fragment snapshot, materialize a sandbox from it, publish the
//! new state on the project row, verify the rebuilt sandbox, and retire the
//! old one. Steps run strictly in that order within one invocation; the
//! upstream tool harness serializes invocations per project, so no lock is
//! taken here.
//!
//! Non-critical sub-steps (template bootstrap, snapshot capture, old-sandbox
//! deletion) degrade with a log line. Verification failure after a rebuild
//! is fatal to the operation and surfaces to the caller.

use crate::env;
use crate::health::{HealthChecker, HealthReason};
use crate::template::TemplateResolver;
use drydock_core::{
    resolve_provenance, Clock, Fragment, FragmentId, Project, ProjectId, SandboxId,
    SnapshotImageId,
};
use drydock_provider::{
    CreateSandboxOptions, Environment, ProviderError, SandboxHandle, SandboxProvider,
    SnapshotRegistry, DEV_SERVER_PORT,
};
use drydock_store::{FragmentStore, ProjectStore, StoreError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Recovery errors.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("no fragment available to rebuild project {0} from")]
    NoFragment(ProjectId),

    #[error(
        "recovery failed verification for project {project_id}: critical files still missing ({missing_files:?})"
    )]
    VerificationFailed { project_id: ProjectId, missing_files: Vec<String> },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sandbox provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Caller-supplied overrides for one recovery invocation.
#[derive(Debug, Clone, Default)]
pub struct RecoverOptions {
    /// Recover from this fragment instead of the project's active fragment
    pub fragment_id: Option<FragmentId>,
    /// Skip template inference and use this template
    pub template: Option<String>,
}

/// Where the recovery fragment/snapshot pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// The starting (explicit or active) fragment had its own snapshot
    ActiveFragment,
    /// Latest snapshot-bearing fragment at or before the starting fragment
    FallbackFragment,
    /// Latest snapshot-bearing fragment, time constraint dropped
    LatestSnapshot,
    /// No snapshot anywhere; sandbox bootstrapped directly from template
    TemplateBootstrap,
}

drydock_core::simple_display! {
    SnapshotSource {
        ActiveFragment => "active-fragment",
        FallbackFragment => "fallback-fragment",
        LatestSnapshot => "latest-snapshot",
        TemplateBootstrap => "template-bootstrap",
    }
}

/// Result of a recovery invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOutcome {
    /// False when nothing was wrong (recovery is an idempotent no-op)
    pub recovered: bool,
    pub sandbox_id: Option<SandboxId>,
}

struct RecoverySelection {
    fragment_id: FragmentId,
    snapshot_image_id: Option<SnapshotImageId>,
    source: SnapshotSource,
    /// Sandbox already created by the template-bootstrap path, to be reused
    bootstrapped: Option<SandboxHandle>,
}

/// The recovery orchestrator.
pub struct Recovery<'a, S, P, C> {
    store: &'a S,
    provider: &'a P,
    clock: C,
    registry: SnapshotRegistry,
    environment: Environment,
    debug: bool,
}

impl<'a, S, P, C> Recovery<'a, S, P, C>
where
    S: ProjectStore + FragmentStore,
    P: SandboxProvider,
    C: Clock,
{
    /// Build an orchestrator; verbose event logging follows the
    /// `RECOVERY_DEBUG` toggle.
    pub fn new(store: &'a S, provider: &'a P, clock: C, environment: Environment) -> Self {
        Self {
            store,
            provider,
            clock,
            registry: SnapshotRegistry,
            environment,
            debug: env::recovery_debug_enabled(),
        }
    }

    /// Override the verbose-logging toggle (tests, embedded tooling).
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Recover the project's sandbox if it is broken.
    ///
    /// No-op (`recovered = false`, zero writes) when the sandbox is healthy,
    /// the project is brand-new, or the sandbox belongs to a foreign
    /// provider.
    pub async fn recover(
        &self,
        project_id: &ProjectId,
        opts: RecoverOptions,
    ) -> Result<RecoveryOutcome, RecoveryError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| RecoveryError::ProjectNotFound(project_id.clone()))?;

        let resolution = TemplateResolver::new(self.store, self.registry, self.environment)
            .resolve(project_id)
            .await?;
        let template = opts.template.clone().unwrap_or_else(|| resolution.template.clone());
        let previous_sandbox_id = project.sandbox_id.clone();

        let provenance = resolve_provenance(&project);
        if !provenance.provider.is_canonical() {
            info!(project_id = %project_id, provider = %provenance.provider, "foreign sandbox provider, recovery out of scope");
            return Ok(RecoveryOutcome { recovered: false, sandbox_id: previous_sandbox_id });
        }

        let health = HealthChecker::new(self.store, self.provider);
        let report = health.check(project_id).await?;
        if !report.broken {
            if report.reason == HealthReason::NewProjectNoGeneration {
                self.event(project_id, "nothing to recover: project has no generation yet");
            } else {
                self.event(project_id, "sandbox healthy, recovery is a no-op");
            }
            return Ok(RecoveryOutcome { recovered: false, sandbox_id: report.sandbox_id });
        }
        info!(
            project_id = %project_id,
            reason = %report.reason,
            template,
            template_source = %resolution.source,
            prebuilt_snapshot = resolution.has_snapshot,
            "sandbox broken, starting recovery"
        );

        let selection = self.find_recovery_snapshot(&project, &opts, &template).await?;
        self.event(
            project_id,
            &format!(
                "selected recovery fragment {} (source: {}, snapshot: {})",
                selection.fragment_id,
                selection.source,
                selection
                    .snapshot_image_id
                    .as_ref()
                    .map(|id| id.as_str())
                    .unwrap_or("none"),
            ),
        );

        // Materialize: reuse the bootstrap sandbox when that path already
        // created one, otherwise create from the selected fragment/snapshot.
        let restored_from_snapshot =
            selection.bootstrapped.is_none() && selection.snapshot_image_id.is_some();
        let handle = match selection.bootstrapped {
            Some(handle) => handle,
            None => {
                self.provider
                    .create_sandbox(
                        project_id,
                        &selection.fragment_id,
                        &template,
                        CreateSandboxOptions {
                            snapshot_image_id: selection.snapshot_image_id.clone(),
                            provenance: Some(provenance.clone()),
                        },
                    )
                    .await?
            }
        };

        // A snapshot restore resumes the captured dev server; anything else
        // needs the server started fresh.
        if !restored_from_snapshot {
            if let Err(error) = self
                .provider
                .start_dev_server(&handle.sandbox_id, project_id, DEV_SERVER_PORT)
                .await
            {
                warn!(project_id = %project_id, sandbox_id = %handle.sandbox_id, error = %error, "failed to start dev server after recovery");
            }
        }

        // Publish the new state before verification: the active-fragment
        // pointer must be visible even if verification below raises.
        self.store
            .mark_project_recovered(
                project_id,
                &selection.fragment_id,
                &handle.sandbox_id,
                self.clock.epoch_ms(),
            )
            .await?;

        let verify = health.check(project_id).await?;
        if verify.broken {
            warn!(
                project_id = %project_id,
                sandbox_id = %handle.sandbox_id,
                reason = %verify.reason,
                missing_files = ?verify.missing_files,
                "recovery failed verification"
            );
            return Err(RecoveryError::VerificationFailed {
                project_id: project_id.clone(),
                missing_files: verify.missing_files,
            });
        }

        if let Some(previous) = previous_sandbox_id {
            if previous != handle.sandbox_id {
                self.cleanup_previous_sandbox(project_id, &previous).await;
            }
        }

        info!(project_id = %project_id, sandbox_id = %handle.sandbox_id, source = %selection.source, "recovery complete");
        Ok(RecoveryOutcome { recovered: true, sandbox_id: Some(handle.sandbox_id) })
    }

    /// Select the fragment + snapshot pair to rebuild from.
    ///
    /// Selection ladder: the starting fragment's own snapshot, the latest
    /// snapshot at or before the starting fragment's creation time (never a
    /// state chronologically ahead of what the user meant to restore), the
    /// latest snapshot outright, and finally a template bootstrap.
    async fn find_recovery_snapshot(
        &self,
        project: &Project,
        opts: &RecoverOptions,
        template: &str,
    ) -> Result<RecoverySelection, RecoveryError> {
        let starting_id =
            opts.fragment_id.clone().or_else(|| project.active_fragment_id.clone());
        let starting = match &starting_id {
            Some(id) => self.store.get_fragment(id).await?,
            None => None,
        };

        if let Some(fragment) = &starting {
            if let Some(image) = &fragment.snapshot_image_id {
                return Ok(RecoverySelection {
                    fragment_id: fragment.id.clone(),
                    snapshot_image_id: Some(image.clone()),
                    source: SnapshotSource::ActiveFragment,
                    bootstrapped: None,
                });
            }
        }

        if let Some(cutoff) = starting.as_ref().map(|f| f.created_at_ms) {
            if let Some(fragment) = self
                .store
                .find_latest_fragment_with_snapshot(&project.id, Some(cutoff))
                .await?
            {
                return Ok(RecoverySelection {
                    snapshot_image_id: fragment.snapshot_image_id.clone(),
                    fragment_id: fragment.id,
                    source: SnapshotSource::FallbackFragment,
                    bootstrapped: None,
                });
            }
        }

        if let Some(fragment) =
            self.store.find_latest_fragment_with_snapshot(&project.id, None).await?
        {
            return Ok(RecoverySelection {
                snapshot_image_id: fragment.snapshot_image_id.clone(),
                fragment_id: fragment.id,
                source: SnapshotSource::LatestSnapshot,
                bootstrapped: None,
            });
        }

        // No snapshot anywhere: bootstrap a fresh sandbox from the template
        // and capture a snapshot for the next recovery.
        let fragment = self
            .ensure_fragment_for_recovery(&project.id, opts.fragment_id.as_ref())
            .await?
            .ok_or_else(|| RecoveryError::NoFragment(project.id.clone()))?;

        match self.bootstrap_from_template(project, &fragment, template).await {
            Ok((handle, image)) => Ok(RecoverySelection {
                fragment_id: fragment.id,
                snapshot_image_id: image,
                source: SnapshotSource::TemplateBootstrap,
                bootstrapped: Some(handle),
            }),
            Err(error) => {
                // Bootstrap is best-effort; the materialize step will create
                // the sandbox from (fragment, template) without a snapshot.
                warn!(project_id = %project.id, fragment_id = %fragment.id, error = %error, "template bootstrap failed, continuing without snapshot");
                Ok(RecoverySelection {
                    fragment_id: fragment.id,
                    snapshot_image_id: None,
                    source: SnapshotSource::TemplateBootstrap,
                    bootstrapped: None,
                })
            }
        }
    }

    /// Pick the content fragment for a template bootstrap: the explicit
    /// fragment if it still exists, else the most recently updated fragment.
    async fn ensure_fragment_for_recovery(
        &self,
        project_id: &ProjectId,
        explicit: Option<&FragmentId>,
    ) -> Result<Option<Fragment>, StoreError> {
        if let Some(id) = explicit {
            if let Some(fragment) = self.store.get_fragment(id).await? {
                return Ok(Some(fragment));
            }
            debug!(project_id = %project_id, fragment_id = %id, "explicit recovery fragment no longer exists");
        }
        self.store.find_latest_updated_fragment(project_id).await
    }

    /// Create a sandbox straight from the template and capture a snapshot of
    /// it so the next recovery can restore instead of rebuilding.
    async fn bootstrap_from_template(
        &self,
        project: &Project,
        fragment: &Fragment,
        template: &str,
    ) -> Result<(SandboxHandle, Option<SnapshotImageId>), ProviderError> {
        let handle = self
            .provider
            .create_sandbox(
                &project.id,
                &fragment.id,
                template,
                CreateSandboxOptions {
                    snapshot_image_id: None,
                    provenance: Some(resolve_provenance(project)),
                },
            )
            .await?;

        let image = match self
            .provider
            .create_filesystem_snapshot(&handle.sandbox_id, &fragment.id, &project.id)
            .await
        {
            Ok(image) => {
                if let Err(error) = self.store.set_fragment_snapshot(&fragment.id, &image).await
                {
                    warn!(fragment_id = %fragment.id, error = %error, "failed to persist snapshot id on fragment");
                }
                Some(image)
            }
            Err(error) => {
                warn!(sandbox_id = %handle.sandbox_id, error = %error, "snapshot capture failed after template bootstrap");
                None
            }
        };

        Ok((handle, image))
    }

    /// Delete the pre-recovery sandbox unless another project still holds it.
    async fn cleanup_previous_sandbox(&self, project_id: &ProjectId, previous: &SandboxId) {
        match self.store.projects_referencing_sandbox(previous).await {
            Ok(holders) => {
                if holders.iter().any(|holder| holder != project_id) {
                    info!(project_id = %project_id, sandbox_id = %previous, "previous sandbox still referenced by another project, keeping it");
                    return;
                }
            }
            Err(error) => {
                warn!(sandbox_id = %previous, error = %error, "sandbox reference check failed, keeping previous sandbox");
                return;
            }
        }

        if let Err(error) = self.provider.delete_sandbox(previous, project_id).await {
            warn!(sandbox_id = %previous, error = %error, "failed to delete previous sandbox");
        } else {
            self.event(project_id, &format!("deleted previous sandbox {previous}"));
        }
    }

    /// Recovery event log line, verbose under `RECOVERY_DEBUG`.
    fn event(&self, project_id: &ProjectId, message: &str) {
        if self.debug {
            info!(project_id = %project_id, "{message}");
        } else {
            debug!(project_id = %project_id, "{message}");
        }
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
