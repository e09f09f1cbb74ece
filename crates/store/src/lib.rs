// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drydock-store: persistence interface for projects and fragments.
//!
//! The backing store is external (a hosted document store in production);
//! this crate defines the operations the recovery core needs from it, plus
//! [`MemoryStore`], the in-memory reference implementation used by tests
//! and local tooling. Strong read-after-write consistency is assumed;
//! callers must not assume more than that (the orchestrator re-reads before
//! deciding whether to update or fork).

pub mod memory;
pub mod versioning;

pub use memory::MemoryStore;
pub use versioning::{finalize_active_fragment, stage_working_files};

use async_trait::async_trait;
use drydock_core::{
    FileMap, Fragment, FragmentId, FragmentStatus, Project, ProjectId, ProviderTag,
    SandboxId, SnapshotImageId,
};
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("fragment not found: {0}")]
    FragmentNotFound(FragmentId),

    #[error("fragment {0} is finalized and cannot be modified")]
    FragmentFinalized(FragmentId),

    #[error("project {0} has no active fragment")]
    NoActiveFragment(ProjectId),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Project reads and writes needed by the recovery core.
///
/// Writes are last-writer-wins; the upstream tool harness serializes turns
/// per project, so no optimistic concurrency token is carried.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;

    /// Insert or replace a project row.
    async fn put_project(&self, project: Project) -> Result<(), StoreError>;

    async fn set_project_active_fragment(
        &self,
        project_id: &ProjectId,
        fragment_id: &FragmentId,
    ) -> Result<(), StoreError>;

    /// Assign (or clear) the project's sandbox and the provider tag that
    /// created it.
    async fn set_project_sandbox(
        &self,
        project_id: &ProjectId,
        sandbox_id: Option<SandboxId>,
        provider: Option<ProviderTag>,
    ) -> Result<(), StoreError>;

    /// Record the outcome of a successful recovery in one write: active
    /// fragment, sandbox assignment (canonical provider), `build_status =
    /// Ready`, cleared `build_error`, stamped `build_status_updated_at_ms`.
    async fn mark_project_recovered(
        &self,
        project_id: &ProjectId,
        fragment_id: &FragmentId,
        sandbox_id: &SandboxId,
        now_ms: u64,
    ) -> Result<(), StoreError>;

    /// Number of fragments ever created for the project, any status.
    async fn count_fragments(&self, project_id: &ProjectId) -> Result<usize, StoreError>;

    /// All projects whose `sandbox_id` currently equals the given id.
    /// Used by the cross-project safety check before sandbox deletion.
    async fn projects_referencing_sandbox(
        &self,
        sandbox_id: &SandboxId,
    ) -> Result<Vec<ProjectId>, StoreError>;
}

/// Fragment reads and writes needed by the recovery core.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    async fn get_fragment(&self, id: &FragmentId) -> Result<Option<Fragment>, StoreError>;

    /// The fragment referenced by the project's `active_fragment_id`.
    async fn find_active_fragment(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Fragment>, StoreError>;

    /// Most recently created fragment, any status.
    async fn find_latest_fragment(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Fragment>, StoreError>;

    /// Most recently updated fragment, any status.
    async fn find_latest_updated_fragment(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Fragment>, StoreError>;

    /// Most recently created fragment that has a filesystem snapshot,
    /// optionally restricted to fragments created at or before the given
    /// timestamp.
    async fn find_latest_fragment_with_snapshot(
        &self,
        project_id: &ProjectId,
        before_or_eq_ms: Option<u64>,
    ) -> Result<Option<Fragment>, StoreError>;

    async fn create_fragment(
        &self,
        project_id: &ProjectId,
        title: &str,
        status: FragmentStatus,
        files: FileMap,
        now_ms: u64,
    ) -> Result<Fragment, StoreError>;

    /// Replace a working fragment's file map whole. Errors with
    /// [`StoreError::FragmentFinalized`] on a finalized fragment — edits to
    /// finalized fragments must fork instead (see [`versioning`]).
    async fn update_fragment_files(
        &self,
        id: &FragmentId,
        files: FileMap,
        now_ms: u64,
    ) -> Result<Fragment, StoreError>;

    /// Flip a working fragment to finalized and give it its descriptive
    /// title. Errors if the fragment is already finalized.
    async fn finalize_fragment(
        &self,
        id: &FragmentId,
        title: &str,
        now_ms: u64,
    ) -> Result<Fragment, StoreError>;

    /// Record the filesystem snapshot captured for a fragment.
    async fn set_fragment_snapshot(
        &self,
        id: &FragmentId,
        snapshot: &SnapshotImageId,
    ) -> Result<(), StoreError>;
}
