// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drydock-provider: interface to the external sandbox runtime.
//!
//! Sandboxes are disposable containers running a project's dev server. The
//! runtime itself is external; this crate defines the operations the
//! recovery core needs from it, the static prebuilt-snapshot registry, and
//! a scriptable in-memory fake for tests.

pub mod registry;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use registry::{Environment, SnapshotRegistry};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSandboxProvider;

use async_trait::async_trait;
use drydock_core::{FragmentId, ProjectId, Provenance, SandboxId, SnapshotImageId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("sandbox not found: {0}")]
    SandboxNotFound(SandboxId),

    #[error("snapshot image not found: {0}")]
    SnapshotNotFound(SnapshotImageId),

    #[error("file not found in sandbox {sandbox_id}: {path}")]
    FileNotFound { sandbox_id: SandboxId, path: String },

    #[error("command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("sandbox runtime error: {0}")]
    Runtime(String),
}

/// A reachable live sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxHandle {
    pub sandbox_id: SandboxId,
    /// Externally reachable URL of the running dev server
    pub url: String,
}

/// Options for creating a sandbox.
#[derive(Debug, Clone, Default)]
pub struct CreateSandboxOptions {
    /// Restore hint: provider-level disk image to start from instead of
    /// rebuilding from template + file replay
    pub snapshot_image_id: Option<SnapshotImageId>,
    /// Import provenance, threaded through so the runtime can enforce
    /// file-language rules for imported code
    pub provenance: Option<Provenance>,
}

/// Per-file metadata from a sandbox file listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub size_bytes: u64,
}

/// Listing of a sandbox's file tree: repo-relative path → metadata.
pub type FileListing = IndexMap<String, FileMeta>;

/// Result of a shell command executed inside a sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Canonical dev-server port inside a sandbox.
pub const DEV_SERVER_PORT: u16 = 5173;

/// Interface to the external sandbox runtime.
///
/// Every method is a remote round-trip except where noted. Implementations
/// must not hold locks across awaits; the orchestrator calls these
/// sequentially within one recovery invocation.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Create a sandbox for the project from the given template, restoring
    /// from the snapshot hint when one is supplied.
    async fn create_sandbox(
        &self,
        project_id: &ProjectId,
        fragment_id: &FragmentId,
        template: &str,
        opts: CreateSandboxOptions,
    ) -> Result<SandboxHandle, ProviderError>;

    /// The project's currently provisioned sandbox, if the runtime still
    /// knows it.
    async fn get_sandbox(&self, project_id: &ProjectId)
        -> Result<Option<SandboxHandle>, ProviderError>;

    async fn delete_sandbox(
        &self,
        sandbox_id: &SandboxId,
        project_id: &ProjectId,
    ) -> Result<(), ProviderError>;

    /// List all files in the sandbox's project tree.
    async fn list_files(&self, sandbox_id: &SandboxId) -> Result<FileListing, ProviderError>;

    async fn read_file(&self, sandbox_id: &SandboxId, path: &str)
        -> Result<String, ProviderError>;

    async fn write_file(
        &self,
        sandbox_id: &SandboxId,
        path: &str,
        content: &str,
    ) -> Result<(), ProviderError>;

    /// Execute a shell command with a bounded timeout. A timeout is an
    /// error, not a hung call.
    async fn execute_command(
        &self,
        sandbox_id: &SandboxId,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, ProviderError>;

    /// Start the dev server on the given port. Idempotent.
    async fn start_dev_server(
        &self,
        sandbox_id: &SandboxId,
        project_id: &ProjectId,
        port: u16,
    ) -> Result<(), ProviderError>;

    /// Capture a filesystem snapshot of the sandbox's disk, associated with
    /// the given fragment.
    async fn create_filesystem_snapshot(
        &self,
        sandbox_id: &SandboxId,
        fragment_id: &FragmentId,
        project_id: &ProjectId,
    ) -> Result<SnapshotImageId, ProviderError>;
}
