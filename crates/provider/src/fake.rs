// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable in-memory sandbox provider for tests.
//!
//! Sandboxes are seeded from registered template or snapshot file sets; the
//! real runtime's fragment file replay is out of scope here, so tests
//! register templates with whatever tree the scenario needs. Failure
//! injection covers the paths the recovery state machine degrades on:
//! file listing, sandbox creation, snapshot capture.

use crate::{
    CreateSandboxOptions, ExecResult, FileListing, FileMeta, ProviderError, SandboxHandle,
    SandboxProvider,
};
use async_trait::async_trait;
use drydock_core::{FileMap, FragmentId, ProjectId, SandboxId, SnapshotImageId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

struct FakeSandbox {
    project_id: ProjectId,
    files: FileMap,
}

#[derive(Default)]
struct FakeInner {
    templates: HashMap<String, FileMap>,
    snapshots: HashMap<SnapshotImageId, FileMap>,
    sandboxes: HashMap<SandboxId, FakeSandbox>,
    by_project: HashMap<ProjectId, SandboxId>,
    deleted: Vec<SandboxId>,
    fail_list_files: HashSet<SandboxId>,
    fail_create: bool,
    fail_next_creates: u32,
    fail_snapshot_capture: bool,
    scripted_commands: HashMap<String, ExecResult>,
    timeout_commands: HashSet<String>,
    commands_run: Vec<(SandboxId, String)>,
    dev_servers: Vec<(SandboxId, u16)>,
    next_sandbox: u64,
    next_snapshot: u64,
}

/// In-memory [`SandboxProvider`] with failure injection.
#[derive(Default)]
pub struct FakeSandboxProvider {
    inner: Mutex<FakeInner>,
}

impl FakeSandboxProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ───────────────────────────────────────────────────────

    /// Register the file tree a template seeds new sandboxes with.
    pub fn register_template(&self, name: &str, files: FileMap) {
        self.inner.lock().templates.insert(name.to_string(), files);
    }

    /// Register a restorable snapshot image.
    pub fn register_snapshot(&self, id: &str, files: FileMap) {
        self.inner.lock().snapshots.insert(SnapshotImageId::new(id), files);
    }

    /// Make `list_files` fail for the given sandbox until cleared.
    pub fn fail_list_files(&self, sandbox_id: &SandboxId) {
        self.inner.lock().fail_list_files.insert(sandbox_id.clone());
    }

    pub fn clear_list_files_failure(&self, sandbox_id: &SandboxId) {
        self.inner.lock().fail_list_files.remove(sandbox_id);
    }

    /// Make every `create_sandbox` call fail.
    pub fn fail_create(&self, fail: bool) {
        self.inner.lock().fail_create = fail;
    }

    /// Make only the next `n` `create_sandbox` calls fail.
    pub fn fail_next_creates(&self, n: u32) {
        self.inner.lock().fail_next_creates = n;
    }

    /// Make every `create_filesystem_snapshot` call fail.
    pub fn fail_snapshot_capture(&self, fail: bool) {
        self.inner.lock().fail_snapshot_capture = fail;
    }

    /// Script the result of a specific command string. Unscripted commands
    /// succeed with empty output.
    pub fn script_command(&self, command: &str, result: ExecResult) {
        self.inner.lock().scripted_commands.insert(command.to_string(), result);
    }

    /// Make a specific command string time out.
    pub fn script_command_timeout(&self, command: &str) {
        self.inner.lock().timeout_commands.insert(command.to_string());
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn deleted_sandboxes(&self) -> Vec<SandboxId> {
        self.inner.lock().deleted.clone()
    }

    pub fn sandbox_files(&self, sandbox_id: &SandboxId) -> Option<FileMap> {
        self.inner.lock().sandboxes.get(sandbox_id).map(|s| s.files.clone())
    }

    pub fn sandbox_count(&self) -> usize {
        self.inner.lock().sandboxes.len()
    }

    pub fn dev_servers_started(&self) -> Vec<(SandboxId, u16)> {
        self.inner.lock().dev_servers.clone()
    }

    pub fn commands_run(&self) -> Vec<(SandboxId, String)> {
        self.inner.lock().commands_run.clone()
    }

    pub fn snapshot_count(&self) -> usize {
        self.inner.lock().snapshots.len()
    }

    /// The project a live sandbox belongs to.
    pub fn sandbox_project(&self, sandbox_id: &SandboxId) -> Option<ProjectId> {
        self.inner.lock().sandboxes.get(sandbox_id).map(|s| s.project_id.clone())
    }
}

#[async_trait]
impl SandboxProvider for FakeSandboxProvider {
    async fn create_sandbox(
        &self,
        project_id: &ProjectId,
        _fragment_id: &FragmentId,
        template: &str,
        opts: CreateSandboxOptions,
    ) -> Result<SandboxHandle, ProviderError> {
        let mut inner = self.inner.lock();
        if inner.fail_next_creates > 0 {
            inner.fail_next_creates -= 1;
            return Err(ProviderError::Runtime("sandbox creation unavailable".into()));
        }
        if inner.fail_create {
            return Err(ProviderError::Runtime("sandbox creation unavailable".into()));
        }

        let files = match &opts.snapshot_image_id {
            Some(image) => inner
                .snapshots
                .get(image)
                .cloned()
                .ok_or_else(|| ProviderError::SnapshotNotFound(image.clone()))?,
            None => inner
                .templates
                .get(template)
                .cloned()
                .ok_or_else(|| ProviderError::Runtime(format!("unknown template: {template}")))?,
        };

        inner.next_sandbox += 1;
        let sandbox_id = SandboxId::new(format!("sb-{}", inner.next_sandbox));
        let url = format!("https://{}.preview.test", sandbox_id.as_str());

        inner.sandboxes.insert(
            sandbox_id.clone(),
            FakeSandbox { project_id: project_id.clone(), files },
        );
        inner.by_project.insert(project_id.clone(), sandbox_id.clone());

        Ok(SandboxHandle { sandbox_id, url })
    }

    async fn get_sandbox(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<SandboxHandle>, ProviderError> {
        let inner = self.inner.lock();
        Ok(inner.by_project.get(project_id).map(|id| SandboxHandle {
            sandbox_id: id.clone(),
            url: format!("https://{}.preview.test", id.as_str()),
        }))
    }

    async fn delete_sandbox(
        &self,
        sandbox_id: &SandboxId,
        _project_id: &ProjectId,
    ) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        if inner.sandboxes.remove(sandbox_id).is_none() {
            return Err(ProviderError::SandboxNotFound(sandbox_id.clone()));
        }
        inner.by_project.retain(|_, id| id != sandbox_id);
        inner.deleted.push(sandbox_id.clone());
        Ok(())
    }

    async fn list_files(&self, sandbox_id: &SandboxId) -> Result<FileListing, ProviderError> {
        let inner = self.inner.lock();
        if inner.fail_list_files.contains(sandbox_id) {
            return Err(ProviderError::Runtime("file listing unavailable".into()));
        }
        let sandbox = inner
            .sandboxes
            .get(sandbox_id)
            .ok_or_else(|| ProviderError::SandboxNotFound(sandbox_id.clone()))?;
        Ok(sandbox
            .files
            .iter()
            .map(|(path, content)| {
                (path.clone(), FileMeta { size_bytes: content.len() as u64 })
            })
            .collect())
    }

    async fn read_file(
        &self,
        sandbox_id: &SandboxId,
        path: &str,
    ) -> Result<String, ProviderError> {
        let inner = self.inner.lock();
        let sandbox = inner
            .sandboxes
            .get(sandbox_id)
            .ok_or_else(|| ProviderError::SandboxNotFound(sandbox_id.clone()))?;
        sandbox.files.get(path).cloned().ok_or_else(|| ProviderError::FileNotFound {
            sandbox_id: sandbox_id.clone(),
            path: path.to_string(),
        })
    }

    async fn write_file(
        &self,
        sandbox_id: &SandboxId,
        path: &str,
        content: &str,
    ) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        let sandbox = inner
            .sandboxes
            .get_mut(sandbox_id)
            .ok_or_else(|| ProviderError::SandboxNotFound(sandbox_id.clone()))?;
        sandbox.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn execute_command(
        &self,
        sandbox_id: &SandboxId,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, ProviderError> {
        let mut inner = self.inner.lock();
        if !inner.sandboxes.contains_key(sandbox_id) {
            return Err(ProviderError::SandboxNotFound(sandbox_id.clone()));
        }
        inner.commands_run.push((sandbox_id.clone(), command.to_string()));

        if inner.timeout_commands.contains(command) {
            return Err(ProviderError::CommandTimeout(timeout));
        }
        Ok(inner.scripted_commands.get(command).cloned().unwrap_or(ExecResult {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }))
    }

    async fn start_dev_server(
        &self,
        sandbox_id: &SandboxId,
        _project_id: &ProjectId,
        port: u16,
    ) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        if !inner.sandboxes.contains_key(sandbox_id) {
            return Err(ProviderError::SandboxNotFound(sandbox_id.clone()));
        }
        inner.dev_servers.push((sandbox_id.clone(), port));
        Ok(())
    }

    async fn create_filesystem_snapshot(
        &self,
        sandbox_id: &SandboxId,
        _fragment_id: &FragmentId,
        _project_id: &ProjectId,
    ) -> Result<SnapshotImageId, ProviderError> {
        let mut inner = self.inner.lock();
        if inner.fail_snapshot_capture {
            return Err(ProviderError::Runtime("snapshot capture unavailable".into()));
        }
        let files = inner
            .sandboxes
            .get(sandbox_id)
            .map(|s| s.files.clone())
            .ok_or_else(|| ProviderError::SandboxNotFound(sandbox_id.clone()))?;

        inner.next_snapshot += 1;
        let image = SnapshotImageId::new(format!("img-{}", inner.next_snapshot));
        inner.snapshots.insert(image.clone(), files);
        Ok(image)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
