// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store implementation.
//!
//! Reference implementation of [`ProjectStore`] and [`FragmentStore`] over
//! mutex-guarded maps. Serves as the test double for the engine crates and
//! as the backing store for local tooling; production deployments swap in a
//! hosted document store behind the same traits.

use crate::{FragmentStore, ProjectStore, StoreError};
use async_trait::async_trait;
use drydock_core::{
    FileMap, Fragment, FragmentId, FragmentStatus, Project, ProjectId, ProviderTag,
    SandboxId, SnapshotImageId,
};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct Inner {
    projects: HashMap<ProjectId, Project>,
    fragments: HashMap<FragmentId, Fragment>,
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fragment directly, bypassing `create_fragment` id/timestamp
    /// assignment. Test setup helper.
    pub fn insert_fragment(&self, fragment: Fragment) {
        self.inner.lock().fragments.insert(fragment.id.clone(), fragment);
    }

    fn latest_by<F>(&self, project_id: &ProjectId, key: F) -> Option<Fragment>
    where
        F: Fn(&Fragment) -> u64,
    {
        let inner = self.inner.lock();
        inner
            .fragments
            .values()
            .filter(|f| &f.project_id == project_id)
            .max_by_key(|f| (key(f), f.id.0.clone()))
            .cloned()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.inner.lock().projects.get(id).cloned())
    }

    async fn put_project(&self, project: Project) -> Result<(), StoreError> {
        self.inner.lock().projects.insert(project.id.clone(), project);
        Ok(())
    }

    async fn set_project_active_fragment(
        &self,
        project_id: &ProjectId,
        fragment_id: &FragmentId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let project = inner
            .projects
            .get_mut(project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.clone()))?;
        project.active_fragment_id = Some(fragment_id.clone());
        Ok(())
    }

    async fn set_project_sandbox(
        &self,
        project_id: &ProjectId,
        sandbox_id: Option<SandboxId>,
        provider: Option<ProviderTag>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let project = inner
            .projects
            .get_mut(project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.clone()))?;
        project.sandbox_id = sandbox_id;
        project.sandbox_provider = provider;
        Ok(())
    }

    async fn mark_project_recovered(
        &self,
        project_id: &ProjectId,
        fragment_id: &FragmentId,
        sandbox_id: &SandboxId,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let project = inner
            .projects
            .get_mut(project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.clone()))?;
        project.active_fragment_id = Some(fragment_id.clone());
        project.sandbox_id = Some(sandbox_id.clone());
        project.sandbox_provider = Some(ProviderTag::canonical());
        project.build_status = drydock_core::BuildStatus::Ready;
        project.build_error = None;
        project.build_status_updated_at_ms = Some(now_ms);
        Ok(())
    }

    async fn count_fragments(&self, project_id: &ProjectId) -> Result<usize, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.fragments.values().filter(|f| &f.project_id == project_id).count())
    }

    async fn projects_referencing_sandbox(
        &self,
        sandbox_id: &SandboxId,
    ) -> Result<Vec<ProjectId>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .projects
            .values()
            .filter(|p| p.sandbox_id.as_ref() == Some(sandbox_id))
            .map(|p| p.id.clone())
            .collect())
    }
}

#[async_trait]
impl FragmentStore for MemoryStore {
    async fn get_fragment(&self, id: &FragmentId) -> Result<Option<Fragment>, StoreError> {
        Ok(self.inner.lock().fragments.get(id).cloned())
    }

    async fn find_active_fragment(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Fragment>, StoreError> {
        let inner = self.inner.lock();
        let Some(project) = inner.projects.get(project_id) else {
            return Ok(None);
        };
        Ok(project
            .active_fragment_id
            .as_ref()
            .and_then(|id| inner.fragments.get(id))
            .cloned())
    }

    async fn find_latest_fragment(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Fragment>, StoreError> {
        Ok(self.latest_by(project_id, |f| f.created_at_ms))
    }

    async fn find_latest_updated_fragment(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<Fragment>, StoreError> {
        Ok(self.latest_by(project_id, |f| f.updated_at_ms))
    }

    async fn find_latest_fragment_with_snapshot(
        &self,
        project_id: &ProjectId,
        before_or_eq_ms: Option<u64>,
    ) -> Result<Option<Fragment>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .fragments
            .values()
            .filter(|f| &f.project_id == project_id && f.has_snapshot())
            .filter(|f| before_or_eq_ms.is_none_or(|cutoff| f.created_at_ms <= cutoff))
            .max_by_key(|f| (f.created_at_ms, f.id.0.clone()))
            .cloned())
    }

    async fn create_fragment(
        &self,
        project_id: &ProjectId,
        title: &str,
        status: FragmentStatus,
        files: FileMap,
        now_ms: u64,
    ) -> Result<Fragment, StoreError> {
        let mut fragment = Fragment::working(project_id.clone(), files, now_ms);
        fragment.title = title.to_string();
        fragment.status = status;
        self.inner.lock().fragments.insert(fragment.id.clone(), fragment.clone());
        Ok(fragment)
    }

    async fn update_fragment_files(
        &self,
        id: &FragmentId,
        files: FileMap,
        now_ms: u64,
    ) -> Result<Fragment, StoreError> {
        let mut inner = self.inner.lock();
        let fragment = inner
            .fragments
            .get_mut(id)
            .ok_or_else(|| StoreError::FragmentNotFound(id.clone()))?;
        if !fragment.status.is_working() {
            return Err(StoreError::FragmentFinalized(id.clone()));
        }
        fragment.files = files;
        fragment.updated_at_ms = now_ms;
        Ok(fragment.clone())
    }

    async fn finalize_fragment(
        &self,
        id: &FragmentId,
        title: &str,
        now_ms: u64,
    ) -> Result<Fragment, StoreError> {
        let mut inner = self.inner.lock();
        let fragment = inner
            .fragments
            .get_mut(id)
            .ok_or_else(|| StoreError::FragmentNotFound(id.clone()))?;
        if !fragment.status.is_working() {
            return Err(StoreError::FragmentFinalized(id.clone()));
        }
        fragment.status = FragmentStatus::Finalized;
        fragment.title = title.to_string();
        fragment.updated_at_ms = now_ms;
        Ok(fragment.clone())
    }

    async fn set_fragment_snapshot(
        &self,
        id: &FragmentId,
        snapshot: &SnapshotImageId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let fragment = inner
            .fragments
            .get_mut(id)
            .ok_or_else(|| StoreError::FragmentNotFound(id.clone()))?;
        fragment.snapshot_image_id = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
