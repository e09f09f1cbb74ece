// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Working-fragment versioning protocol.
//!
//! Writes route on the active fragment's status: a `Working` fragment takes
//! file updates in place; a `Finalized` fragment is immutable, so edits fork
//! a new working fragment and move the active pointer onto it. The store is
//! re-read on every call rather than trusting caller-held state.

use crate::{FragmentStore, ProjectStore, StoreError};
use drydock_core::{FileMap, Fragment, FragmentStatus, ProjectId, WORKING_TITLE};
use tracing::debug;

/// Stage a full file tree onto the project's working fragment.
///
/// Updates the active fragment in place while it is `Working`; forks a new
/// working fragment (and makes it active) when the active fragment is
/// finalized or missing. Returns the fragment that now holds the files.
pub async fn stage_working_files<S>(
    store: &S,
    project_id: &ProjectId,
    files: FileMap,
    now_ms: u64,
) -> Result<Fragment, StoreError>
where
    S: FragmentStore + ProjectStore,
{
    let active = store.find_active_fragment(project_id).await?;

    if let Some(fragment) = active {
        if fragment.status.is_working() {
            debug!(project_id = %project_id, fragment_id = %fragment.id, "updating working fragment in place");
            return store.update_fragment_files(&fragment.id, files, now_ms).await;
        }
        debug!(
            project_id = %project_id,
            finalized = %fragment.id,
            "active fragment is finalized, forking new working fragment"
        );
    }

    let fragment = store
        .create_fragment(project_id, WORKING_TITLE, FragmentStatus::Working, files, now_ms)
        .await?;
    store.set_project_active_fragment(project_id, &fragment.id).await?;
    Ok(fragment)
}

/// Finalize the project's active working fragment under a descriptive title.
///
/// After this call the fragment is immutable; the next
/// [`stage_working_files`] will fork. Errors if the project has no active
/// fragment or the active fragment is already finalized.
pub async fn finalize_active_fragment<S>(
    store: &S,
    project_id: &ProjectId,
    title: &str,
    now_ms: u64,
) -> Result<Fragment, StoreError>
where
    S: FragmentStore + ProjectStore,
{
    let active = store
        .find_active_fragment(project_id)
        .await?
        .ok_or_else(|| StoreError::NoActiveFragment(project_id.clone()))?;

    store.finalize_fragment(&active.id, title, now_ms).await
}

#[cfg(test)]
#[path = "versioning_tests.rs"]
mod tests;
