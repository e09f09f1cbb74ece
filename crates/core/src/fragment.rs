// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fragment entity: a named, complete snapshot of a project's file tree.
//!
//! Exactly one fragment per project is "active" (referenced by
//! `Project::active_fragment_id`). A `Working` fragment accepts in-place file
//! updates; a `Finalized` fragment is immutable — further edits fork a new
//! working fragment. The status is a real enum, not a title convention, but
//! working fragments still default to the "Work in progress" title for
//! display.

use crate::id::SnapshotImageId;
use crate::project::ProjectId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a fragment.
    pub struct FragmentId("frg-");
}

/// Default title for fragments still open for edits.
pub const WORKING_TITLE: &str = "Work in progress";

/// Marker stored in place of raw bytes for binary assets.
///
/// Convention of the upstream write path; the recovery core only needs to
/// recognize it when replaying file maps.
pub const BINARY_PLACEHOLDER: &str = "<binary-asset>";

/// True if the given file content is the binary-asset placeholder.
pub fn is_binary_placeholder(content: &str) -> bool {
    content == BINARY_PLACEHOLDER
}

/// Complete file tree at one revision: repo-relative path → full UTF-8
/// content. Not a diff.
pub type FileMap = IndexMap<String, String>;

/// Whether a fragment is still open for in-place edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentStatus {
    /// Open for in-place file updates
    #[default]
    Working,
    /// Immutable; edits fork a new working fragment
    Finalized,
}

impl FragmentStatus {
    pub fn is_working(&self) -> bool {
        matches!(self, FragmentStatus::Working)
    }
}

crate::simple_display! {
    FragmentStatus {
        Working => "working",
        Finalized => "finalized",
    }
}

/// A named, timestamped snapshot of a project's file tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: FragmentId,
    pub project_id: ProjectId,
    pub title: String,
    pub status: FragmentStatus,
    pub files: FileMap,
    /// Set once a provider filesystem snapshot has been captured for this
    /// fragment; enables fast sandbox restoration
    pub snapshot_image_id: Option<SnapshotImageId>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Fragment {
    /// A new working fragment carrying the given files.
    pub fn working(project_id: ProjectId, files: FileMap, now_ms: u64) -> Self {
        Self {
            id: FragmentId::new(),
            project_id,
            title: WORKING_TITLE.to_string(),
            status: FragmentStatus::Working,
            files,
            snapshot_image_id: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot_image_id.is_some()
    }
}

#[cfg(test)]
#[path = "fragment_tests.rs"]
mod tests;
