// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::fragment::{FileMap, Fragment, FragmentId, FragmentStatus};
use crate::id::SnapshotImageId;
use crate::project::{Project, ProjectId};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state types.
pub mod strategies {
    use crate::fragment::FragmentStatus;
    use crate::project::BuildStatus;
    use proptest::prelude::*;

    pub fn arb_fragment_status() -> impl Strategy<Value = FragmentStatus> {
        prop_oneof![Just(FragmentStatus::Working), Just(FragmentStatus::Finalized)]
    }

    pub fn arb_build_status() -> impl Strategy<Value = BuildStatus> {
        prop_oneof![
            Just(BuildStatus::Pending),
            Just(BuildStatus::Building),
            Just(BuildStatus::Ready),
            Just(BuildStatus::Failed),
        ]
    }
}

// ── Factory functions ───────────────────────────────────────────────────

/// Build a [`FileMap`] from `(path, content)` pairs.
pub fn files(entries: &[(&str, &str)]) -> FileMap {
    entries.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect()
}

/// A project with a fixed id and creation time.
pub fn project(id: &str) -> Project {
    Project::new(ProjectId::from_string(id), 1_000)
}

/// A working fragment with fixed id/timestamps, no snapshot.
pub fn working_fragment(id: &str, project_id: &str, file_entries: &[(&str, &str)]) -> Fragment {
    let mut fragment = Fragment::working(
        ProjectId::from_string(project_id),
        files(file_entries),
        1_000,
    );
    fragment.id = FragmentId::from_string(id);
    fragment
}

/// A finalized fragment with the given title and optional snapshot image.
pub fn finalized_fragment(
    id: &str,
    project_id: &str,
    title: &str,
    file_entries: &[(&str, &str)],
    snapshot: Option<&str>,
) -> Fragment {
    let mut fragment = working_fragment(id, project_id, file_entries);
    fragment.status = FragmentStatus::Finalized;
    fragment.title = title.to_string();
    fragment.snapshot_image_id = snapshot.map(SnapshotImageId::new);
    fragment
}

/// File set matching a healthy vite/react sandbox tree.
pub fn healthy_tree() -> FileMap {
    files(&[
        ("package.json", r#"{"name":"app","dependencies":{"react":"^18"}}"#),
        ("vite.config.ts", "export default {}"),
        ("tsconfig.json", "{}"),
        ("index.html", "<div id=\"root\"></div>"),
        ("src/main.tsx", "console.log('hi')"),
        ("src/App.tsx", "export default () => null"),
    ])
}
