// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Working-fragment versioning interacting with recovery.

use crate::prelude::*;

#[tokio::test]
async fn finalized_history_survives_recovery_of_later_edits() {
    let harness = Harness::new().await;

    // v1: stage, finalize
    let v1 = harness.stage(&[("src/App.tsx", "// v1")]).await;
    harness.clock.advance_ms(1_000);
    finalize_active_fragment(&harness.store, &harness.project_id, "First version", harness.clock.epoch_ms())
        .await
        .unwrap();

    // First recovery bootstraps a sandbox and captures a snapshot on v1
    let first = harness.recover().await;
    assert!(first.recovered);
    let v1 = harness.store.get_fragment(&v1.id).await.unwrap().unwrap();
    assert!(v1.has_snapshot());

    // Later edits fork a new working fragment; v1 stays immutable
    harness.clock.advance_ms(1_000);
    let v2 = harness.stage(&[("src/App.tsx", "// v2")]).await;
    assert_ne!(v2.id, v1.id);
    assert_eq!(v2.status, FragmentStatus::Working);

    // Sandbox dies. The working fragment has no snapshot, so the selection
    // ladder falls back to v1's snapshot (created at or before v2).
    let dead = first.sandbox_id.unwrap();
    harness.provider.fail_list_files(&dead);
    let second = harness.recover().await;
    assert!(second.recovered);

    let project = harness.project().await;
    assert_eq!(project.active_fragment_id, Some(v1.id.clone()));

    // v1's file content is untouched by everything above
    let v1 = harness.store.get_fragment(&v1.id).await.unwrap().unwrap();
    assert_eq!(v1.files.get("src/App.tsx").map(String::as_str), Some("// v1"));
    assert_eq!(v1.title, "First version");
}

#[tokio::test]
async fn repeated_staging_keeps_a_single_working_fragment() {
    let harness = Harness::new().await;

    let first = harness.stage(&[("a.txt", "1")]).await;
    harness.clock.advance_ms(500);
    let second = harness.stage(&[("a.txt", "2"), ("b.txt", "3")]).await;

    assert_eq!(first.id, second.id);
    assert_eq!(harness.store.count_fragments(&harness.project_id).await.unwrap(), 1);
    assert_eq!(second.files.len(), 2);
}
