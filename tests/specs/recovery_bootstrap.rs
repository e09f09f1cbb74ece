// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end template-bootstrap recovery: a project with one fragment, no
//! snapshot, and no sandbox is rebuilt from the fallback template.

use crate::prelude::*;

#[tokio::test]
async fn bootstrap_recovery_from_readme_only_fragment() {
    let harness = Harness::new().await;

    // One fragment whose files give template inference nothing to match
    let fragment = harness.stage(&[("README.md", "# my project")]).await;

    // Health: fragments exist but no sandbox → broken (missing-sandbox),
    // so recovery must run the full bootstrap path.
    let outcome = harness.recover().await;
    assert!(outcome.recovered);
    let sandbox_id = outcome.sandbox_id.expect("recovery must yield a sandbox");

    // The sandbox was bootstrapped from the fallback template's tree
    let listing = harness.provider.list_files(&sandbox_id).await.unwrap();
    assert!(listing.contains_key("package.json"));
    assert!(listing.contains_key("vite.config.ts"));
    assert!(listing.contains_key("src/main.tsx"));

    // A snapshot was captured onto the fragment for future fast recovery
    let fragment = harness.store.get_fragment(&fragment.id).await.unwrap().unwrap();
    assert!(fragment.has_snapshot());

    // Project state published: active fragment, sandbox, READY
    let project = harness.project().await;
    assert_eq!(project.active_fragment_id, Some(fragment.id.clone()));
    assert_eq!(project.sandbox_id, Some(sandbox_id.clone()));
    assert_eq!(project.build_status, BuildStatus::Ready);
    assert!(project.build_error.is_none());

    // Verification re-listed files and found the template's critical set,
    // so a second recover is a no-op returning the same sandbox.
    let second = harness.recover().await;
    assert!(!second.recovered);
    assert_eq!(second.sandbox_id, Some(sandbox_id));
}

#[tokio::test]
async fn next_recovery_restores_from_the_captured_snapshot() {
    let harness = Harness::new().await;
    harness.stage(&[("README.md", "# my project")]).await;

    let first = harness.recover().await;
    let first_sandbox = first.sandbox_id.unwrap();

    // Lose the sandbox; the fragment still carries the captured snapshot
    harness.provider.fail_list_files(&first_sandbox);
    let second = harness.recover().await;

    assert!(second.recovered);
    let second_sandbox = second.sandbox_id.unwrap();
    assert_ne!(second_sandbox, first_sandbox);

    // Restored, not re-bootstrapped: no second dev-server start
    assert_eq!(harness.provider.dev_servers_started().len(), 1);
}
