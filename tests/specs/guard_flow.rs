// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guard behavior around a recovery cycle.

use crate::prelude::*;

#[tokio::test]
async fn guard_rejects_broken_project_then_serves_recovered_handle() {
    let harness = Harness::new().await;
    harness.stage(&[("README.md", "# app")]).await;

    // Broken (no sandbox): generic message only
    let err = harness.guard().await.unwrap_err();
    assert!(matches!(err, GuardError::Unavailable { .. }));
    assert_eq!(
        err.to_string(),
        "Sandbox unavailable; recovery is in progress. Please retry shortly."
    );

    // Recover, then the guard hands out the live handle
    let outcome = harness.recover().await;
    let handle = harness.guard().await.unwrap();
    assert_eq!(Some(handle.sandbox_id), outcome.sandbox_id);
    assert!(handle.url.starts_with("https://"));
}

#[tokio::test]
async fn count_fragments_gate_spares_new_projects() {
    let harness = Harness::new().await;

    // Brand-new project: unavailable for tools, but recovery is a no-op
    // rather than an error (nothing to rebuild, nothing wrong).
    let err = harness.guard().await.unwrap_err();
    assert!(matches!(err, GuardError::Unavailable { .. }));

    let outcome = harness.recover().await;
    assert!(!outcome.recovered);
    assert!(outcome.sandbox_id.is_none());
}
