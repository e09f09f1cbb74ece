// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyword-driven template inference feeding recovery.

use crate::prelude::*;

#[tokio::test]
async fn package_name_selects_tracker_template_from_active_fragment() {
    let harness = Harness::new().await;
    harness
        .stage(&[(
            "package.json",
            r#"{"name":"habit-tracker","description":"track your streaks"}"#,
        )])
        .await;

    let resolution = TemplateResolver::new(&harness.store, SnapshotRegistry, Environment::Dev)
        .resolve(&harness.project_id)
        .await
        .unwrap();

    assert_eq!(resolution.template, "habit-tracker");
    assert_eq!(resolution.source, TemplateSource::Fragment);
    assert!(resolution.has_snapshot);
}

#[tokio::test]
async fn recovery_bootstraps_from_the_inferred_template() {
    let harness = Harness::new().await;
    harness.provider.register_template(
        "habit-tracker",
        files(&[
            ("package.json", r#"{"name":"habit-tracker"}"#),
            ("vite.config.ts", "export default {}"),
            ("tsconfig.json", "{}"),
            ("src/main.tsx", "boot()"),
            ("src/Habits.tsx", "export default () => null"),
        ]),
    );
    harness.stage(&[("package.json", r#"{"name":"habit-tracker"}"#)]).await;

    let outcome = harness.recover().await;
    assert!(outcome.recovered);

    // The sandbox tree is the tracker template's, not the fallback's
    let listing = harness.provider.list_files(&outcome.sandbox_id.unwrap()).await.unwrap();
    assert!(listing.contains_key("src/Habits.tsx"));
}
