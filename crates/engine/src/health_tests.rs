// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drydock_core::test_support::{files, healthy_tree, project, working_fragment};
use drydock_core::{FileMap, ProviderTag};
use drydock_provider::{CreateSandboxOptions, FakeSandboxProvider};
use drydock_store::MemoryStore;

struct Fixture {
    store: MemoryStore,
    provider: FakeSandboxProvider,
}

impl Fixture {
    fn new() -> Self {
        Self { store: MemoryStore::new(), provider: FakeSandboxProvider::new() }
    }

    async fn add_project(&self, id: &str) {
        self.store.put_project(project(id)).await.unwrap();
    }

    /// Provision a sandbox with the given tree and point the project at it.
    async fn add_sandbox(&self, project_id: &str, tree: FileMap) -> SandboxId {
        self.provider.register_template("fixture", tree);
        let handle = self
            .provider
            .create_sandbox(
                &ProjectId::from_string(project_id),
                &drydock_core::FragmentId::from_string("frg-seed"),
                "fixture",
                CreateSandboxOptions::default(),
            )
            .await
            .unwrap();

        self.store
            .set_project_sandbox(
                &ProjectId::from_string(project_id),
                Some(handle.sandbox_id.clone()),
                Some(ProviderTag::canonical()),
            )
            .await
            .unwrap();
        handle.sandbox_id
    }

    async fn check(&self, project_id: &str) -> HealthReport {
        HealthChecker::new(&self.store, &self.provider)
            .check(&ProjectId::from_string(project_id))
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn missing_project_is_an_error() {
    let fixture = Fixture::new();
    let err = HealthChecker::new(&fixture.store, &fixture.provider)
        .check(&ProjectId::from_string("prj-ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ProjectNotFound(_)));
}

#[tokio::test]
async fn new_project_without_fragments_is_not_broken() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;

    let report = fixture.check("prj-a").await;
    assert!(!report.broken);
    assert_eq!(report.reason, HealthReason::NewProjectNoGeneration);
    assert!(report.sandbox_id.is_none());
}

#[tokio::test]
async fn missing_sandbox_with_fragments_is_broken() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    fixture.store.insert_fragment(working_fragment("frg-1", "prj-a", &[("a.txt", "1")]));

    let report = fixture.check("prj-a").await;
    assert!(report.broken);
    assert_eq!(report.reason, HealthReason::MissingSandbox);
}

#[tokio::test]
async fn foreign_provider_is_exempt() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    let sandbox_id = fixture.add_sandbox("prj-a", files(&[])).await;

    fixture
        .store
        .set_project_sandbox(
            &ProjectId::from_string("prj-a"),
            Some(sandbox_id.clone()),
            Some(ProviderTag::new("e2b")),
        )
        .await
        .unwrap();

    let report = fixture.check("prj-a").await;
    assert!(!report.broken);
    assert_eq!(report.reason, HealthReason::ForeignProvider);
    assert_eq!(report.sandbox_id, Some(sandbox_id));
}

#[tokio::test]
async fn complete_tree_is_healthy() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    let sandbox_id = fixture.add_sandbox("prj-a", healthy_tree()).await;

    let report = fixture.check("prj-a").await;
    assert!(!report.broken);
    assert_eq!(report.reason, HealthReason::Healthy);
    assert_eq!(report.sandbox_id, Some(sandbox_id));
    assert!(report.missing_files.is_empty());
}

#[tokio::test]
async fn each_missing_required_file_is_reported() {
    let cases = [
        ("package.json", MANIFEST_LABEL),
        ("vite.config.ts", BUILD_CONFIG_LABEL),
        ("src/main.tsx", ENTRY_POINT_LABEL),
    ];

    for (removed, expected_label) in cases {
        let fixture = Fixture::new();
        fixture.add_project("prj-a").await;
        let mut tree = healthy_tree();
        tree.shift_remove(removed);
        fixture.add_sandbox("prj-a", tree).await;

        let report = fixture.check("prj-a").await;
        assert!(report.broken, "removing {removed} should break health");
        assert_eq!(report.reason, HealthReason::MissingCriticalFiles);
        assert!(
            report.missing_files.iter().any(|label| label == expected_label),
            "removing {removed} should report {expected_label}, got {:?}",
            report.missing_files
        );
    }
}

#[tokio::test]
async fn typescript_sources_require_typecheck_config() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    let mut tree = healthy_tree();
    tree.shift_remove("tsconfig.json");
    fixture.add_sandbox("prj-a", tree).await;

    let report = fixture.check("prj-a").await;
    assert!(report.broken);
    assert_eq!(report.missing_files, vec![TYPECHECK_CONFIG_LABEL.to_string()]);
}

#[tokio::test]
async fn javascript_only_sources_do_not_require_typecheck_config() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    fixture
        .add_sandbox(
            "prj-a",
            files(&[
                ("package.json", "{}"),
                ("vite.config.js", "export default {}"),
                ("src/main.jsx", "render()"),
                ("src/App.jsx", "export default () => null"),
            ]),
        )
        .await;

    let report = fixture.check("prj-a").await;
    assert!(!report.broken);
    assert_eq!(report.reason, HealthReason::Healthy);
}

#[tokio::test]
async fn jsconfig_satisfies_the_typecheck_pattern() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    let mut tree = healthy_tree();
    tree.shift_remove("tsconfig.json");
    tree.insert("jsconfig.json".into(), "{}".into());
    fixture.add_sandbox("prj-a", tree).await;

    let report = fixture.check("prj-a").await;
    assert!(!report.broken);
}

#[tokio::test]
async fn list_files_failure_is_broken_not_an_error() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    let sandbox_id = fixture.add_sandbox("prj-a", healthy_tree()).await;
    fixture.provider.fail_list_files(&sandbox_id);

    let report = fixture.check("prj-a").await;
    assert!(report.broken);
    assert_eq!(report.reason, HealthReason::ListFilesFailed);
}

#[tokio::test]
async fn sandbox_lost_by_provider_is_broken() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    let sandbox_id = fixture.add_sandbox("prj-a", healthy_tree()).await;
    fixture.provider.delete_sandbox(&sandbox_id, &ProjectId::from_string("prj-a")).await.unwrap();

    let report = fixture.check("prj-a").await;
    assert!(report.broken);
    assert_eq!(report.reason, HealthReason::ListFilesFailed);
}

#[tokio::test]
async fn alternative_build_configs_are_recognized() {
    for config in ["webpack.config.js", "next.config.mjs", "vite.config.mts"] {
        let fixture = Fixture::new();
        fixture.add_project("prj-a").await;
        fixture
            .add_sandbox(
                "prj-a",
                files(&[
                    ("package.json", "{}"),
                    (config, "module.exports = {}"),
                    ("src/index.js", "boot()"),
                ]),
            )
            .await;

        let report = fixture.check("prj-a").await;
        assert!(!report.broken, "config {config} should satisfy the build-config pattern");
    }
}

#[yare::parameterized(
    vite_ts      = { "vite.config.ts", true },
    vite_mjs     = { "vite.config.mjs", true },
    webpack      = { "webpack.config.js", true },
    next         = { "next.config.mjs", true },
    vite_json    = { "vite.config.json", false },
    nested       = { "config/vite.config.ts", false },
    unrelated    = { "rollup.config.js", false },
)]
fn build_config_pattern(path: &str, expected: bool) {
    assert_eq!(is_build_config(path), expected);
}

#[yare::parameterized(
    main_tsx    = { "src/main.tsx", true },
    index_js    = { "src/index.js", true },
    main_mts    = { "src/main.mts", true },
    app         = { "src/App.tsx", false },
    root_main   = { "main.tsx", false },
    css         = { "src/main.css", false },
)]
fn entry_point_pattern(path: &str, expected: bool) {
    assert_eq!(is_entry_point(path), expected);
}

#[yare::parameterized(
    tsconfig      = { "tsconfig.json", true },
    tsconfig_app  = { "tsconfig.app.json", true },
    jsconfig      = { "jsconfig.json", true },
    package       = { "package.json", false },
    nested        = { "src/tsconfig.json", false },
)]
fn typecheck_config_pattern(path: &str, expected: bool) {
    assert_eq!(is_typecheck_config(path), expected);
}

#[tokio::test]
async fn health_check_never_mutates_project_state() {
    let fixture = Fixture::new();
    fixture.add_project("prj-a").await;
    fixture.store.insert_fragment(working_fragment("frg-1", "prj-a", &[("a.txt", "1")]));
    let before = fixture.store.get_project(&ProjectId::from_string("prj-a")).await.unwrap();

    fixture.check("prj-a").await;

    let after = fixture.store.get_project(&ProjectId::from_string("prj-a")).await.unwrap();
    assert_eq!(before, after);
}
