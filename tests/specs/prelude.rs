// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for integration specs.

pub use drydock_core::test_support::{files, healthy_tree};
pub use drydock_core::{
    BuildStatus, Clock, FakeClock, Fragment, FragmentId, FragmentStatus, Project, ProjectId,
    ProviderTag, SandboxId,
};
pub use drydock_engine::{
    assert_sandbox_healthy, new_handle_cache, GuardError, RecoverOptions, Recovery,
    RecoveryOutcome, SandboxHandleCache, TemplateResolver, TemplateSource,
};
pub use drydock_provider::{
    CreateSandboxOptions, Environment, FakeSandboxProvider, SandboxProvider, SnapshotRegistry,
};
pub use drydock_store::{
    finalize_active_fragment, stage_working_files, FragmentStore, MemoryStore, ProjectStore,
};

/// One project's worth of store + provider + clock wiring.
pub struct Harness {
    pub store: MemoryStore,
    pub provider: FakeSandboxProvider,
    pub clock: FakeClock,
    pub cache: SandboxHandleCache,
    pub project_id: ProjectId,
}

impl Harness {
    /// A harness with the fallback template registered and one empty project.
    pub async fn new() -> Self {
        let provider = FakeSandboxProvider::new();
        provider.register_template("vite-react", healthy_tree());

        let store = MemoryStore::new();
        let project_id = ProjectId::from_string("prj-spec");
        store.put_project(Project::new(project_id.clone(), 1_000)).await.unwrap();

        Self {
            store,
            provider,
            clock: FakeClock::at_epoch_ms(100_000),
            cache: new_handle_cache(),
            project_id,
        }
    }

    pub fn recovery(&self) -> Recovery<'_, MemoryStore, FakeSandboxProvider, FakeClock> {
        Recovery::new(&self.store, &self.provider, self.clock.clone(), Environment::Dev)
    }

    pub async fn recover(&self) -> RecoveryOutcome {
        self.recovery().recover(&self.project_id, RecoverOptions::default()).await.unwrap()
    }

    pub async fn project(&self) -> Project {
        self.store.get_project(&self.project_id).await.unwrap().unwrap()
    }

    pub async fn guard(&self) -> Result<drydock_provider::SandboxHandle, GuardError> {
        assert_sandbox_healthy(
            &self.store,
            &self.provider,
            &self.clock,
            &self.cache,
            &self.project_id,
        )
        .await
    }

    /// Stage files through the versioning protocol, stamping store time.
    pub async fn stage(&self, entries: &[(&str, &str)]) -> Fragment {
        stage_working_files(&self.store, &self.project_id, files(entries), self.clock.epoch_ms())
            .await
            .unwrap()
    }
}
