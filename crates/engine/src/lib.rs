// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drydock-engine: the sandbox health and recovery state machine.
//!
//! Everything here runs inside a caller's invocation (an agent turn) — there
//! is no background scheduler. The orchestrator consumes the store and
//! provider crates sequentially; concurrent recoveries for the same project
//! are serialized upstream and not defended against here.

pub mod env;
pub mod guard;
pub mod health;
pub mod probe;
pub mod recovery;
pub mod retry;
pub mod template;
pub mod validate;

pub use guard::{
    assert_sandbox_healthy, new_handle_cache, GuardError, SandboxHandleCache,
    UNAVAILABLE_MESSAGE,
};
pub use health::{HealthChecker, HealthReason, HealthReport};
pub use probe::{PreviewProber, ProbeError, ProbeOptions, ProbeReport};
pub use recovery::{
    RecoverOptions, Recovery, RecoveryError, RecoveryOutcome, SnapshotSource,
};
pub use retry::RetryPolicy;
pub use template::{TemplateResolution, TemplateResolver, TemplateSource, FALLBACK_TEMPLATE};
pub use validate::{validate_build, BuildValidation};
