// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project entity and build state.
//!
//! A project references its live sandbox (if any) and the fragment a rebuilt
//! sandbox should be restored from. Projects are never hard-deleted by this
//! core; deletion is an external operation.

use crate::fragment::FragmentId;
use crate::id::SandboxId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

crate::define_id! {
    /// Unique identifier for a project.
    pub struct ProjectId("prj-");
}

/// Tag naming the backend that created a project's sandbox.
///
/// One canonical tag is managed by this core; sandboxes created by any other
/// backend are foreign and exempt from health/recovery logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderTag(pub SmolStr);

impl ProviderTag {
    /// The provider this core manages sandboxes for.
    pub const CANONICAL: &'static str = "modal";

    pub fn canonical() -> Self {
        Self(SmolStr::new_static(Self::CANONICAL))
    }

    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self(tag.into())
    }

    pub fn is_canonical(&self) -> bool {
        self.0 == Self::CANONICAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Last known build outcome for a project, mutated by the recovery
/// orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// No build attempted yet
    #[default]
    Pending,
    /// A build is in flight
    Building,
    /// Last build succeeded; sandbox is expected to serve
    Ready,
    /// Last build failed (see `build_error`)
    Failed,
}

crate::simple_display! {
    BuildStatus {
        Pending => "pending",
        Building => "building",
        Ready => "ready",
        Failed => "failed",
    }
}

/// Where an imported project's code originally came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSource {
    Github,
    ZipUpload,
}

crate::simple_display! {
    ImportSource {
        Github => "github",
        ZipUpload => "zip_upload",
    }
}

/// Provenance record for projects seeded from an external code import.
///
/// Affects template inference and file-language enforcement upstream; the
/// recovery core only threads it through to sandbox creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeImport {
    pub source: ImportSource,
    /// Repository slug for github imports (e.g. `owner/name`)
    pub repo: Option<String>,
    /// Dominant source language detected at import time
    pub language: Option<String>,
}

/// A user project and the sandbox/fragment state the recovery core manages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Currently assigned sandbox; `None` means no sandbox provisioned yet
    pub sandbox_id: Option<SandboxId>,
    /// Backend that created `sandbox_id`; unset until first provisioning
    pub sandbox_provider: Option<ProviderTag>,
    /// The fragment a rebuilt sandbox should be restored from
    pub active_fragment_id: Option<FragmentId>,
    pub build_status: BuildStatus,
    pub build_error: Option<String>,
    pub build_status_updated_at_ms: Option<u64>,
    /// Freeform origin label when the project was imported (legacy field;
    /// `code_import` is the structured form)
    pub imported_from: Option<String>,
    pub code_import: Option<CodeImport>,
    pub created_at_ms: u64,
}

impl Project {
    /// A fresh project with no sandbox and no fragments.
    pub fn new(id: ProjectId, created_at_ms: u64) -> Self {
        Self {
            id,
            sandbox_id: None,
            sandbox_provider: None,
            active_fragment_id: None,
            build_status: BuildStatus::default(),
            build_error: None,
            build_status_updated_at_ms: None,
            imported_from: None,
            code_import: None,
            created_at_ms,
        }
    }

    /// True when the assigned sandbox was created by a non-canonical backend.
    pub fn has_foreign_sandbox(&self) -> bool {
        self.sandbox_provider.as_ref().is_some_and(|tag| !tag.is_canonical())
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
