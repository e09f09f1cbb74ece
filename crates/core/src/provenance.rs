// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized provider/import provenance resolution.
//!
//! The provider tag and import origin can each come from more than one
//! project field. This is the single place that precedence is decided;
//! callers get one normalized value instead of repeating fallback chains.

use crate::project::{ImportSource, Project, ProviderTag};

/// Where an imported project's code came from, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOrigin {
    /// Structured import record (preferred source)
    Import { source: ImportSource, repo: Option<String> },
    /// Legacy freeform origin label
    Legacy(String),
}

/// Normalized provenance for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Effective provider tag; defaults to canonical when unset
    pub provider: ProviderTag,
    /// Import origin, if the project was seeded from external code
    pub imported: Option<ImportOrigin>,
}

impl Provenance {
    pub fn is_imported(&self) -> bool {
        self.imported.is_some()
    }
}

/// Resolve a project's effective provider tag and import origin.
///
/// Precedence:
/// 1. provider: `sandbox_provider` if set, else the canonical tag.
/// 2. import origin: `code_import` (structured) over `imported_from`
///    (legacy label) over none.
pub fn resolve_provenance(project: &Project) -> Provenance {
    let provider =
        project.sandbox_provider.clone().unwrap_or_else(ProviderTag::canonical);

    let imported = match (&project.code_import, &project.imported_from) {
        (Some(import), _) => Some(ImportOrigin::Import {
            source: import.source,
            repo: import.repo.clone(),
        }),
        (None, Some(label)) => Some(ImportOrigin::Legacy(label.clone())),
        (None, None) => None,
    };

    Provenance { provider, imported }
}

#[cfg(test)]
#[path = "provenance_tests.rs"]
mod tests;
