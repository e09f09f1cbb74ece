// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template inference.
//!
//! A project that loses its sandbox needs a base template to rebuild from.
//! The project row doesn't record one, so it is inferred from the file trees
//! of the project's fragments: filenames, `package.json` text, and README
//! content are matched against an ordered keyword table. No match falls back
//! to the default scaffold.

use drydock_core::{Fragment, ProjectId};
use drydock_provider::{Environment, SnapshotRegistry};
use drydock_store::{FragmentStore, StoreError};
use serde_json::Value;
use tracing::debug;

/// Template used when no keyword inference succeeds.
pub const FALLBACK_TEMPLATE: &str = "vite-react";

/// Ordered keyword table: first template with any matching keyword wins.
const KEYWORDS: &[(&str, &[&str])] = &[
    ("habit-tracker", &["habit", "tracker", "streak", "daily goal"]),
    ("ecommerce-store", &["shop", "storefront", "cart", "checkout", "stripe"]),
    ("dashboard", &["dashboard", "analytics", "chart", "metrics"]),
    ("landing-page", &["landing", "waitlist", "marketing site", "hero section"]),
];

/// Where the winning template inference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// Matched on the project's designated active fragment
    Fragment,
    /// Matched on another (most recent) fragment
    Heuristic,
    /// No candidate matched; fixed fallback template
    Fallback,
}

drydock_core::simple_display! {
    TemplateSource {
        Fragment => "fragment",
        Heuristic => "heuristic",
        Fallback => "fallback",
    }
}

/// Outcome of template resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateResolution {
    pub template: String,
    pub source: TemplateSource,
    /// Whether a prebuilt filesystem snapshot is registered for
    /// `(template, environment)`
    pub has_snapshot: bool,
}

/// Infers a project's base template from its fragments.
pub struct TemplateResolver<'a, S> {
    store: &'a S,
    registry: SnapshotRegistry,
    environment: Environment,
}

impl<'a, S: FragmentStore> TemplateResolver<'a, S> {
    pub fn new(store: &'a S, registry: SnapshotRegistry, environment: Environment) -> Self {
        Self { store, registry, environment }
    }

    /// Resolve the template for a project.
    ///
    /// Candidates are the active fragment first, then the most recently
    /// created fragment, deduplicated. The first candidate whose haystack
    /// matches a keyword wins; `source` reports whether that was the active
    /// fragment or a heuristic fallback.
    pub async fn resolve(
        &self,
        project_id: &ProjectId,
    ) -> Result<TemplateResolution, StoreError> {
        let active = self.store.find_active_fragment(project_id).await?;
        let latest = self.store.find_latest_fragment(project_id).await?;

        let mut candidates: Vec<(Fragment, TemplateSource)> = Vec::new();
        if let Some(fragment) = active {
            candidates.push((fragment, TemplateSource::Fragment));
        }
        if let Some(fragment) = latest {
            if !candidates.iter().any(|(f, _)| f.id == fragment.id) {
                candidates.push((fragment, TemplateSource::Heuristic));
            }
        }

        for (fragment, source) in &candidates {
            if let Some(template) = infer_from_fragment(fragment) {
                debug!(
                    project_id = %project_id,
                    fragment_id = %fragment.id,
                    template,
                    source = %source,
                    "template inferred from fragment"
                );
                return Ok(self.resolution(template.to_string(), *source));
            }
        }

        debug!(project_id = %project_id, template = FALLBACK_TEMPLATE, "no keyword match, using fallback template");
        Ok(self.resolution(FALLBACK_TEMPLATE.to_string(), TemplateSource::Fallback))
    }

    fn resolution(&self, template: String, source: TemplateSource) -> TemplateResolution {
        let has_snapshot = self.registry.has_snapshot(&template, self.environment);
        TemplateResolution { template, source, has_snapshot }
    }
}

/// Match one fragment's haystack against the keyword table.
fn infer_from_fragment(fragment: &Fragment) -> Option<&'static str> {
    let haystack = build_haystack(fragment);
    if haystack.is_empty() {
        return None;
    }
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(template, _)| *template)
}

/// Lowercased concatenation of filenames, package.json-derived text, and
/// README content.
fn build_haystack(fragment: &Fragment) -> String {
    let mut haystack = String::new();

    for path in fragment.files.keys() {
        haystack.push_str(path);
        haystack.push('\n');
    }

    if let Some(package_json) = fragment.files.get("package.json") {
        haystack.push_str(&package_text(package_json));
    }

    if let Some(readme) = fragment.files.get("README.md") {
        haystack.push_str(readme);
        haystack.push('\n');
    }

    haystack.to_lowercase()
}

/// Extract name, description, and dependency names from package.json.
/// Invalid JSON contributes nothing — skipped, not fatal.
fn package_text(content: &str) -> String {
    let Ok(package) = serde_json::from_str::<Value>(content) else {
        debug!("unparsable package.json in fragment, skipping for inference");
        return String::new();
    };

    let mut text = String::new();
    for field in ["name", "description"] {
        if let Some(value) = package.get(field).and_then(Value::as_str) {
            text.push_str(value);
            text.push('\n');
        }
    }
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = package.get(section).and_then(Value::as_object) {
            for name in deps.keys() {
                text.push_str(name);
                text.push('\n');
            }
        }
    }
    text
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
