// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prebuilt-snapshot registry.
//!
//! Some templates have a prebuilt filesystem snapshot baked per deployment
//! environment, so a fresh sandbox can skip the npm-install/build cold
//! start. This is a static lookup, not a provider round-trip; the table is
//! updated when template images are published.

use serde::{Deserialize, Serialize};

/// Deployment environment the registry is keyed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Dev,
    Main,
}

drydock_core::simple_display! {
    Environment {
        Dev => "dev",
        Main => "main",
    }
}

impl Environment {
    /// Parse an environment name; anything other than `main` is dev.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "main" | "prod" | "production" => Environment::Main,
            _ => Environment::Dev,
        }
    }
}

/// Templates with published prebuilt snapshots, per environment.
///
/// `main` lags `dev`: images are promoted only after they have baked in dev.
const PREBUILT: &[(&str, &[Environment])] = &[
    ("vite-react", &[Environment::Dev, Environment::Main]),
    ("habit-tracker", &[Environment::Dev, Environment::Main]),
    ("landing-page", &[Environment::Dev, Environment::Main]),
    ("dashboard", &[Environment::Dev]),
    ("ecommerce-store", &[Environment::Dev]),
];

/// Static registry of prebuilt template snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotRegistry;

impl SnapshotRegistry {
    /// Whether a prebuilt snapshot is registered for `(template, environment)`.
    pub fn has_snapshot(&self, template: &str, environment: Environment) -> bool {
        PREBUILT
            .iter()
            .any(|(name, envs)| *name == template && envs.contains(&environment))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
