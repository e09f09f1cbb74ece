// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build validation inside a sandbox.
//!
//! Runs the project's build with a bounded timeout. Timeouts and non-zero
//! exits are structured failures the caller can report, never process-fatal
//! errors.

use drydock_core::SandboxId;
use drydock_provider::{ProviderError, SandboxProvider};
use std::time::Duration;
use tracing::{debug, warn};

/// Command used to validate a project's build.
pub const BUILD_COMMAND: &str = "npm run build";

/// Default build timeout.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of a build validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildValidation {
    pub passed: bool,
    /// Failure detail (stderr tail, timeout note, or transport error)
    pub detail: Option<String>,
}

/// Run the build command in the sandbox and report whether it passed.
pub async fn validate_build<P: SandboxProvider>(
    provider: &P,
    sandbox_id: &SandboxId,
    timeout: Duration,
) -> BuildValidation {
    match provider.execute_command(sandbox_id, BUILD_COMMAND, timeout).await {
        Ok(result) if result.success() => {
            debug!(sandbox_id = %sandbox_id, "build validation passed");
            BuildValidation { passed: true, detail: None }
        }
        Ok(result) => {
            let detail = tail(&result.stderr, 800);
            debug!(sandbox_id = %sandbox_id, exit_code = result.exit_code, "build validation failed");
            BuildValidation {
                passed: false,
                detail: Some(format!("build exited with code {}: {detail}", result.exit_code)),
            }
        }
        Err(ProviderError::CommandTimeout(duration)) => {
            warn!(sandbox_id = %sandbox_id, ?duration, "build validation timed out");
            BuildValidation {
                passed: false,
                detail: Some(format!("build timed out after {duration:?}")),
            }
        }
        Err(error) => {
            warn!(sandbox_id = %sandbox_id, error = %error, "build validation could not run");
            BuildValidation { passed: false, detail: Some(error.to_string()) }
        }
    }
}

/// Last `n` bytes of command output, on a char boundary.
fn tail(output: &str, n: usize) -> &str {
    if output.len() <= n {
        return output;
    }
    let mut start = output.len() - n;
    while !output.is_char_boundary(start) {
        start += 1;
    }
    &output[start..]
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
