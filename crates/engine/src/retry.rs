// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry with a fixed inter-attempt delay.
//!
//! One helper for every transient-call loop in the engine (preview probing
//! today, any flaky adapter call tomorrow). The predicate decides which
//! errors are worth another attempt; everything else short-circuits.

use std::time::Duration;
use tracing::debug;

/// Attempt budget and spacing for a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts: attempts.max(1), delay }
    }
}

/// Run `op` up to the policy's attempt budget.
///
/// Errors for which `should_retry` returns false are returned immediately.
/// The delay is slept between attempts, not after the last one.
pub async fn retry<T, E, F, Fut, P>(
    policy: RetryPolicy,
    should_retry: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.attempts && should_retry(&error) => {
                debug!(attempt, error = %error, "attempt failed, retrying after delay");
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
