// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(1))
}

#[tokio::test]
async fn succeeds_first_try_without_sleeping() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, String> = retry(fast_policy(3), |_| true, |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(7) }
    })
    .await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retries_until_success() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, String> = retry(fast_policy(3), |_| true, |attempt| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 3 {
                Err("transient".to_string())
            } else {
                Ok(attempt)
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_budget_returns_last_error() {
    let result: Result<(), String> =
        retry(fast_policy(3), |_| true, |attempt| async move {
            Err(format!("failure {attempt}"))
        })
        .await;

    assert_eq!(result.unwrap_err(), "failure 3");
}

#[tokio::test]
async fn non_retryable_error_short_circuits() {
    let calls = AtomicU32::new(0);
    let result: Result<(), String> = retry(
        fast_policy(5),
        |e: &String| e == "transient",
        |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("fatal".to_string()) }
        },
    )
    .await;

    assert_eq!(result.unwrap_err(), "fatal");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_attempts_is_clamped_to_one() {
    let policy = RetryPolicy::new(0, Duration::from_millis(1));
    assert_eq!(policy.attempts, 1);

    let calls = AtomicU32::new(0);
    let result: Result<(), String> = retry(policy, |_| true, |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err("nope".to_string()) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
