// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preview health probing.
//!
//! File-presence health (see [`crate::health`]) says the sandbox *should*
//! serve; the prober confirms the dev server actually returns a working
//! page at its public URL. Transport errors and non-200 statuses are
//! retried on a fixed delay; content failures (wrong content type, stub or
//! error page bodies) are terminal — another attempt would fetch the same
//! page.

use crate::retry::{retry, RetryPolicy};
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Prober construction errors.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid probe pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Per-probe options.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Hard per-attempt timeout (covers connect through body read)
    pub timeout: Duration,
    /// Total attempts, including the first
    pub retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Require a `text/html` content type
    pub expect_html: bool,
    /// Require a plausible app page: minimum body size, a `#root` container,
    /// no well-known error-page markers
    pub expect_root_div: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 3,
            retry_delay: Duration::from_secs(1),
            expect_html: true,
            expect_root_div: true,
        }
    }
}

/// Probe outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub healthy: bool,
    /// Failure reason of the last attempt, when unhealthy
    pub reason: Option<String>,
    /// HTTP status of the last attempt that got a response
    pub status_code: Option<u16>,
    /// Elapsed time of the last attempt
    pub response_time: Duration,
}

/// Minimum body size for a plausible app page; error/stub pages are shorter.
const MIN_BODY_BYTES: usize = 200;

/// Well-known dev-server error-page markers.
const ERROR_MARKERS: &[&str] = &[
    r"(?i)404\s*[|:-]?\s*(page\s+)?not\s+found",
    r"(?i)500\s*[|:-]?\s*internal\s+server\s+error",
    r"(?i)502\s*[|:-]?\s*bad\s+gateway",
    r"(?i)503\s*[|:-]?\s*service\s+unavailable",
    r"(?i)failed to compile",
    r"(?i)syntaxerror",
    r"(?i)module not found",
    r"(?i)cannot get /",
];

struct AttemptFailure {
    reason: String,
    status: Option<u16>,
    elapsed: Duration,
    retryable: bool,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

struct AttemptSuccess {
    status: u16,
    elapsed: Duration,
}

/// Probes a sandbox's externally reachable preview URL.
pub struct PreviewProber {
    client: reqwest::Client,
    markers: Vec<Regex>,
    root_div: Regex,
}

impl PreviewProber {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        let markers = ERROR_MARKERS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let root_div = Regex::new(r#"id=["']root["']"#)?;
        Ok(Self { client, markers, root_div })
    }

    /// Probe the URL, retrying transport errors and non-200 statuses up to
    /// the attempt budget. Never raises: every failure mode is a report.
    pub async fn probe(&self, url: &str, opts: ProbeOptions) -> ProbeReport {
        let policy = RetryPolicy::new(opts.retries, opts.retry_delay);
        let result = retry(
            policy,
            |failure: &AttemptFailure| failure.retryable,
            |attempt| {
                debug!(url, attempt, "probing preview url");
                self.attempt(url, &opts)
            },
        )
        .await;

        match result {
            Ok(success) => ProbeReport {
                healthy: true,
                reason: None,
                status_code: Some(success.status),
                response_time: success.elapsed,
            },
            Err(failure) => ProbeReport {
                healthy: false,
                reason: Some(failure.reason),
                status_code: failure.status,
                response_time: failure.elapsed,
            },
        }
    }

    async fn attempt(
        &self,
        url: &str,
        opts: &ProbeOptions,
    ) -> Result<AttemptSuccess, AttemptFailure> {
        let started = Instant::now();
        let fail = |reason: String, status: Option<u16>, retryable: bool| AttemptFailure {
            reason,
            status,
            elapsed: started.elapsed(),
            retryable,
        };

        let response = self
            .client
            .get(url)
            .timeout(opts.timeout)
            .send()
            .await
            .map_err(|error| fail(format!("request failed: {error}"), None, true))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(
                format!("unexpected status: {status}"),
                Some(status.as_u16()),
                true,
            ));
        }
        let status = status.as_u16();

        if opts.expect_html {
            let is_html = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.contains("text/html"));
            if !is_html {
                return Err(fail(
                    "response is not text/html".to_string(),
                    Some(status),
                    false,
                ));
            }
        }

        if opts.expect_root_div {
            let body = response
                .text()
                .await
                .map_err(|error| fail(format!("failed to read body: {error}"), Some(status), true))?;

            if body.len() < MIN_BODY_BYTES {
                return Err(fail(
                    format!("page body too short ({} bytes)", body.len()),
                    Some(status),
                    false,
                ));
            }
            if !self.root_div.is_match(&body) {
                return Err(fail(
                    "missing #root container element".to_string(),
                    Some(status),
                    false,
                ));
            }
            if let Some(marker) = self.markers.iter().find(|m| m.is_match(&body)) {
                return Err(fail(
                    format!("error page detected (matched `{}`)", marker.as_str()),
                    Some(status),
                    false,
                ));
            }
        }

        Ok(AttemptSuccess { status, elapsed: started.elapsed() })
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
