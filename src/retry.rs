//! Retry and failure classification for fetch/probe operations
//!
//! Every call to the external fetcher goes through [`probe_with_retry`],
//! which re-runs the operation a bounded number of times and then decides
//! what the failure *means*: a transient network problem (skip, change
//! nothing) or a terminal content-level failure (the video is gone,
//! malformed, or blocked). Misclassifying a network blip as "content gone"
//! would trigger a false takedown notification.
//!
//! Attempts run back to back with no inter-attempt delay; the only pacing
//! comes from the underlying transport's own timeouts.
//!
//! # Example
//!
//! ```no_run
//! use likevault::retry::{ProbeError, probe_with_retry};
//! use likevault::Error;
//!
//! # async fn example() {
//! let result = probe_with_retry(3, || async {
//!     Err::<(), _>(Error::ExternalTool("Read timed out".to_string()))
//! })
//! .await;
//!
//! match result {
//!     Ok(_) => {}
//!     Err(ProbeError::Transient { .. }) => { /* skip, do not touch state */ }
//!     Err(ProbeError::Terminal(_)) => { /* content-level failure */ }
//! }
//! # }
//! ```

use crate::error::Error;
use std::future::Future;
use thiserror::Error as ThisError;

/// Error signatures that mark a failure as transient network trouble
///
/// Matched as substrings against the rendered text of the final attempt's
/// error. The list covers transport timeouts, DNS failures, connection
/// drops, the transport's own retry exhaustion, and the extractor's
/// "unable to download/extract webpage" family (which it also emits for
/// temporarily unresolvable pages).
const TRANSIENT_SIGNATURES: &[&str] = &[
    "Read timed out",
    "Failed to resolve",
    "Connection reset by peer",
    "Max retries exceeded",
    "Temporary failure in name resolution",
    "Connection aborted",
    "Unable to download webpage",
    "Unable to extract webpage video data",
    "Unsupported URL",
];

/// Returns true if the error text matches a known transient-network signature
pub fn is_transient_message(message: &str) -> bool {
    TRANSIENT_SIGNATURES.iter().any(|sig| message.contains(sig))
}

/// Classified failure of a fetch/probe operation after retries are exhausted
///
/// Callers pattern-match instead of catching by error hierarchy:
/// `Transient` means "skip this record, mutate nothing", `Terminal` means
/// "the content itself is not retrievable".
#[derive(Debug, ThisError)]
pub enum ProbeError {
    /// The final attempt failed with a known transient-network signature
    #[error("network error after {attempts} attempts: {message}")]
    Transient {
        /// Number of attempts made before giving up
        attempts: u32,
        /// Rendered text of the final attempt's error
        message: String,
    },

    /// The final attempt failed with a content-level error
    #[error("{0}")]
    Terminal(#[source] Error),
}

/// Execute an async fetch/probe operation with bounded, delay-free retries
///
/// Runs `operation` up to `max_retries` times (treated as at least 1). On
/// success the payload is returned unchanged. After the last failure, the
/// *final* error's text decides the classification: a transient signature
/// yields [`ProbeError::Transient`], anything else yields
/// [`ProbeError::Terminal`] carrying the original error.
///
/// This layer performs no persistence and no side effects beyond the
/// wrapped call.
pub async fn probe_with_retry<F, Fut, T>(max_retries: u32, mut operation: F) -> Result<T, ProbeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = crate::Result<T>>,
{
    let max_attempts = max_retries.max(1);
    let mut last_error: Option<Error> = None;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    "Fetch attempt failed"
                );
                last_error = Some(e);
            }
        }
    }

    // max_attempts >= 1, so at least one error was recorded
    let final_error = match last_error {
        Some(e) => e,
        None => Error::Other("retry loop finished without an error".to_string()),
    };

    let message = final_error.to_string();
    if is_transient_message(&message) {
        tracing::warn!(attempts = max_attempts, "Network error detected, skipping");
        Err(ProbeError::Transient {
            attempts: max_attempts,
            message,
        })
    } else {
        tracing::error!(
            error = %final_error,
            attempts = max_attempts,
            "Operation failed after all retry attempts exhausted"
        );
        Err(ProbeError::Terminal(final_error))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn success_returns_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = probe_with_retry(3, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn transient_failure_then_success_recovers() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = probe_with_retry(3, || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(Error::ExternalTool("Read timed out".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "should retry twice before success"
        );
    }

    #[tokio::test]
    async fn exhausted_transient_failure_classifies_as_transient() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = probe_with_retry(3, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(Error::ExternalTool(
                    "Temporary failure in name resolution".to_string(),
                ))
            }
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 3, "should use all attempts");
        match result {
            Err(ProbeError::Transient { attempts, message }) => {
                assert_eq!(attempts, 3);
                assert!(message.contains("Temporary failure in name resolution"));
            }
            other => panic!("expected Transient, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_content_failure_classifies_as_terminal() {
        let result = probe_with_retry(2, || async {
            Err::<i32, _>(Error::ExternalTool(
                "ERROR: Video unavailable, the creator removed it".to_string(),
            ))
        })
        .await;

        match result {
            Err(ProbeError::Terminal(e)) => {
                assert!(e.to_string().contains("the creator removed it"));
            }
            other => panic!("expected Terminal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_final_attempt_decides_classification() {
        // A transient blip followed by a terminal error must end Terminal:
        // the last attempt's failure is the one that gets classified.
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = probe_with_retry(2, || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count == 0 {
                    Err::<i32, _>(Error::ExternalTool("Connection reset by peer".to_string()))
                } else {
                    Err(Error::ExternalTool("HTTP Error 451".to_string()))
                }
            }
        })
        .await;

        assert!(matches!(result, Err(ProbeError::Terminal(_))));
    }

    #[tokio::test]
    async fn zero_max_retries_still_attempts_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = probe_with_retry(0, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(Error::ExternalTool("Read timed out".to_string()))
            }
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ProbeError::Transient { .. })));
    }

    #[tokio::test]
    async fn retries_run_without_delay() {
        let start = std::time::Instant::now();

        let _result = probe_with_retry(3, || async {
            Err::<i32, _>(Error::ExternalTool("Connection aborted".to_string()))
        })
        .await;

        // No backoff between attempts: three immediate failures should
        // complete in far less than any plausible backoff schedule.
        assert!(
            start.elapsed() < std::time::Duration::from_millis(100),
            "retry loop must not sleep between attempts"
        );
    }

    #[test]
    fn every_known_signature_classifies_as_transient() {
        for sig in [
            "Read timed out",
            "Failed to resolve",
            "Connection reset by peer",
            "Max retries exceeded",
            "Temporary failure in name resolution",
            "Connection aborted",
            "Unable to download webpage",
            "Unable to extract webpage video data",
            "Unsupported URL",
        ] {
            assert!(
                is_transient_message(&format!("ERROR: {sig} (caused by ...)")),
                "{sig} should classify as transient"
            );
        }
    }

    #[test]
    fn content_errors_are_not_transient() {
        assert!(!is_transient_message("Video unavailable"));
        assert!(!is_transient_message("This post may not be comfortable"));
        assert!(!is_transient_message("HTTP Error 404: Not Found"));
        assert!(!is_transient_message(""));
    }
}
