//! Retry with exponential back-off and jitter for the HTTP trends source.
//!
//! Transient failures (network errors, 429, 5xx) are retried; everything else
//! is returned at once so the fetcher can fall back for that batch.

use std::future::Future;
use std::time::Duration;

use crate::error::TrendsError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429, and 5xx statuses.
///
/// **Not retriable:** 404, other 4xx statuses, malformed bodies, and
/// configuration errors such as an unparseable base URL.
pub(crate) fn is_retriable(err: &TrendsError) -> bool {
    match err {
        TrendsError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        TrendsError::RateLimited { .. } => true,
        TrendsError::UnexpectedStatus { status, .. } => *status >= 500,
        TrendsError::NotFound { .. }
        | TrendsError::Deserialize { .. }
        | TrendsError::InvalidBaseUrl { .. }
        | TrendsError::Unavailable(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The sleep before retry `n` is `backoff_base_ms × 2ⁿ⁻¹`, capped at 60 s,
/// scaled by a random factor in `[0.75, 1.25)`. A 429 asking for a longer
/// `Retry-After` wins, up to the same cap. A zero `backoff_base_ms` never sleeps.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, TrendsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TrendsError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let requested = match &err {
                    TrendsError::RateLimited { retry_after_secs } if backoff_base_ms > 0 => {
                        retry_after_secs.saturating_mul(1_000)
                    }
                    _ => 0,
                };
                let delay_ms = jittered.max(requested).min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "trends source transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn deserialize_err() -> TrendsError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        TrendsError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn rate_limited_is_retriable() {
        assert!(is_retriable(&TrendsError::RateLimited {
            retry_after_secs: 60
        }));
    }

    #[test]
    fn server_errors_are_retriable_client_errors_are_not() {
        let status = |status| TrendsError::UnexpectedStatus {
            status,
            url: "http://proxy/api/interest_over_time".to_owned(),
        };
        assert!(is_retriable(&status(503)));
        assert!(!is_retriable(&status(400)));
        assert!(!is_retriable(&status(403)));
    }

    #[test]
    fn not_found_and_bad_bodies_are_not_retriable() {
        assert!(!is_retriable(&TrendsError::NotFound {
            url: "http://proxy/api/session".to_owned()
        }));
        assert!(!is_retriable(&deserialize_err()));
    }

    #[tokio::test]
    async fn retries_rate_limited_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TrendsError::RateLimited {
                        retry_after_secs: 0,
                    })
                } else {
                    Ok::<u32, TrendsError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, TrendsError>(TrendsError::UnexpectedStatus {
                    status: 502,
                    url: "http://proxy".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(TrendsError::UnexpectedStatus { status: 502, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_extends_the_back_off() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let start = tokio::time::Instant::now();
        let result = retry_with_backoff(1, 100, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TrendsError::RateLimited {
                        retry_after_secs: 5,
                    })
                } else {
                    Ok::<u32, TrendsError>(1)
                }
            }
        })
        .await;
        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_is_capped() {
        let start = tokio::time::Instant::now();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(1, 100, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, TrendsError>(TrendsError::RateLimited {
                    retry_after_secs: 3_600,
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() <= Duration::from_millis(MAX_DELAY_MS + 1_000));
    }

    #[tokio::test]
    async fn does_not_retry_deserialize_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, TrendsError>(deserialize_err())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(TrendsError::Deserialize { .. })));
    }
}
