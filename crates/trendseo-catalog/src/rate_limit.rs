//! Retry utilities for the catalog client.
//!
//! HTTP 429, 5xx statuses, and network failures are retried with exponential
//! back-off. Everything else (404, other 4xx, unparseable bodies) is returned
//! at once.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::RateLimited { .. } | CatalogError::Http(_) => true,
        CatalogError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries` times.
///
/// The sleep before retry `n` is `backoff_base_ms * 2^(n-1)` capped at 60 s.
/// A 429 that names a longer `Retry-After` is honored up to the same cap. A zero
/// `backoff_base_ms` disables sleeping altogether.
///
/// | Attempt | Sleep before it (`backoff_base_ms = 500`) |
/// |---------|-------------------------------------------|
/// | 0 (initial) | none |
/// | 1 | 500 ms |
/// | 2 | 1 s |
/// | 3 | 2 s |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let backoff = backoff_base_ms.saturating_mul(1u64 << attempt.min(20));
        let requested = match &err {
            CatalogError::RateLimited {
                retry_after_secs, ..
            } if backoff_base_ms > 0 => retry_after_secs.saturating_mul(1_000),
            _ => 0,
        };
        let delay_ms = backoff.max(requested).min(MAX_DELAY_MS);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient catalog error, retrying after back-off"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
