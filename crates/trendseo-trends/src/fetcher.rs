//! Rate-limited batch fetching with per-keyword fallbacks.
//!
//! Every call answers with exactly one record per distinct requested keyword.
//! A failed batch only affects its own keywords (`Estimated`); an unreachable
//! source affects the whole call (`Demo`).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::TrendsError;
use crate::fallback::{demo_record, estimated_record};
use crate::source::TrendsSource;
use crate::types::TrendRecord;

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    /// Keywords per upstream request. Values below 1 are treated as 1.
    pub batch_size: usize,
    /// Minimum spacing between requests, also slept between batches.
    pub min_delay: Duration,
    /// Keep real records across calls, keyed by keyword, geo, and timeframe.
    pub cache: bool,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            batch_size: 3,
            min_delay: Duration::from_secs(3),
            cache: false,
        }
    }
}

type CacheKey = (String, String, String);

struct LimiterState<R> {
    last_request: Option<Instant>,
    session_open: bool,
    rng: R,
    cache: HashMap<CacheKey, TrendRecord>,
}

pub struct TrendsBatchFetcher<S, R = StdRng> {
    source: S,
    settings: FetcherSettings,
    state: Mutex<LimiterState<R>>,
}

impl<S: TrendsSource> TrendsBatchFetcher<S, StdRng> {
    /// Fetcher whose fallback values come from an OS-seeded generator.
    pub fn new(source: S, settings: FetcherSettings) -> Self {
        Self::with_rng(source, settings, StdRng::from_os_rng())
    }
}

impl<S: TrendsSource, R: Rng + Send> TrendsBatchFetcher<S, R> {
    /// Fetcher drawing fallback values from `rng`; seed it for reproducible output.
    pub fn with_rng(source: S, settings: FetcherSettings, rng: R) -> Self {
        Self {
            source,
            settings,
            state: Mutex::new(LimiterState {
                last_request: None,
                session_open: false,
                rng,
                cache: HashMap::new(),
            }),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &FetcherSettings {
        &self.settings
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// One [`TrendRecord`] per distinct keyword, never fewer.
    ///
    /// Keywords are requested in batches of `batch_size` with `min_delay`
    /// between requests. Concurrent callers sharing this fetcher are served
    /// one at a time.
    pub async fn fetch_batch(
        &self,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> HashMap<String, TrendRecord> {
        let distinct = dedupe(keywords);
        let mut records = HashMap::with_capacity(distinct.len());
        let mut state = self.state.lock().await;

        let pending: Vec<String> = if self.settings.cache {
            distinct
                .into_iter()
                .filter(|keyword| {
                    let key = cache_key(keyword, geo, timeframe);
                    match state.cache.get(&key) {
                        Some(record) => {
                            records.insert(keyword.clone(), record.clone());
                            false
                        }
                        None => true,
                    }
                })
                .collect()
        } else {
            distinct
        };

        if pending.is_empty() {
            tracing::debug!(keywords = records.len(), "all trend records served from cache");
            return records;
        }

        if let Err(e) = self.ensure_session(&mut state).await {
            tracing::warn!(
                keywords = pending.len(),
                error = %e,
                "trends source unavailable, using demo data"
            );
            for keyword in pending {
                let record = demo_record(&keyword, &mut state.rng);
                records.insert(keyword, record);
            }
            return records;
        }

        let batch_size = self.settings.batch_size.max(1);
        tracing::info!(
            keywords = pending.len(),
            batches = pending.len().div_ceil(batch_size),
            geo,
            timeframe,
            "fetching trend data"
        );

        for (index, batch) in pending.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.settings.min_delay).await;
            }
            self.wait_for_slot(&state).await;

            match self.source.interest_over_time(batch, geo, timeframe).await {
                Ok(frame) => {
                    state.last_request = Some(Instant::now());
                    tracing::debug!(batch = index + 1, keywords = batch.len(), "batch fetched");
                    for keyword in batch {
                        let record = frame.valid_values(keyword).map_or_else(
                            || TrendRecord::no_data(keyword),
                            |values| TrendRecord::from_series(keyword, &values),
                        );
                        if self.settings.cache {
                            state
                                .cache
                                .insert(cache_key(keyword, geo, timeframe), record.clone());
                        }
                        records.insert(keyword.clone(), record);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        batch = index + 1,
                        keywords = ?batch,
                        error = %e,
                        "trend batch failed, using estimated data"
                    );
                    for keyword in batch {
                        let record = estimated_record(keyword, &mut state.rng);
                        records.insert(keyword.clone(), record);
                    }
                }
            }
        }

        records
    }

    /// Interest for a single keyword, summarized the way the quick path expects.
    ///
    /// Returns `Ok(None)` when the request fails or yields no usable points.
    ///
    /// # Errors
    ///
    /// Returns `TrendsError` only when the source session cannot be opened.
    pub async fn fetch_single(
        &self,
        keyword: &str,
        geo: &str,
        timeframe: &str,
    ) -> Result<Option<TrendRecord>, TrendsError> {
        let mut state = self.state.lock().await;
        self.ensure_session(&mut state).await?;
        self.wait_for_slot(&state).await;

        let request = [keyword.to_owned()];
        match self.source.interest_over_time(&request, geo, timeframe).await {
            Ok(frame) => {
                state.last_request = Some(Instant::now());
                Ok(frame
                    .valid_values(keyword)
                    .filter(|values| !values.is_empty())
                    .map(|values| TrendRecord::from_quick_series(keyword, &values)))
            }
            Err(e) => {
                tracing::warn!(keyword, error = %e, "single keyword trend request failed");
                Ok(None)
            }
        }
    }

    /// Related queries for `keyword` as the source ranks them.
    ///
    /// Shares the limiter with the interest requests. A failed request yields
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns `TrendsError` only when the source session cannot be opened.
    pub async fn fetch_related(
        &self,
        keyword: &str,
        geo: &str,
        timeframe: &str,
    ) -> Result<Vec<String>, TrendsError> {
        let mut state = self.state.lock().await;
        self.ensure_session(&mut state).await?;
        self.wait_for_slot(&state).await;

        match self.source.related_queries(keyword, geo, timeframe).await {
            Ok(related) => {
                state.last_request = Some(Instant::now());
                tracing::debug!(keyword, related = related.len(), "related queries fetched");
                Ok(related)
            }
            Err(e) => {
                tracing::warn!(keyword, error = %e, "related queries request failed");
                Ok(Vec::new())
            }
        }
    }

    async fn ensure_session(&self, state: &mut LimiterState<R>) -> Result<(), TrendsError> {
        if !state.session_open {
            self.source.open_session().await?;
            state.session_open = true;
        }
        Ok(())
    }

    /// Sleep until `min_delay` has passed since the last successful request.
    async fn wait_for_slot(&self, state: &LimiterState<R>) {
        if let Some(last) = state.last_request {
            match last.checked_add(self.settings.min_delay) {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => tokio::time::sleep(self.settings.min_delay).await,
            }
        }
    }
}

fn cache_key(keyword: &str, geo: &str, timeframe: &str) -> CacheKey {
    (keyword.to_owned(), geo.to_owned(), timeframe.to_owned())
}

fn dedupe(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .filter(|keyword| seen.insert(keyword.as_str()))
        .cloned()
        .collect()
}
