//! The seam between the batch fetcher and whatever serves interest data.

use std::collections::HashMap;
use std::future::Future;

use crate::error::TrendsError;

/// Interest-over-time table: one column per keyword, one row per time point.
///
/// A `None` cell is a missing point. A keyword with no column at all was not
/// returned by the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterestFrame {
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl InterestFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the column for `keyword`.
    pub fn insert(&mut self, keyword: impl Into<String>, values: Vec<Option<f64>>) {
        self.columns.insert(keyword.into(), values);
    }

    /// Builder form of [`InterestFrame::insert`] for fully populated series.
    #[must_use]
    pub fn with_series(mut self, keyword: &str, values: &[f64]) -> Self {
        self.insert(keyword, values.iter().copied().map(Some).collect());
        self
    }

    /// The raw column for `keyword`, if the source returned one.
    #[must_use]
    pub fn series(&self, keyword: &str) -> Option<&[Option<f64>]> {
        self.columns.get(keyword).map(Vec::as_slice)
    }

    /// Present, finite values for `keyword`; `None` when there is no column.
    #[must_use]
    pub fn valid_values(&self, keyword: &str) -> Option<Vec<f64>> {
        self.series(keyword).map(|column| {
            column
                .iter()
                .filter_map(|value| value.filter(|v| v.is_finite()))
                .collect()
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

/// A provider of relative search-interest series.
///
/// Implementations must be cheap to share across tasks; the fetcher holds one
/// behind its own limiter and never calls it concurrently.
pub trait TrendsSource: Send + Sync {
    /// Check that the source is reachable and ready to answer queries.
    ///
    /// # Errors
    ///
    /// Returns `TrendsError` when no request can be served at all.
    fn open_session(&self) -> impl Future<Output = Result<(), TrendsError>> + Send;

    /// Interest over time for up to a handful of keywords in one request.
    ///
    /// # Errors
    ///
    /// Returns `TrendsError` when the request fails; the caller treats that as
    /// a failure of the whole batch.
    fn interest_over_time(
        &self,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> impl Future<Output = Result<InterestFrame, TrendsError>> + Send;

    /// Top related search queries for `keyword`, most popular first.
    ///
    /// # Errors
    ///
    /// Returns `TrendsError` when the request fails.
    fn related_queries(
        &self,
        keyword: &str,
        geo: &str,
        timeframe: &str,
    ) -> impl Future<Output = Result<Vec<String>, TrendsError>> + Send;
}
