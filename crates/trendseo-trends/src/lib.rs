//! Relative search-interest data for keyword research.
//!
//! [`TrendsBatchFetcher`] pulls interest-over-time series from a
//! [`TrendsSource`] in small rate-limited batches and always answers with one
//! [`TrendRecord`] per requested keyword: real data where the upstream
//! delivered it, synthetic data flagged by [`Reliability`] where it did not.

pub mod direction;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod source;
pub mod types;

mod fallback;
mod retry;

pub use direction::TrendClassifier;
pub use error::TrendsError;
pub use fetcher::{FetcherSettings, TrendsBatchFetcher};
pub use http::{HttpSourceSettings, HttpTrendsSource};
pub use source::{InterestFrame, TrendsSource};
pub use types::{Reliability, TrendDirection, TrendRecord};
