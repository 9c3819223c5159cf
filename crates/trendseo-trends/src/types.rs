use serde::{Deserialize, Serialize};

use crate::direction::TrendClassifier;

/// Coarse label summarizing how interest moved across the observed window.
///
/// [`TrendClassifier::Windowed`] produces the first eight variants;
/// [`TrendClassifier::HeadTail`] only ever produces `Rising`, `Stable`, or
/// `Declining`. `NotAnalyzed` marks records that never went to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    InsufficientData,
    NewTrend,
    NoData,
    Rising,
    SlightlyRising,
    Stable,
    SlightlyDeclining,
    Declining,
    NotAnalyzed,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendDirection::InsufficientData => "insufficient_data",
            TrendDirection::NewTrend => "new_trend",
            TrendDirection::NoData => "no_data",
            TrendDirection::Rising => "rising",
            TrendDirection::SlightlyRising => "slightly_rising",
            TrendDirection::Stable => "stable",
            TrendDirection::SlightlyDeclining => "slightly_declining",
            TrendDirection::Declining => "declining",
            TrendDirection::NotAnalyzed => "not_analyzed",
        };
        f.write_str(label)
    }
}

/// Provenance of a [`TrendRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    /// Fetched, more than 10 data points.
    High,
    /// Fetched, 1 to 10 data points.
    Medium,
    /// Fetched, but the source had no usable points for the keyword.
    Low,
    /// Synthesized after the keyword's batch request failed.
    Estimated,
    /// Synthesized because the source could not be reached at all.
    Demo,
    /// Placeholder interest used when trends lookups are skipped.
    Assumed,
}

impl Reliability {
    /// `true` when the record did not come from the trends source.
    #[must_use]
    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            Reliability::Estimated | Reliability::Demo | Reliability::Assumed
        )
    }
}

impl std::fmt::Display for Reliability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Reliability::High => "high",
            Reliability::Medium => "medium",
            Reliability::Low => "low",
            Reliability::Estimated => "estimated",
            Reliability::Demo => "demo",
            Reliability::Assumed => "assumed",
        };
        f.write_str(label)
    }
}

/// Interest summary for one keyword, produced once per analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub keyword: String,
    /// Mean relative interest in `[0, 100]`.
    pub interest: f64,
    /// Highest point of the series in `[0, 100]`.
    pub peak_interest: f64,
    pub trend_direction: TrendDirection,
    pub data_points: u32,
    pub reliability: Reliability,
}

/// Series longer than this are considered high reliability.
const HIGH_RELIABILITY_MIN_POINTS: usize = 10;

impl TrendRecord {
    /// Summarize a fetched series with the windowed classifier.
    ///
    /// `values` must already have missing points removed; an empty slice
    /// yields [`TrendRecord::no_data`].
    #[must_use]
    pub fn from_series(keyword: &str, values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::no_data(keyword);
        }
        Self {
            keyword: keyword.to_owned(),
            interest: round1(mean(values)),
            peak_interest: round1(max(values)),
            trend_direction: TrendClassifier::Windowed.classify(values),
            data_points: point_count(values),
            reliability: reliability_for(values.len()),
        }
    }

    /// Summarize a single-keyword series the way the quick path does:
    /// whole-number interest of at least 1, and the head/tail classifier.
    #[must_use]
    pub fn from_quick_series(keyword: &str, values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::no_data(keyword);
        }
        let interest = mean(values).trunc().max(1.0);
        Self {
            keyword: keyword.to_owned(),
            interest,
            peak_interest: max(values).trunc().max(interest),
            trend_direction: TrendClassifier::HeadTail.classify(values),
            data_points: point_count(values),
            reliability: reliability_for(values.len()),
        }
    }

    /// The keyword is known to the source but has no usable data points.
    #[must_use]
    pub fn no_data(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_owned(),
            interest: 0.0,
            peak_interest: 0.0,
            trend_direction: TrendDirection::NoData,
            data_points: 0,
            reliability: Reliability::Low,
        }
    }

    /// A placeholder record for analyses that skip the trends source.
    #[must_use]
    pub fn assumed(keyword: &str, interest: f64) -> Self {
        Self {
            keyword: keyword.to_owned(),
            interest,
            peak_interest: interest,
            trend_direction: TrendDirection::NotAnalyzed,
            data_points: 0,
            reliability: Reliability::Assumed,
        }
    }
}

fn reliability_for(points: usize) -> Reliability {
    if points > HIGH_RELIABILITY_MIN_POINTS {
        Reliability::High
    } else {
        Reliability::Medium
    }
}

fn point_count(values: &[f64]) -> u32 {
    u32::try_from(values.len()).unwrap_or(u32::MAX)
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
