//! Trend direction strategies.
//!
//! The two strategies were tuned independently and feed different scorers:
//! the windowed one backs the full keyword analysis, the head/tail one backs
//! the quick single-keyword path. They are kept apart on purpose.

use crate::types::{mean, TrendDirection};

/// Minimum series length (and minimum window) for the windowed strategy.
const MIN_WINDOW: usize = 4;
/// Points compared at each end by the head/tail strategy.
const HEAD_TAIL_POINTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendClassifier {
    /// Seven-way: compares the mean of the last and first `max(4, len/4)`
    /// points with ±5 % and ±20 % thresholds.
    Windowed,
    /// Three-way: compares the mean of the last and first four points with
    /// ±10 % thresholds. Only yields `Rising`, `Stable`, or `Declining`.
    HeadTail,
}

impl TrendClassifier {
    #[must_use]
    pub fn classify(self, series: &[f64]) -> TrendDirection {
        match self {
            TrendClassifier::Windowed => classify_windowed(series),
            TrendClassifier::HeadTail => classify_head_tail(series),
        }
    }
}

fn classify_windowed(series: &[f64]) -> TrendDirection {
    if series.len() < MIN_WINDOW {
        return TrendDirection::InsufficientData;
    }

    let window = MIN_WINDOW.max(series.len() / 4);
    let recent = mean(&series[series.len() - window..]);
    let older = mean(&series[..window]);

    if older == 0.0 {
        return if recent > 0.0 {
            TrendDirection::NewTrend
        } else {
            TrendDirection::NoData
        };
    }

    let change_percent = (recent - older) / older * 100.0;
    if change_percent > 20.0 {
        TrendDirection::Rising
    } else if change_percent > 5.0 {
        TrendDirection::SlightlyRising
    } else if change_percent < -20.0 {
        TrendDirection::Declining
    } else if change_percent < -5.0 {
        TrendDirection::SlightlyDeclining
    } else {
        TrendDirection::Stable
    }
}

fn classify_head_tail(series: &[f64]) -> TrendDirection {
    if series.is_empty() {
        return TrendDirection::Stable;
    }

    let take = HEAD_TAIL_POINTS.min(series.len());
    let recent = mean(&series[series.len() - take..]);
    let earlier = mean(&series[..take]);

    if recent > earlier * 1.1 {
        TrendDirection::Rising
    } else if recent < earlier * 0.9 {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}
