use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendseo_trends::TrendRecord;

use crate::language::Market;

/// Whether a keyword came straight from the product or was synthesized from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Base,
    Related,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCandidate {
    pub keyword: String,
    pub origin: Origin,
}

impl KeywordCandidate {
    #[must_use]
    pub fn base(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            origin: Origin::Base,
        }
    }

    #[must_use]
    pub fn related(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            origin: Origin::Related,
        }
    }

    #[must_use]
    pub fn is_base(&self) -> bool {
        self.origin == Origin::Base
    }
}

/// Letter band for a score. The thresholds depend on which scorer produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
}

impl Grade {
    /// Bands used by the full multi-factor scorer.
    #[must_use]
    pub fn from_total(total: f64) -> Self {
        if total >= 88.0 {
            Grade::APlus
        } else if total >= 82.0 {
            Grade::A
        } else if total >= 76.0 {
            Grade::BPlus
        } else if total >= 70.0 {
            Grade::B
        } else if total >= 64.0 {
            Grade::CPlus
        } else if total >= 58.0 {
            Grade::C
        } else {
            Grade::D
        }
    }

    /// `true` for B and every band above it.
    #[must_use]
    pub fn is_at_least_b(self) -> bool {
        self <= Grade::B
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
        })
    }
}

/// Component name to component score, rounded to one decimal.
pub type ComponentScores = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoScore {
    /// Weighted total in `[0, 100]`, rounded to one decimal.
    pub total_score: f64,
    pub grade: Grade,
    /// Empty for a degraded score.
    pub components: ComponentScores,
    /// `None` (serialized as `"unknown"`) for a degraded score.
    #[serde(with = "language_tag")]
    pub language: Option<Market>,
    pub trends_interest: f64,
    pub related_keywords_count: usize,
}

impl SeoScore {
    /// The fixed result returned when a score cannot be computed.
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            total_score: 50.0,
            grade: Grade::C,
            components: ComponentScores::new(),
            language: None,
            trends_interest: 0.0,
            related_keywords_count: 0,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn language_label(&self) -> String {
        self.language
            .map_or_else(|| "unknown".to_owned(), |market| market.to_string())
    }
}

mod language_tag {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::language::Market;

    const UNKNOWN: &str = "unknown";

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Market>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(market) => market.serialize(serializer),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Market>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            UNKNOWN => Ok(None),
            "local" => Ok(Some(Market::Local)),
            "neighbor" => Ok(Some(Market::Neighbor)),
            "foreign" => Ok(Some(Market::Foreign)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["local", "neighbor", "foreign", UNKNOWN],
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedKeyword {
    pub candidate: KeywordCandidate,
    pub trend: TrendRecord,
    pub score: SeoScore,
}

/// Everything one analysis produced, ranked by score with the best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub title: String,
    pub category: String,
    pub base_keywords: Vec<String>,
    pub related_keywords: Vec<String>,
    pub ranked: Vec<RankedKeyword>,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_keywords: usize,
    pub base_count: usize,
    pub related_count: usize,
    pub average_score: f64,
    pub best_keyword: Option<String>,
    pub best_score: f64,
    /// Keywords whose trend data did not come from the source.
    pub synthetic_trends: usize,
}

impl AnalysisResult {
    #[must_use]
    pub fn best(&self) -> Option<&RankedKeyword> {
        self.ranked.first()
    }

    /// The `n` highest-ranked keywords.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankedKeyword] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> AnalysisSummary {
        let total = self.ranked.len();
        let average_score = if total == 0 {
            0.0
        } else {
            let sum: f64 = self.ranked.iter().map(|r| r.score.total_score).sum();
            (sum / total as f64 * 10.0).round() / 10.0
        };
        AnalysisSummary {
            total_keywords: total,
            base_count: self.base_keywords.len(),
            related_count: self.related_keywords.len(),
            average_score,
            best_keyword: self.best().map(|r| r.candidate.keyword.clone()),
            best_score: self.best().map_or(0.0, |r| r.score.total_score),
            synthetic_trends: self
                .ranked
                .iter()
                .filter(|r| r.trend.reliability.is_synthetic())
                .count(),
        }
    }
}
