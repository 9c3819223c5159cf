//! Multi-factor SEO scoring.
//!
//! Five components are combined with the profile's weights:
//!
//! | Component        | Signal                                              |
//! |------------------|-----------------------------------------------------|
//! | `search_volume`  | banded trends interest                              |
//! | `keyword_length` | word count, peaking at three words                  |
//! | `competition`    | inverse of estimated competition                    |
//! | `relevance`      | overlap with the product title, category, and topic |
//! | `local_factor`   | market multiplier of the detected language          |
//!
//! Scoring never fails: inputs it cannot use produce [`SeoScore::degraded`].

use std::collections::HashSet;
use std::sync::Arc;

use trendseo_core::MarketProfile;
use trendseo_trends::TrendRecord;

use crate::language::{LanguageDetector, Market};
use crate::types::{ComponentScores, Grade, SeoScore};

/// Baseline for the local factor before the market multiplier.
const LOCAL_FACTOR_BASE: f64 = 80.0;
/// Applied to strong, short, local keywords.
const HIGH_PERFORMER_BONUS: f64 = 1.05;

#[derive(Debug, Clone)]
pub struct SeoScorer {
    profile: Arc<MarketProfile>,
    detector: LanguageDetector,
    brands: Vec<String>,
}

impl SeoScorer {
    #[must_use]
    pub fn new(profile: Arc<MarketProfile>) -> Self {
        let detector = LanguageDetector::new(&profile);
        let brands = profile.brand_names();
        Self {
            profile,
            detector,
            brands,
        }
    }

    /// Add vendor names (for example from the live catalog) to the brand list.
    #[must_use]
    pub fn with_additional_brands<I, B>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<str>,
    {
        let mut known: HashSet<String> = self.brands.iter().cloned().collect();
        for brand in brands {
            let brand = brand.as_ref().trim().to_lowercase();
            if !brand.is_empty() && known.insert(brand.clone()) {
                self.brands.push(brand);
            }
        }
        self
    }

    #[must_use]
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    #[must_use]
    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    /// Score `keyword` for a product.
    ///
    /// `related` is the full related-keyword list of the analysis; its size
    /// feeds both the competition and relevance components.
    #[must_use]
    pub fn score(
        &self,
        keyword: &str,
        trend: &TrendRecord,
        title: &str,
        category: &str,
        related: &[String],
    ) -> SeoScore {
        let interest = trend.interest;
        if !interest.is_finite() || !trend.peak_interest.is_finite() {
            tracing::warn!(keyword, interest, "non-finite trend data, using degraded score");
            return SeoScore::degraded();
        }

        let words = word_count(keyword);
        let language = self.detector.detect(keyword);

        let search = search_volume_score(interest);
        let length = keyword_length_score(keyword);
        let competition = self.competition_score(keyword, interest, related.len());
        let relevance = self.relevance_score(keyword, title, category, related);
        let local = self.local_factor(language);

        let weights = &self.profile.weights;
        let mut total = search * weights.search_volume
            + length * weights.keyword_length
            + competition * weights.competition
            + relevance * weights.relevance
            + local * weights.local_factor;

        if interest > 50.0 && language == Market::Local && words <= 3 {
            total *= HIGH_PERFORMER_BONUS;
        }
        if !total.is_finite() {
            tracing::warn!(keyword, "non-finite total, using degraded score");
            return SeoScore::degraded();
        }
        let total = total.clamp(0.0, 100.0);

        let components: ComponentScores = [
            ("search_volume", search),
            ("keyword_length", length),
            ("competition", competition),
            ("relevance", relevance),
            ("local_factor", local),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_owned(), round1(value)))
        .collect();

        SeoScore {
            total_score: round1(total),
            grade: Grade::from_total(total),
            components,
            language: Some(language),
            trends_interest: interest,
            related_keywords_count: related.len(),
        }
    }

    /// Higher means less competition. Always within `[25, 98]`.
    #[must_use]
    pub fn competition_score(&self, keyword: &str, interest: f64, related_count: usize) -> f64 {
        let lowered = keyword.to_lowercase();
        let mut base = (interest * 1.3).min(95.0);

        match word_count(keyword) {
            0 | 1 => {}
            2 => base *= 0.8,
            _ => base *= 0.65,
        }
        if self.brands.iter().any(|brand| lowered.contains(brand.as_str())) {
            base *= 0.7;
        }
        if related_count > 5 {
            base *= 1.1;
        }
        if self.detector.detect(keyword) == Market::Local {
            base *= 0.8;
        }

        (100.0 - base).clamp(25.0, 98.0)
    }

    /// Topical fit of `keyword` to the product. At most 98.
    #[must_use]
    pub fn relevance_score(
        &self,
        keyword: &str,
        title: &str,
        category: &str,
        related: &[String],
    ) -> f64 {
        let keyword = keyword.to_lowercase();
        let title = title.to_lowercase();
        let category = category.to_lowercase();
        let keyword_words: HashSet<&str> = keyword.split_whitespace().collect();
        let title_words: HashSet<&str> = title.split_whitespace().collect();

        let mut score = 40.0;

        if title.contains(&keyword) {
            score += 35.0;
        }

        let overlap = keyword_words.intersection(&title_words).count();
        #[allow(clippy::cast_precision_loss)]
        let overlap_points = (overlap as f64 * 12.0).min(25.0);
        score += overlap_points;

        if !category.is_empty() && keyword_words.iter().any(|word| category.contains(word)) {
            score += 20.0;
        }

        let mentions = |term: &str| keyword.contains(term) || title.contains(term);
        if self
            .profile
            .product_terms
            .iter()
            .any(|group| mentions(&group.category) && group.terms.iter().any(|t| mentions(t)))
        {
            score += 15.0;
        }

        if !related.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let depth = (related.len() as f64 * 2.0).min(10.0);
            score += depth;
        }

        if self.profile.cross_category.iter().any(|rule| {
            keyword.contains(&rule.keyword)
                && rule.title_terms.iter().any(|t| title.contains(t.as_str()))
        }) {
            score += 10.0;
        }

        f64::min(98.0, score)
    }

    #[must_use]
    pub fn local_factor(&self, market: Market) -> f64 {
        let multipliers = &self.profile.multipliers;
        LOCAL_FACTOR_BASE
            * match market {
                Market::Local => multipliers.local,
                Market::Neighbor => multipliers.neighbor,
                Market::Foreign => multipliers.foreign,
            }
    }
}

/// Banded trends interest.
#[must_use]
pub fn search_volume_score(interest: f64) -> f64 {
    const BANDS: [(f64, f64); 10] = [
        (90.0, 98.0),
        (80.0, 95.0),
        (70.0, 90.0),
        (60.0, 85.0),
        (50.0, 80.0),
        (40.0, 75.0),
        (30.0, 70.0),
        (20.0, 65.0),
        (10.0, 55.0),
        (5.0, 45.0),
    ];
    BANDS
        .iter()
        .find(|(floor, _)| interest >= *floor)
        .map_or_else(|| (interest * 5.0).max(25.0), |(_, score)| *score)
}

/// Word-count sweet spot around two to four words.
#[must_use]
pub fn keyword_length_score(keyword: &str) -> f64 {
    match word_count(keyword) {
        1 => 55.0,
        2 => 88.0,
        3 => 95.0,
        4 => 85.0,
        5 => 70.0,
        0 | 6 | 7 => 55.0,
        _ => 35.0,
    }
}

fn word_count(keyword: &str) -> usize {
    keyword.split_whitespace().count()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
