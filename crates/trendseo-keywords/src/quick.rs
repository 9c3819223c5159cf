//! Lighter single-keyword research path.
//!
//! One trends request for the title's primary phrase and a couple of its
//! related queries, topped up with dictionary fallbacks, scored with a simpler
//! additive formula and its own grade bands. Only `Rising`, `Stable`, and
//! `Declining` move the score.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use trendseo_core::MarketProfile;
use trendseo_trends::{TrendDirection, TrendsBatchFetcher, TrendsSource};

use crate::candidates::CandidateGenerator;
use crate::types::Grade;

/// Keywords returned by [`analyze`].
pub const QUICK_TARGET: usize = 8;
const MAX_FALLBACK_KEYWORDS: usize = 5;
const MAX_ENHANCED_KEYWORDS: usize = 10;
/// Related queries kept from the top of the source's list.
const MAX_RELATED_KEYWORDS: usize = 3;
/// Related keywords looked up for real interest.
const MAX_RELATED_LOOKUPS: usize = 2;

/// Placeholder interest for dictionary keywords when the source answered.
const FALLBACK_INTEREST: f64 = 35.0;
const FALLBACK_PEAK: f64 = 45.0;
/// Placeholder interest when the source could not be reached.
const OFFLINE_INTEREST: f64 = 30.0;
const OFFLINE_PEAK: f64 = 35.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickScore {
    pub total_score: f64,
    pub grade: Grade,
    pub interest_points: f64,
    pub trend_points: i32,
    pub base_bonus: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickKeyword {
    pub keyword: String,
    pub interest: f64,
    pub peak_interest: f64,
    pub trend_direction: TrendDirection,
    pub is_base: bool,
    pub score: QuickScore,
}

impl QuickKeyword {
    fn new(
        keyword: String,
        interest: f64,
        peak_interest: f64,
        trend_direction: TrendDirection,
        is_base: bool,
    ) -> Self {
        let score = quick_score(&keyword, interest, trend_direction, is_base);
        Self {
            keyword,
            interest,
            peak_interest,
            trend_direction,
            is_base,
            score,
        }
    }
}

/// `50 + interest share + trend points + base bonus - length penalty`, in `[0, 100]`.
#[must_use]
pub fn quick_score(
    keyword: &str,
    interest: f64,
    direction: TrendDirection,
    is_base: bool,
) -> QuickScore {
    let interest_points = (interest / 100.0 * 30.0).min(30.0);
    let trend_points = match direction {
        TrendDirection::Rising => 15,
        TrendDirection::Stable => 5,
        TrendDirection::Declining => -10,
        _ => 0,
    };
    let base_bonus = if is_base { 10 } else { 0 };
    #[allow(clippy::cast_precision_loss)]
    let length_penalty = ((keyword.chars().count() as f64 - 30.0) * 0.5).max(0.0);

    let total = (50.0 + interest_points + f64::from(trend_points) + f64::from(base_bonus)
        - length_penalty)
        .clamp(0.0, 100.0);

    QuickScore {
        total_score: round1(total),
        grade: quick_grade(total),
        interest_points: round1(interest_points),
        trend_points,
        base_bonus,
    }
}

/// Bands for the quick scorer, more lenient than [`Grade::from_total`].
#[must_use]
pub fn quick_grade(total: f64) -> Grade {
    if total >= 85.0 {
        Grade::APlus
    } else if total >= 75.0 {
        Grade::A
    } else if total >= 65.0 {
        Grade::BPlus
    } else if total >= 55.0 {
        Grade::B
    } else if total >= 45.0 {
        Grade::CPlus
    } else if total >= 35.0 {
        Grade::C
    } else {
        Grade::D
    }
}

/// Up to five substitutes: the matching family's list, then generic variants.
#[must_use]
pub fn fallback_keywords(profile: &MarketProfile, base: &str) -> Vec<String> {
    let lowered = base.to_lowercase();
    let quick = &profile.quick;
    let family = quick
        .families
        .iter()
        .filter(|family| !family.fallback.is_empty())
        .find(|family| triggers_match(&family.triggers, &lowered));

    let mut keywords: Vec<String> = family.map(|f| f.fallback.clone()).unwrap_or_default();
    keywords.extend(quick.fallback_suffixes.iter().map(|s| format!("{base} {s}")));
    keywords.extend(quick.fallback_prefixes.iter().map(|p| format!("{p} {base}")));
    keywords.truncate(MAX_FALLBACK_KEYWORDS);
    keywords
}

/// Up to ten distinct content keywords: family terms, prefixed, then suffixed.
#[must_use]
pub fn enhanced_keywords(profile: &MarketProfile, base: &str) -> Vec<String> {
    let lowered = base.to_lowercase();
    let quick = &profile.quick;
    let family = quick
        .families
        .iter()
        .filter(|family| !family.enhanced.is_empty())
        .find(|family| triggers_match(&family.triggers, &lowered));

    let candidates = family
        .into_iter()
        .flat_map(|f| f.enhanced.iter().cloned())
        .chain(quick.enhanced_prefixes.iter().map(|p| format!("{p} {base}")))
        .chain(quick.enhanced_suffixes.iter().map(|s| format!("{base} {s}")));

    let mut seen = HashSet::new();
    candidates
        .filter(|keyword| seen.insert(keyword.clone()))
        .take(MAX_ENHANCED_KEYWORDS)
        .collect()
}

/// Related queries worth a lookup: the first three the source returned,
/// lowercased, minus the base keyword and anything of two characters or less.
#[must_use]
pub fn related_keywords(queries: &[String], base: &str) -> Vec<String> {
    let base = base.to_lowercase();
    queries
        .iter()
        .take(MAX_RELATED_KEYWORDS)
        .map(|query| query.trim().to_lowercase())
        .filter(|query| *query != base && query.chars().count() > 2)
        .collect()
}

/// Quick research for one product title.
///
/// The primary phrase is looked up once. When it has data, up to two of its
/// related queries are looked up as well. Dictionary keywords fill the list up
/// to eight entries, which are then ordered by quick score. When the source
/// cannot be reached no request is made and the primary phrase leads its
/// fallbacks and content keywords as placeholder entries.
pub async fn analyze<S, R>(
    generator: &CandidateGenerator,
    fetcher: &TrendsBatchFetcher<S, R>,
    title: &str,
    geo: &str,
    timeframe: &str,
) -> Vec<QuickKeyword>
where
    S: TrendsSource,
    R: Rng + Send,
{
    let base = generator.primary_phrase(title).to_lowercase();
    if base.is_empty() {
        return Vec::new();
    }
    let profile = generator.profile();
    let fallbacks = fallback_keywords(profile, &base);
    let enhanced = enhanced_keywords(profile, &base);

    tracing::info!(keyword = %base, "quick keyword analysis");

    let primary = match fetcher.fetch_single(&base, geo, timeframe).await {
        Ok(primary) => primary,
        Err(e) => {
            tracing::warn!(error = %e, "trends unavailable, using offline quick keywords");
            return offline(&base, fallbacks, enhanced);
        }
    };

    let mut keywords = Vec::with_capacity(QUICK_TARGET);
    let mut seen = HashSet::new();
    if let Some(record) = primary {
        seen.insert(base.clone());
        keywords.push(QuickKeyword::new(
            base.clone(),
            record.interest,
            record.peak_interest,
            record.trend_direction,
            true,
        ));

        let queries = fetcher
            .fetch_related(&base, geo, timeframe)
            .await
            .unwrap_or_default();
        for related in related_keywords(&queries, &base)
            .into_iter()
            .take(MAX_RELATED_LOOKUPS)
        {
            if seen.contains(&related) {
                continue;
            }
            if let Ok(Some(record)) = fetcher.fetch_single(&related, geo, timeframe).await {
                seen.insert(related.clone());
                keywords.push(QuickKeyword::new(
                    related,
                    record.interest,
                    record.peak_interest,
                    record.trend_direction,
                    false,
                ));
            }
        }
    }

    for keyword in fallbacks.into_iter().chain(enhanced) {
        if keywords.len() >= QUICK_TARGET {
            break;
        }
        if seen.insert(keyword.to_lowercase()) {
            keywords.push(QuickKeyword::new(
                keyword,
                FALLBACK_INTEREST,
                FALLBACK_PEAK,
                TrendDirection::Stable,
                false,
            ));
        }
    }

    keywords.sort_by(|a, b| b.score.total_score.total_cmp(&a.score.total_score));
    keywords.truncate(QUICK_TARGET);
    keywords
}

fn offline(base: &str, fallbacks: Vec<String>, enhanced: Vec<String>) -> Vec<QuickKeyword> {
    let mut seen = HashSet::new();
    std::iter::once(base.to_owned())
        .chain(fallbacks)
        .chain(enhanced)
        .filter(|keyword| seen.insert(keyword.to_lowercase()))
        .take(QUICK_TARGET)
        .enumerate()
        .map(|(index, keyword)| {
            QuickKeyword::new(
                keyword,
                OFFLINE_INTEREST,
                OFFLINE_PEAK,
                TrendDirection::Stable,
                index == 0,
            )
        })
        .collect()
}

fn triggers_match(triggers: &[String], lowered: &str) -> bool {
    triggers
        .iter()
        .any(|trigger| !trigger.is_empty() && lowered.contains(trigger.as_str()))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
