//! End-to-end keyword analysis for one product.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use trendseo_core::MarketProfile;
use trendseo_trends::{TrendRecord, TrendsBatchFetcher, TrendsSource};

use crate::candidates::CandidateGenerator;
use crate::error::KeywordsError;
use crate::quick::{self, QuickKeyword};
use crate::scorer::SeoScorer;
use crate::types::{AnalysisResult, KeywordCandidate, RankedKeyword, SeoScore};

/// Interest assumed for every keyword when trends are skipped.
pub const ASSUMED_INTEREST: f64 = 50.0;

/// Generates candidates, fetches their trends, and ranks them by SEO score.
pub struct KeywordPipeline<S, R = StdRng> {
    generator: CandidateGenerator,
    scorer: SeoScorer,
    fetcher: TrendsBatchFetcher<S, R>,
    geo: String,
    timeframe: String,
}

impl<S: TrendsSource, R: Rng + Send> KeywordPipeline<S, R> {
    /// # Errors
    ///
    /// Returns [`KeywordsError::InvalidPattern`] if the profile cannot be
    /// compiled into title patterns.
    pub fn new(
        profile: Arc<MarketProfile>,
        fetcher: TrendsBatchFetcher<S, R>,
        geo: impl Into<String>,
        timeframe: impl Into<String>,
    ) -> Result<Self, KeywordsError> {
        Ok(Self {
            generator: CandidateGenerator::new(Arc::clone(&profile))?,
            scorer: SeoScorer::new(profile),
            fetcher,
            geo: geo.into(),
            timeframe: timeframe.into(),
        })
    }

    /// Treat `brands` as known vendors when estimating competition.
    #[must_use]
    pub fn with_additional_brands<I, B>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<str>,
    {
        self.scorer = self.scorer.with_additional_brands(brands);
        self
    }

    #[must_use]
    pub fn generator(&self) -> &CandidateGenerator {
        &self.generator
    }

    #[must_use]
    pub fn scorer(&self) -> &SeoScorer {
        &self.scorer
    }

    #[must_use]
    pub fn fetcher(&self) -> &TrendsBatchFetcher<S, R> {
        &self.fetcher
    }

    /// Rank every base and related keyword for a product.
    ///
    /// Every candidate is scored even when no trend data could be fetched;
    /// such candidates carry synthetic records flagged by their reliability.
    pub async fn analyze(&self, title: &str, category: &str) -> AnalysisResult {
        let base = self.generator.extract_base(title, category);
        let related = self.generator.expand_related(&base, title);

        let mut keywords = Vec::with_capacity(base.len() + related.len());
        keywords.extend(base.iter().cloned());
        keywords.extend(related.iter().cloned());
        let trends = self
            .fetcher
            .fetch_batch(&keywords, &self.geo, &self.timeframe)
            .await;

        let candidates = base
            .iter()
            .map(KeywordCandidate::base)
            .chain(related.iter().map(KeywordCandidate::related));
        let ranked = self.rank(candidates, &trends, title, category, &related);

        let result = AnalysisResult {
            title: title.to_owned(),
            category: category.to_owned(),
            base_keywords: base,
            related_keywords: related,
            ranked,
            analyzed_at: Utc::now(),
        };
        log_summary(&result);
        result
    }

    /// Rank base keywords with an assumed interest, without contacting the source.
    #[must_use]
    pub fn analyze_offline(&self, title: &str, category: &str) -> AnalysisResult {
        let base = self.generator.extract_base(title, category);
        let trends: HashMap<String, TrendRecord> = base
            .iter()
            .map(|keyword| (keyword.clone(), TrendRecord::assumed(keyword, ASSUMED_INTEREST)))
            .collect();

        let ranked = self.rank(
            base.iter().map(KeywordCandidate::base),
            &trends,
            title,
            category,
            &[],
        );

        let result = AnalysisResult {
            title: title.to_owned(),
            category: category.to_owned(),
            base_keywords: base,
            related_keywords: Vec::new(),
            ranked,
            analyzed_at: Utc::now(),
        };
        log_summary(&result);
        result
    }

    /// Score a single keyword against a known trend record.
    #[must_use]
    pub fn score(
        &self,
        keyword: &str,
        trend: &TrendRecord,
        title: &str,
        category: &str,
        related: &[String],
    ) -> SeoScore {
        self.scorer.score(keyword, trend, title, category, related)
    }

    /// Run the lighter quick path for `title`.
    pub async fn quick(&self, title: &str) -> Vec<QuickKeyword> {
        quick::analyze(
            &self.generator,
            &self.fetcher,
            title,
            &self.geo,
            &self.timeframe,
        )
        .await
    }

    fn rank(
        &self,
        candidates: impl Iterator<Item = KeywordCandidate>,
        trends: &HashMap<String, TrendRecord>,
        title: &str,
        category: &str,
        related: &[String],
    ) -> Vec<RankedKeyword> {
        let mut ranked: Vec<RankedKeyword> = candidates
            .map(|candidate| {
                let trend = trends
                    .get(&candidate.keyword)
                    .cloned()
                    .unwrap_or_else(|| TrendRecord::no_data(&candidate.keyword));
                let score = self
                    .scorer
                    .score(&candidate.keyword, &trend, title, category, related);
                RankedKeyword {
                    candidate,
                    trend,
                    score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_score.total_cmp(&a.score.total_score));
        ranked
    }
}

fn log_summary(result: &AnalysisResult) {
    let summary = result.summary();
    tracing::info!(
        title = %result.title,
        keywords = summary.total_keywords,
        base = summary.base_count,
        related = summary.related_count,
        synthetic = summary.synthetic_trends,
        best = summary.best_keyword.as_deref().unwrap_or("-"),
        best_score = summary.best_score,
        "keyword analysis complete"
    );
}
