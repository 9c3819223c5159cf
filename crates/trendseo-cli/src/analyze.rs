//! `analyze`, `score`, and `quick` command handlers.

use std::sync::Arc;
use std::time::Duration;

use trendseo_core::{AppConfig, MarketProfile};
use trendseo_keywords::{AnalysisResult, KeywordPipeline, SeoScorer};
use trendseo_trends::{
    FetcherSettings, HttpSourceSettings, HttpTrendsSource, TrendRecord, TrendsBatchFetcher,
};

use crate::output;

pub(crate) type HttpPipeline = KeywordPipeline<HttpTrendsSource>;

pub(crate) fn source_settings(config: &AppConfig) -> HttpSourceSettings {
    HttpSourceSettings {
        base_url: config.trends_base_url.clone(),
        hl: config.trends_hl.clone(),
        timeout_secs: config.trends_timeout_secs,
        max_retries: config.trends_max_retries,
        backoff_base_ms: config.trends_backoff_base_ms,
        ..HttpSourceSettings::default()
    }
}

pub(crate) fn fetcher_settings(config: &AppConfig) -> FetcherSettings {
    FetcherSettings {
        batch_size: config.trends_batch_size,
        min_delay: Duration::from_millis(config.trends_min_delay_ms),
        cache: config.trends_cache,
    }
}

/// Wire the HTTP trends source, the rate-limited fetcher, and the scorer.
///
/// # Errors
///
/// Returns an error if the trends base URL is invalid or the market profile
/// cannot be compiled into title patterns.
pub(crate) fn build_pipeline(
    config: &AppConfig,
    profile: Arc<MarketProfile>,
) -> anyhow::Result<HttpPipeline> {
    let source = HttpTrendsSource::new(&source_settings(config))?;
    let fetcher = TrendsBatchFetcher::new(source, fetcher_settings(config));
    let pipeline = KeywordPipeline::new(
        profile,
        fetcher,
        config.trends_geo.clone(),
        config.trends_timeframe.clone(),
    )?;
    Ok(pipeline)
}

pub(crate) async fn analyze_product(
    pipeline: &HttpPipeline,
    title: &str,
    category: &str,
    skip_trends: bool,
) -> AnalysisResult {
    if skip_trends {
        pipeline.analyze_offline(title, category)
    } else {
        pipeline.analyze(title, category).await
    }
}

/// Analyze one product and print its ranking.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub(crate) async fn run_analyze(
    pipeline: &HttpPipeline,
    title: &str,
    category: &str,
    skip_trends: bool,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let result = analyze_product(pipeline, title, category, skip_trends).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_analysis(&result, limit);
    }
    Ok(())
}

/// Score a single keyword with an assumed interest.
///
/// # Errors
///
/// Returns an error if the interest is outside `0..=100` or the score cannot
/// be serialized.
pub(crate) fn run_score(
    profile: Arc<MarketProfile>,
    keyword: &str,
    interest: f64,
    title: &str,
    category: &str,
) -> anyhow::Result<()> {
    if !(0.0..=100.0).contains(&interest) {
        anyhow::bail!("--interest must be between 0 and 100, got {interest}");
    }
    let scorer = SeoScorer::new(profile);
    let trend = TrendRecord::assumed(keyword, interest);
    let score = scorer.score(keyword, &trend, title, category, &[]);
    println!("{}", serde_json::to_string_pretty(&score)?);
    Ok(())
}

/// Run the quick path for one title.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub(crate) async fn run_quick(pipeline: &HttpPipeline, title: &str, json: bool) -> anyhow::Result<()> {
    let keywords = pipeline.quick(title).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&keywords)?);
    } else {
        output::print_quick(&keywords);
    }
    Ok(())
}
