//! Plain-text tables for terminal output.

use trendseo_core::create_handle;
use trendseo_keywords::{AnalysisResult, QuickKeyword};

const KEYWORD_WIDTH: usize = 28;

pub(crate) fn print_analysis(result: &AnalysisResult, limit: usize) {
    let summary = result.summary();
    println!("Product: {}", result.title);
    if !result.category.is_empty() {
        println!("Category: {}", result.category);
    }
    println!(
        "Keywords: {} ({} base, {} related), average score {:.1}",
        summary.total_keywords, summary.base_count, summary.related_count, summary.average_score
    );
    if summary.synthetic_trends > 0 {
        println!(
            "note: {} keyword(s) use synthetic trend data",
            summary.synthetic_trends
        );
    }

    if result.ranked.is_empty() {
        println!("no keywords could be generated for this product");
        return;
    }

    println!();
    println!(
        "{:<4}{:<width$}{:<9}{:>7}{:>6}  {:<10}{:<20}{}",
        "#",
        "KEYWORD",
        "ORIGIN",
        "SCORE",
        "GRADE",
        "INTEREST",
        "TREND",
        "DATA",
        width = KEYWORD_WIDTH
    );
    for (index, ranked) in result.top(limit).iter().enumerate() {
        let origin = if ranked.candidate.is_base() {
            "base"
        } else {
            "related"
        };
        println!(
            "{:<4}{:<width$}{:<9}{:>7.1}{:>6}  {:<10.1}{:<20}{}",
            index + 1,
            truncate(&ranked.candidate.keyword, KEYWORD_WIDTH - 2),
            origin,
            ranked.score.total_score,
            ranked.score.grade.to_string(),
            ranked.trend.interest,
            ranked.trend.trend_direction.to_string(),
            ranked.trend.reliability.to_string(),
            width = KEYWORD_WIDTH
        );
    }

    if let Some(best) = result.best() {
        println!();
        println!(
            "Suggested handle: {}",
            create_handle(&best.candidate.keyword)
        );
    }
}

pub(crate) fn print_quick(keywords: &[QuickKeyword]) {
    if keywords.is_empty() {
        println!("no primary phrase found in title");
        return;
    }
    println!(
        "{:<4}{:<width$}{:>7}{:>6}  {:<10}{:<12}{}",
        "#",
        "KEYWORD",
        "SCORE",
        "GRADE",
        "INTEREST",
        "TREND",
        "BASE",
        width = KEYWORD_WIDTH
    );
    for (index, keyword) in keywords.iter().enumerate() {
        println!(
            "{:<4}{:<width$}{:>7.1}{:>6}  {:<10.0}{:<12}{}",
            index + 1,
            truncate(&keyword.keyword, KEYWORD_WIDTH - 2),
            keyword.score.total_score,
            keyword.score.grade.to_string(),
            keyword.interest,
            keyword.trend_direction.to_string(),
            if keyword.is_base { "yes" } else { "" },
            width = KEYWORD_WIDTH
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!(
            "{}...",
            text.chars().take(max_chars.saturating_sub(3)).collect::<String>()
        )
    } else {
        text.to_owned()
    }
}
