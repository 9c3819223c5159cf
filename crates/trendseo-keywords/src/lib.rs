//! Keyword research for product listings.
//!
//! [`KeywordPipeline`] turns a product title and category into ranked keyword
//! candidates: [`CandidateGenerator`] proposes base and related keywords, the
//! trends fetcher attaches interest data, and [`SeoScorer`] grades each one.
//! The [`quick`] module holds the lighter single-request variant.

pub mod candidates;
pub mod error;
pub mod language;
pub mod pipeline;
pub mod quick;
pub mod scorer;
pub mod types;

pub use candidates::CandidateGenerator;
pub use error::KeywordsError;
pub use language::{LanguageDetector, Market};
pub use pipeline::KeywordPipeline;
pub use quick::{QuickKeyword, QuickScore};
pub use scorer::SeoScorer;
pub use types::{
    AnalysisResult, AnalysisSummary, ComponentScores, Grade, KeywordCandidate, Origin,
    RankedKeyword, SeoScore,
};
