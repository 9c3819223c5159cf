use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeywordsError {
    #[error("market profile produced an invalid {name} pattern: {source}")]
    InvalidPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}
