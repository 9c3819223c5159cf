//! Shared configuration for the trendseo workspace.
//!
//! Holds the environment-driven [`AppConfig`], the YAML [`MarketProfile`]
//! that carries every market-specific dictionary and scoring weight, and a
//! few small helpers used by more than one crate.

pub mod app_config;
pub mod config;
pub mod handle;
pub mod market;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use handle::create_handle;
pub use market::{
    load_market_profile, CrossCategoryRule, MarketMultipliers, MarketProfile, QuickDictionary,
    QuickFamily, ScoreWeights, TermGroup, VendorGroup,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read market profile {path}: {source}")]
    MarketFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse market profile: {0}")]
    MarketFileParse(#[from] serde_yaml::Error),

    #[error("market profile validation failed: {0}")]
    Validation(String),
}
