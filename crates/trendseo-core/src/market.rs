//! Market profile: the dictionaries and weights behind keyword generation and scoring.
//!
//! A profile is loaded once and shared immutably (behind an `Arc`) by the
//! candidate generator and the scorer, so two engines with different tables
//! can run side by side.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const BUILTIN_DANISH_PROFILE: &str = include_str!("../config/market.da.yaml");

/// Tolerance when checking that the score weights add up to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// A category token and the terms associated with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermGroup {
    pub category: String,
    pub terms: Vec<String>,
}

/// Fires when the keyword contains `keyword` and the title contains any of `title_terms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossCategoryRule {
    pub keyword: String,
    pub title_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorGroup {
    pub category: String,
    pub brands: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketMultipliers {
    pub local: f64,
    pub neighbor: f64,
    pub foreign: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub search_volume: f64,
    pub keyword_length: f64,
    pub competition: f64,
    pub relevance: f64,
    pub local_factor: f64,
}

impl ScoreWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.search_volume
            + self.keyword_length
            + self.competition
            + self.relevance
            + self.local_factor
    }

    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("search_volume", self.search_volume),
            ("keyword_length", self.keyword_length),
            ("competition", self.competition),
            ("relevance", self.relevance),
            ("local_factor", self.local_factor),
        ]
    }
}

/// Fallback keyword family for the quick single-keyword path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickFamily {
    /// The family applies when the base keyword contains any trigger.
    pub triggers: Vec<String>,
    #[serde(default)]
    pub fallback: Vec<String>,
    #[serde(default)]
    pub enhanced: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickDictionary {
    #[serde(default)]
    pub families: Vec<QuickFamily>,
    #[serde(default)]
    pub fallback_suffixes: Vec<String>,
    #[serde(default)]
    pub fallback_prefixes: Vec<String>,
    #[serde(default)]
    pub enhanced_prefixes: Vec<String>,
    #[serde(default)]
    pub enhanced_suffixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketProfile {
    pub name: String,
    /// Characters that only occur in the local language.
    pub local_alphabet: String,
    pub local_vocabulary: Vec<String>,
    #[serde(default)]
    pub neighbor_vocabulary: Vec<String>,
    pub stop_words: Vec<String>,
    /// Each character splits a product title; the first segment is the primary phrase.
    pub title_separators: String,
    /// Leading words stripped from the primary phrase (case-insensitive).
    pub title_qualifiers: Vec<String>,
    pub related_qualifiers: Vec<String>,
    pub expansions: Vec<TermGroup>,
    pub product_terms: Vec<TermGroup>,
    #[serde(default)]
    pub cross_category: Vec<CrossCategoryRule>,
    #[serde(default)]
    pub vendors: Vec<VendorGroup>,
    pub multipliers: MarketMultipliers,
    pub weights: ScoreWeights,
    #[serde(default)]
    pub quick: QuickDictionary,
}

impl MarketProfile {
    /// The Danish profile compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the embedded YAML fails to parse or validate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_DANISH_PROFILE)
    }

    /// Parse and validate a profile from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MarketFileParse` on malformed YAML and
    /// `ConfigError::Validation` when the tables are inconsistent.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut profile: MarketProfile = serde_yaml::from_str(content)?;
        profile.normalize();
        profile.validate()?;
        Ok(profile)
    }

    /// Every vendor name across all categories, lowercased and deduplicated.
    #[must_use]
    pub fn brand_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.vendors
            .iter()
            .flat_map(|group| group.brands.iter())
            .map(|brand| brand.trim().to_lowercase())
            .filter(|brand| !brand.is_empty() && seen.insert(brand.clone()))
            .collect()
    }

    /// Lowercase all lookup tables so matching can work on lowercased input.
    fn normalize(&mut self) {
        fn lower_all(values: &mut [String]) {
            for value in values {
                *value = value.trim().to_lowercase();
            }
        }

        self.local_alphabet = self.local_alphabet.to_lowercase();
        lower_all(&mut self.local_vocabulary);
        lower_all(&mut self.neighbor_vocabulary);
        lower_all(&mut self.stop_words);
        lower_all(&mut self.title_qualifiers);
        lower_all(&mut self.related_qualifiers);
        for group in self.expansions.iter_mut().chain(self.product_terms.iter_mut()) {
            group.category = group.category.trim().to_lowercase();
            lower_all(&mut group.terms);
        }
        for rule in &mut self.cross_category {
            rule.keyword = rule.keyword.trim().to_lowercase();
            lower_all(&mut rule.title_terms);
        }
        for family in &mut self.quick.families {
            lower_all(&mut family.triggers);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.title_separators.is_empty() {
            return Err(ConfigError::Validation(
                "title_separators must contain at least one character".to_string(),
            ));
        }

        for (name, weight) in self.weights.entries() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::Validation(format!(
                    "weight '{name}' must be within [0, 1], got {weight}"
                )));
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Validation(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }

        let multipliers = [
            ("local", self.multipliers.local),
            ("neighbor", self.multipliers.neighbor),
            ("foreign", self.multipliers.foreign),
        ];
        for (name, value) in multipliers {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "multiplier '{name}' must be a positive number, got {value}"
                )));
            }
        }

        for group in self.expansions.iter().chain(self.product_terms.iter()) {
            if group.category.is_empty() {
                return Err(ConfigError::Validation(
                    "dictionary category must be non-empty".to_string(),
                ));
            }
        }
        if self.cross_category.iter().any(|rule| rule.keyword.is_empty()) {
            return Err(ConfigError::Validation(
                "cross_category keyword must be non-empty".to_string(),
            ));
        }
        if self
            .quick
            .families
            .iter()
            .any(|family| family.triggers.iter().all(String::is_empty))
        {
            return Err(ConfigError::Validation(
                "quick family needs at least one non-empty trigger".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load a market profile from `path`, or the built-in profile when `path` is `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_market_profile(path: Option<&Path>) -> Result<MarketProfile, ConfigError> {
    let Some(path) = path else {
        return MarketProfile::builtin();
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MarketFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    MarketProfile::from_yaml(&content)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn builtin() -> MarketProfile {
        MarketProfile::builtin().expect("built-in profile must load")
    }

    #[test]
    fn builtin_profile_loads_and_validates() {
        let profile = builtin();
        assert_eq!(profile.name, "denmark");
        assert_eq!(profile.local_alphabet, "æøå");
        assert!((profile.weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(profile.expansions.len(), 5);
        assert_eq!(profile.product_terms.len(), 5);
    }

    #[test]
    fn brand_names_are_flattened_lowercased_and_deduplicated() {
        let brands = builtin().brand_names();
        assert!(brands.contains(&"nordicliving".to_string()));
        assert!(brands.contains(&"elm & mälling".to_string()));
        let nordic = brands.iter().filter(|b| *b == "nordicliving").count();
        assert_eq!(nordic, 1, "NordicLiving appears in two categories");
    }

    #[test]
    fn lookup_tables_are_lowercased_on_load() {
        let yaml = BUILTIN_DANISH_PROFILE.replace("  - premium\n", "  - PREMIUM\n");
        let profile = MarketProfile::from_yaml(&yaml).unwrap();
        assert!(profile.title_qualifiers.contains(&"premium".to_string()));
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let yaml = BUILTIN_DANISH_PROFILE.replace("search_volume: 0.30", "search_volume: 0.50");
        let err = MarketProfile::from_yaml(&yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("sum to 1.0")),
            "expected weight-sum validation error, got: {err:?}"
        );
    }

    #[test]
    fn non_positive_multiplier_is_rejected() {
        let yaml = BUILTIN_DANISH_PROFILE.replace("foreign: 0.85", "foreign: 0.0");
        let err = MarketProfile::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("foreign")));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = MarketProfile::from_yaml("name: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::MarketFileParse(_)));
    }

    #[test]
    fn load_market_profile_without_path_uses_builtin() {
        let profile = load_market_profile(None).unwrap();
        assert_eq!(profile.name, "denmark");
    }

    #[test]
    fn load_market_profile_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let yaml = BUILTIN_DANISH_PROFILE.replace("name: denmark", "name: test-market");
        file.write_all(yaml.as_bytes()).unwrap();
        let profile = load_market_profile(Some(file.path())).unwrap();
        assert_eq!(profile.name, "test-market");
    }

    #[test]
    fn load_market_profile_missing_file_is_io_error() {
        let err = load_market_profile(Some(Path::new("/nonexistent/market.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MarketFileIo { .. }));
    }
}
