//! Market tagging for keywords.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use trendseo_core::MarketProfile;

/// Which market a keyword most plausibly belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    Local,
    /// A closely related secondary market; only produced when the profile
    /// lists a neighbor vocabulary.
    Neighbor,
    Foreign,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Market::Local => "local",
            Market::Neighbor => "neighbor",
            Market::Foreign => "foreign",
        })
    }
}

#[derive(Debug, Clone)]
pub struct LanguageDetector {
    alphabet: Vec<char>,
    local_vocabulary: HashSet<String>,
    neighbor_vocabulary: HashSet<String>,
}

impl LanguageDetector {
    #[must_use]
    pub fn new(profile: &MarketProfile) -> Self {
        Self {
            alphabet: profile.local_alphabet.chars().collect(),
            local_vocabulary: profile.local_vocabulary.iter().cloned().collect(),
            neighbor_vocabulary: profile.neighbor_vocabulary.iter().cloned().collect(),
        }
    }

    /// Local-alphabet characters win, then local vocabulary, then neighbor
    /// vocabulary; anything else is foreign.
    #[must_use]
    pub fn detect(&self, keyword: &str) -> Market {
        let lowered = keyword.to_lowercase();
        if lowered.chars().any(|c| self.alphabet.contains(&c)) {
            return Market::Local;
        }
        let mut tokens = lowered.split_whitespace();
        if tokens
            .clone()
            .any(|token| self.local_vocabulary.contains(token))
        {
            return Market::Local;
        }
        if tokens.any(|token| self.neighbor_vocabulary.contains(token)) {
            return Market::Neighbor;
        }
        Market::Foreign
    }
}
