//! Candidate keyword generation from a product title and category.
//!
//! Generation is pure: the same title, category, and profile always yield the
//! same ordered candidates.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use trendseo_core::MarketProfile;

use crate::error::KeywordsError;

/// Shortest keyword or token worth keeping.
const MIN_KEYWORD_CHARS: usize = 3;
/// Title tokens contributed to the base set.
const MAX_TITLE_TOKENS: usize = 4;
pub const MAX_BASE_KEYWORDS: usize = 8;
pub const MAX_RELATED_KEYWORDS: usize = 15;
/// Longest generated combination, in characters.
pub const MAX_COMBINATION_CHARS: usize = 25;

#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    profile: Arc<MarketProfile>,
    token_pattern: Regex,
    qualifier_pattern: Option<Regex>,
    stop_words: HashSet<String>,
}

impl CandidateGenerator {
    /// Compile the title patterns for `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordsError::InvalidPattern`] if the profile's alphabet or
    /// qualifier words cannot be turned into a regular expression.
    pub fn new(profile: Arc<MarketProfile>) -> Result<Self, KeywordsError> {
        let alphabet: String = profile
            .local_alphabet
            .chars()
            .chain(profile.local_alphabet.to_uppercase().chars())
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        let token_pattern = Regex::new(&format!(
            r"\b[a-zA-Z{alphabet}]{{{MIN_KEYWORD_CHARS},}}\b"
        ))
        .map_err(|source| KeywordsError::InvalidPattern {
            name: "title token",
            source,
        })?;

        let qualifier_pattern = if profile.title_qualifiers.is_empty() {
            None
        } else {
            let words = profile
                .title_qualifiers
                .iter()
                .map(|q| regex::escape(q))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                Regex::new(&format!(r"(?i)^(?:{words})\s+")).map_err(|source| {
                    KeywordsError::InvalidPattern {
                        name: "title qualifier",
                        source,
                    }
                })?,
            )
        };

        let stop_words = profile.stop_words.iter().cloned().collect();
        Ok(Self {
            profile,
            token_pattern,
            qualifier_pattern,
            stop_words,
        })
    }

    #[must_use]
    pub fn profile(&self) -> &MarketProfile {
        &self.profile
    }

    /// The first title segment with a leading qualifier word removed, case kept.
    #[must_use]
    pub fn primary_phrase(&self, title: &str) -> String {
        let separators = &self.profile.title_separators;
        let first = title
            .split(|c: char| separators.contains(c))
            .next()
            .unwrap_or_default()
            .trim();
        match &self.qualifier_pattern {
            Some(pattern) => pattern.replace(first, "").into_owned(),
            None => first.to_owned(),
        }
    }

    /// Base keywords: the primary phrase, category tokens, then up to four
    /// title tokens, deduplicated in that order and capped at eight.
    #[must_use]
    pub fn extract_base(&self, title: &str, category: &str) -> Vec<String> {
        let mut keywords = Vec::new();

        let primary = self.primary_phrase(title);
        if char_len(&primary) >= MIN_KEYWORD_CHARS {
            keywords.push(primary.to_lowercase());
        }

        if char_len(category) >= MIN_KEYWORD_CHARS {
            keywords.extend(
                category
                    .to_lowercase()
                    .split_whitespace()
                    .filter(|word| char_len(word) >= MIN_KEYWORD_CHARS)
                    .map(str::to_owned),
            );
        }

        let lowered_title = title.to_lowercase();
        keywords.extend(
            self.token_pattern
                .find_iter(&lowered_title)
                .map(|m| m.as_str())
                .filter(|word| !self.stop_words.contains(*word))
                .take(MAX_TITLE_TOKENS)
                .map(str::to_owned),
        );

        let mut seen = HashSet::new();
        keywords
            .into_iter()
            .filter(|keyword| char_len(keyword) >= MIN_KEYWORD_CHARS && seen.insert(keyword.clone()))
            .take(MAX_BASE_KEYWORDS)
            .collect()
    }

    /// Related keywords from base pairs, the expansion dictionary, and
    /// qualifier prefixes. Never contains a base keyword; capped at fifteen.
    #[must_use]
    pub fn expand_related(&self, base: &[String], title: &str) -> Vec<String> {
        let lowered_title = title.to_lowercase();
        let mut related = Vec::new();

        for (index, keyword) in base.iter().enumerate() {
            for other in &base[index + 1..] {
                if other != keyword {
                    push_combination(&mut related, keyword, other);
                }
            }

            for group in &self.profile.expansions {
                if !keyword.contains(&group.category) && !lowered_title.contains(&group.category) {
                    continue;
                }
                for expansion in &group.terms {
                    if !base.contains(expansion) {
                        related.push(expansion.clone());
                    }
                    push_combination(&mut related, keyword, expansion);
                }
            }

            for qualifier in &self.profile.related_qualifiers {
                push_combination(&mut related, qualifier, keyword);
            }
        }

        let mut seen: HashSet<&str> = base.iter().map(String::as_str).collect();
        let mut unique = Vec::new();
        for keyword in &related {
            if seen.insert(keyword.as_str()) {
                unique.push(keyword.clone());
                if unique.len() == MAX_RELATED_KEYWORDS {
                    break;
                }
            }
        }
        unique
    }
}

fn push_combination(out: &mut Vec<String>, first: &str, second: &str) {
    let combo = format!("{first} {second}");
    if char_len(&combo) <= MAX_COMBINATION_CHARS {
        out.push(combo);
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: &str = "Kageskraber i Stål – Professionel Model";
    const CATEGORY: &str = "Bagning & Dekoration";

    fn generator() -> CandidateGenerator {
        CandidateGenerator::new(Arc::new(MarketProfile::builtin().unwrap())).unwrap()
    }

    fn owned(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    #[test]
    fn primary_phrase_takes_first_segment_and_strips_qualifier() {
        let generator = generator();
        assert_eq!(generator.primary_phrase(TITLE), "Kageskraber i Stål");
        assert_eq!(generator.primary_phrase("Premium Kaffekværn | Sort"), "Kaffekværn");
        assert_eq!(generator.primary_phrase("NEW  Lampe-Sæt"), "Lampe");
        assert_eq!(generator.primary_phrase("Newton vugge"), "Newton vugge");
    }

    #[test]
    fn base_keywords_for_cake_scraper() {
        let base = generator().extract_base(TITLE, CATEGORY);
        assert_eq!(
            base,
            owned(&[
                "kageskraber i stål",
                "bagning",
                "dekoration",
                "kageskraber",
                "stål",
                "professionel",
                "model",
            ])
        );
        assert!(!base.contains(&"i".to_owned()));
    }

    #[test]
    fn extract_base_is_idempotent() {
        let generator = generator();
        assert_eq!(
            generator.extract_base(TITLE, CATEGORY),
            generator.extract_base(TITLE, CATEGORY)
        );
    }

    #[test]
    fn base_is_capped_at_eight_and_never_padded() {
        let generator = generator();
        let base = generator.extract_base(
            "Alpha beta gamma delta epsilon zeta eta theta",
            "one two three four five six",
        );
        assert_eq!(base.len(), MAX_BASE_KEYWORDS);

        assert!(generator.extract_base("", "").is_empty());
        assert_eq!(generator.extract_base("Te", "Ur"), Vec::<String>::new());
    }

    #[test]
    fn title_tokens_skip_stop_words_and_keep_first_four() {
        let base = generator().extract_base("x | lampe med skærm til bord fra kontor og stue", "");
        assert_eq!(base, owned(&["lampe", "skærm", "bord", "kontor"]));
    }

    #[test]
    fn related_combines_each_unordered_pair_once() {
        let related = generator().expand_related(&owned(&["lampe", "skærm"]), "lampe skærm");
        assert!(related.contains(&"lampe skærm".to_owned()));
        assert!(!related.contains(&"skærm lampe".to_owned()));
    }

    #[test]
    fn related_uses_expansion_dictionary_when_category_matches() {
        let related = generator().expand_related(&owned(&["køkkenur"]), "Køkkenur i messing");
        assert!(related.contains(&"køkkenredskaber".to_owned()));
        assert!(related.contains(&"køkkenur madlavning".to_owned()));
    }

    #[test]
    fn related_respects_length_cap_and_excludes_base() {
        let base = owned(&["kageskraber i stål", "bagning", "professionel"]);
        let related = generator().expand_related(&base, TITLE);
        assert!(related.len() <= MAX_RELATED_KEYWORDS);
        for keyword in &related {
            assert!(keyword.chars().count() <= MAX_COMBINATION_CHARS, "{keyword}");
            assert!(!base.contains(keyword), "{keyword} is a base keyword");
        }
        let unique: HashSet<&String> = related.iter().collect();
        assert_eq!(unique.len(), related.len());
    }

    #[test]
    fn related_adds_qualifier_prefixes() {
        let related = generator().expand_related(&owned(&["lampe"]), "Lampe");
        assert_eq!(
            related,
            owned(&[
                "professionel lampe",
                "kvalitet lampe",
                "bedste lampe",
                "god lampe",
                "smart lampe",
                "moderne lampe",
            ])
        );
    }

    #[test]
    fn no_base_means_no_related() {
        assert!(generator().expand_related(&[], TITLE).is_empty());
    }
}
