//! Keyword table entries for the pattern bot.

use super::pattern::{reassemble, DecompositionPattern};
use crate::error::{ParleyError, Result};
use crate::rulebook::{RawDecomposition, RawKeyword};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DecompositionRule {
    pub pattern: DecompositionPattern,
    pub reassemblies: Vec<String>,
}

impl DecompositionRule {
    pub fn compile(raw: &RawDecomposition) -> Result<Self> {
        let pattern = DecompositionPattern::parse(&raw.pattern)?;
        if raw.reassemblies.is_empty() {
            return Err(ParleyError::InvalidRule(format!(
                "decomposition '{}' has no reassembly templates",
                raw.pattern
            )));
        }
        Ok(Self {
            pattern,
            reassemblies: raw.reassemblies.clone(),
        })
    }

    /// All filled templates for `input`, or `None` if the pattern misses.
    pub fn candidates(&self, input: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(input)?;
        Some(
            self.reassemblies
                .iter()
                .map(|t| reassemble(t, input, &captures))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Keyword {
    pub word: String,
    pub priority: i32,
    pub decompositions: Vec<DecompositionRule>,
    /// Replies used when no decomposition matches
    pub defaults: Vec<String>,
}

impl Keyword {
    pub fn compile(raw: &RawKeyword) -> Result<Self> {
        let word = crate::normalize::normalize(&raw.word).text().to_string();
        if word.is_empty() {
            return Err(ParleyError::InvalidRule(format!(
                "keyword '{}' is empty after normalization",
                raw.word
            )));
        }
        let decompositions = raw
            .decompositions
            .iter()
            .map(DecompositionRule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            word,
            priority: raw.priority,
            decompositions,
            defaults: raw.defaults.clone(),
        })
    }

    /// Keyword occurs as a substring of the normalized input.
    pub fn occurs_in(&self, normalized: &str) -> bool {
        normalized.contains(&self.word)
    }

    /// First decomposition that matches, with its filled templates.
    pub fn decompose(&self, normalized: &str) -> Option<(&DecompositionRule, Vec<String>)> {
        self.decompositions
            .iter()
            .find_map(|rule| rule.candidates(normalized).map(|c| (rule, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_keyword() -> RawKeyword {
        RawKeyword {
            word: "I am".to_string(),
            priority: 3,
            decompositions: vec![
                RawDecomposition {
                    pattern: "i am sad *".to_string(),
                    reassemblies: vec!["Sad (1)?".to_string()],
                },
                RawDecomposition {
                    pattern: "i am *".to_string(),
                    reassemblies: vec![
                        "Why do you say you are (1)?".to_string(),
                        "How long have you been (1)?".to_string(),
                    ],
                },
            ],
            defaults: vec!["Tell me more.".to_string()],
        }
    }

    #[test]
    fn test_compile_normalizes_word() {
        let k = Keyword::compile(&raw_keyword()).unwrap();
        assert_eq!(k.word, "i am");
        assert!(k.occurs_in("well i am fine"));
    }

    #[test]
    fn test_first_matching_decomposition_wins() {
        let k = Keyword::compile(&raw_keyword()).unwrap();
        let (rule, candidates) = k.decompose("i am feeling happy").unwrap();
        assert_eq!(rule.pattern.source(), "i am *");
        assert_eq!(candidates[0], "Why do you say you are feeling happy?");
        assert_eq!(candidates[1], "How long have you been feeling happy?");
    }

    #[test]
    fn test_no_decomposition() {
        let k = Keyword::compile(&raw_keyword()).unwrap();
        assert!(k.decompose("i am").is_none());
    }

    #[test]
    fn test_bad_tables_rejected() {
        let mut raw = raw_keyword();
        raw.decompositions[0].pattern = "* am *".to_string();
        assert!(matches!(
            Keyword::compile(&raw),
            Err(ParleyError::MultipleWildcards { .. })
        ));

        let mut raw = raw_keyword();
        raw.decompositions[1].reassemblies.clear();
        assert!(Keyword::compile(&raw).is_err());

        let mut raw = raw_keyword();
        raw.word = "?!".to_string();
        assert!(Keyword::compile(&raw).is_err());
    }
}
