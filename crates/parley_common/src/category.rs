//! Preprocessed category classifier.
//!
//! Raw category rules are compiled once: every keyword, phrase and exclusion
//! is normalized and stemmed, and single words also get phonetic codes.
//! Classification then only does set lookups.
//!
//! Exclusions veto the whole rule for an input, phrases included.

use crate::error::{ParleyError, Result};
use crate::linguistics::{phonetic_codes, stem};
use crate::normalize::normalize;
use crate::rulebook::RawCategoryRule;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

pub const DEFAULT_THRESHOLD: f64 = 1.0;
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Outcome of a category classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Category { name: String, score: f64 },
    Unknown,
}

impl Classification {
    pub fn name(&self) -> &str {
        match self {
            Classification::Category { name, .. } => name,
            Classification::Unknown => UNKNOWN_CATEGORY,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Classification::Unknown)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lookup sets for one category rule.
#[derive(Debug, Clone)]
pub struct CompiledCategoryRule {
    pub category: String,
    pub keyword_stems: BTreeSet<String>,
    pub keyword_codes: BTreeSet<String>,
    pub phrases: Vec<Vec<String>>,
    pub exclusion_stems: BTreeSet<String>,
    pub exclusion_codes: BTreeSet<String>,
    pub keyword_weight: f64,
    pub phrase_weight: f64,
}

impl CompiledCategoryRule {
    pub fn compile(raw: &RawCategoryRule) -> Result<Self> {
        let category = raw.category.trim().to_string();
        if category.is_empty() {
            return Err(ParleyError::InvalidRule(
                "category rule without a name".to_string(),
            ));
        }

        let mut rule = Self {
            category,
            keyword_stems: BTreeSet::new(),
            keyword_codes: BTreeSet::new(),
            phrases: Vec::new(),
            exclusion_stems: BTreeSet::new(),
            exclusion_codes: BTreeSet::new(),
            keyword_weight: raw.keyword_weight,
            phrase_weight: raw.effective_phrase_weight(),
        };

        for keyword in &raw.keywords {
            let words = normalize(keyword).words().to_vec();
            match words.len() {
                0 => {}
                1 => {
                    rule.keyword_stems.insert(stem(&words[0]));
                    rule.keyword_codes.extend(phonetic_codes(&words[0]));
                }
                // Multi-word keywords behave as phrases
                _ => rule.phrases.push(words.iter().map(|w| stem(w)).collect()),
            }
        }

        for phrase in &raw.phrases {
            let stems: Vec<String> = normalize(phrase).words().iter().map(|w| stem(w)).collect();
            if !stems.is_empty() {
                rule.phrases.push(stems);
            }
        }

        for exclusion in &raw.exclusions {
            let words = normalize(exclusion).words().to_vec();
            if words.len() == 1 {
                rule.exclusion_codes.extend(phonetic_codes(&words[0]));
            }
            rule.exclusion_stems.extend(words.iter().map(|w| stem(w)));
        }

        if rule.keyword_stems.is_empty() && rule.phrases.is_empty() {
            return Err(ParleyError::InvalidRule(format!(
                "category '{}' has no keywords or phrases",
                rule.category
            )));
        }

        Ok(rule)
    }

    fn is_excluded(&self, input: &[AnalyzedWord]) -> bool {
        input.iter().any(|w| {
            self.exclusion_stems.contains(&w.stem)
                || w.codes.iter().any(|c| self.exclusion_codes.contains(c))
        })
    }

    /// Score before exclusions are considered.
    fn raw_score(&self, input: &[AnalyzedWord]) -> f64 {
        let keyword_hits = input
            .iter()
            .filter(|w| {
                self.keyword_stems.contains(&w.stem)
                    || w.codes.iter().any(|c| self.keyword_codes.contains(c))
            })
            .count();

        let phrase_hits: usize = self
            .phrases
            .iter()
            .map(|phrase| count_runs(input, phrase))
            .sum();

        keyword_hits as f64 * self.keyword_weight + phrase_hits as f64 * self.phrase_weight
    }

    /// Contribution to its category, zero when vetoed.
    fn score(&self, input: &[AnalyzedWord]) -> f64 {
        if self.is_excluded(input) {
            debug!(category = %self.category, "rule vetoed by exclusion");
            return 0.0;
        }
        self.raw_score(input)
    }
}

/// Input word with its stem and phonetic codes, computed once per call.
#[derive(Debug)]
struct AnalyzedWord {
    stem: String,
    codes: BTreeSet<String>,
}

fn analyze(text: &str) -> Vec<AnalyzedWord> {
    normalize(text)
        .words()
        .iter()
        .map(|w| AnalyzedWord {
            stem: stem(w),
            codes: phonetic_codes(w),
        })
        .collect()
}

/// Occurrences of `phrase` as a contiguous stem run, at any start index.
fn count_runs(input: &[AnalyzedWord], phrase: &[String]) -> usize {
    if phrase.is_empty() || phrase.len() > input.len() {
        return 0;
    }
    input
        .windows(phrase.len())
        .filter(|window| window.iter().zip(phrase).all(|(w, p)| &w.stem == p))
        .count()
}

/// Compiled rule table for category classification.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<CompiledCategoryRule>,
}

impl CategoryClassifier {
    pub fn compile(raw_rules: &[RawCategoryRule]) -> Result<Self> {
        if raw_rules.is_empty() {
            return Err(ParleyError::EmptyRuleTable(
                "category classifier needs at least one rule".to_string(),
            ));
        }
        let rules = raw_rules
            .iter()
            .map(CompiledCategoryRule::compile)
            .collect::<Result<Vec<_>>>()?;

        info!(rules = rules.len(), "compiled category rules");
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CompiledCategoryRule] {
        &self.rules
    }

    /// Summed score per category, in first-registered order.
    pub fn scores(&self, text: &str) -> Vec<(String, f64)> {
        let input = analyze(text);
        let mut totals: Vec<(String, f64)> = Vec::new();

        for rule in &self.rules {
            let score = rule.score(&input);
            match totals.iter_mut().find(|(name, _)| *name == rule.category) {
                Some((_, total)) => *total += score,
                None => totals.push((rule.category.clone(), score)),
            }
        }
        totals
    }

    /// Best category at or above `threshold`, else unknown.
    ///
    /// Ties go to the category registered first. A category needs a
    /// positive score to be chosen regardless of the threshold.
    pub fn classify(&self, text: &str, threshold: f64) -> Classification {
        let mut best: Option<(String, f64)> = None;
        for (name, score) in self.scores(text) {
            let better = match &best {
                Some((_, top)) => score > *top,
                None => true,
            };
            if better {
                best = Some((name, score));
            }
        }

        let result = match best {
            Some((name, score)) if score > 0.0 && score >= threshold => {
                Classification::Category { name, score }
            }
            _ => Classification::Unknown,
        };
        debug!(result = %result, threshold, "category classification");
        result
    }

    pub fn classify_default(&self, text: &str) -> Classification {
        self.classify(text, DEFAULT_THRESHOLD)
    }
}
