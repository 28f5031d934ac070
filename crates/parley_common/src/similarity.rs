//! Graded word and phrase similarity.
//!
//! Tiers short-circuit from strongest to weakest:
//! exact > case-insensitive > stemmed > phonetic > none.

use crate::linguistics::{phonetic_codes, sounds_alike, stem};
use std::collections::BTreeSet;

pub const EXACT_SCORE: f64 = 1.0;
pub const CASE_INSENSITIVE_SCORE: f64 = 0.9;
pub const STEM_SCORE: f64 = 0.7;
pub const PHONETIC_SCORE: f64 = 0.5;
pub const NO_MATCH_SCORE: f64 = 0.0;

/// Similarity tier of a word pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    None,
    Phonetic,
    Stem,
    CaseInsensitive,
    Exact,
}

impl MatchTier {
    pub fn score(self) -> f64 {
        match self {
            MatchTier::Exact => EXACT_SCORE,
            MatchTier::CaseInsensitive => CASE_INSENSITIVE_SCORE,
            MatchTier::Stem => STEM_SCORE,
            MatchTier::Phonetic => PHONETIC_SCORE,
            MatchTier::None => NO_MATCH_SCORE,
        }
    }
}

pub fn match_tier(word: &str, keyword: &str) -> MatchTier {
    if word == keyword {
        return MatchTier::Exact;
    }
    if word.to_lowercase() == keyword.to_lowercase() {
        return MatchTier::CaseInsensitive;
    }
    if stem(word) == stem(keyword) {
        return MatchTier::Stem;
    }
    if sounds_alike(word, keyword) {
        return MatchTier::Phonetic;
    }
    MatchTier::None
}

pub fn word_score(word: &str, keyword: &str) -> f64 {
    match_tier(word, keyword).score()
}

/// Word with its lowercase form, stem and phonetic codes computed once,
/// for scorers that compare the same words many times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWord {
    raw: String,
    lower: String,
    stem: String,
    codes: BTreeSet<String>,
}

impl PreparedWord {
    pub fn new(word: &str) -> Self {
        Self {
            raw: word.to_string(),
            lower: word.to_lowercase(),
            stem: stem(word),
            codes: phonetic_codes(word),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Same tiers as [`match_tier`], without recomputing stems or codes.
    pub fn tier(&self, keyword: &PreparedWord) -> MatchTier {
        if self.raw == keyword.raw {
            MatchTier::Exact
        } else if self.lower == keyword.lower {
            MatchTier::CaseInsensitive
        } else if self.stem == keyword.stem {
            MatchTier::Stem
        } else if !self.codes.is_disjoint(&keyword.codes) {
            MatchTier::Phonetic
        } else {
            MatchTier::None
        }
    }
}

/// Average of `score` over `phrase` aligned against `words` at `start`.
/// Positions past the end of `words` score zero but still count.
fn aligned_score<W, P>(
    words: &[W],
    phrase: &[P],
    start: usize,
    score: impl Fn(&W, &P) -> f64,
) -> f64 {
    if phrase.is_empty() {
        return 0.0;
    }

    let total: f64 = phrase
        .iter()
        .enumerate()
        .map(|(i, p)| match start.checked_add(i).and_then(|j| words.get(j)) {
            Some(w) => score(w, p),
            None => 0.0,
        })
        .sum();

    total / phrase.len() as f64
}

/// Average word score of `phrase` aligned against `words` at `start`.
///
/// Phrase words that run past the end of `words` score zero but still count
/// in the denominator.
pub fn phrase_score<W, P>(words: &[W], phrase: &[P], start: usize) -> f64
where
    W: AsRef<str>,
    P: AsRef<str>,
{
    aligned_score(words, phrase, start, |w, p| word_score(w.as_ref(), p.as_ref()))
}

/// Best `phrase_score` over every start index of `words`.
pub fn best_phrase_score<W, P>(words: &[W], phrase: &[P]) -> f64
where
    W: AsRef<str>,
    P: AsRef<str>,
{
    (0..words.len())
        .map(|start| phrase_score(words, phrase, start))
        .fold(0.0, f64::max)
}

/// `best_phrase_score` over prepared words.
pub fn best_prepared_phrase_score(words: &[PreparedWord], phrase: &[PreparedWord]) -> f64 {
    (0..words.len())
        .map(|start| aligned_score(words, phrase, start, |w, p| w.tier(p).score()))
        .fold(0.0, f64::max)
}
