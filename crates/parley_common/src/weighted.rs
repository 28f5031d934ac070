//! Weighted classification engine.
//!
//! Every rule turns the raw input into a keyed weight map. Categories whose
//! map totals a positive value are returned best first; equal totals keep
//! rule order.

use crate::normalize::{normalize, words_preserving_case};
use crate::similarity::{best_prepared_phrase_score, PreparedWord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Minimum phrase alignment counted by phrase-based rules.
pub const MIN_PHRASE_SCORE: f64 = 0.5;

/// Signed weights keyed by what produced them (usually a phrase).
///
/// Zero weights are never retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightedScore {
    weights: BTreeMap<String, f64>,
}

impl WeightedScore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to `key`, dropping the key if it cancels out.
    pub fn add(&mut self, key: impl Into<String>, weight: f64) {
        let key = key.into();
        let sum = self.weights.get(&key).copied().unwrap_or(0.0) + weight;
        if sum == 0.0 {
            self.weights.remove(&key);
        } else {
            self.weights.insert(key, sum);
        }
    }

    pub fn add_all(&mut self, other: &WeightedScore) {
        for (key, weight) in &other.weights {
            self.add(key.clone(), *weight);
        }
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.weights.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

type ScoreFn = Box<dyn Fn(&str) -> WeightedScore + Send + Sync>;

/// Category plus the function that scores raw text for it.
pub struct WeightedRule {
    category: String,
    score_fn: ScoreFn,
}

impl fmt::Debug for WeightedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedRule")
            .field("category", &self.category)
            .finish()
    }
}

impl WeightedRule {
    pub fn new<F>(category: impl Into<String>, score_fn: F) -> Self
    where
        F: Fn(&str) -> WeightedScore + Send + Sync + 'static,
    {
        Self {
            category: category.into(),
            score_fn: Box::new(score_fn),
        }
    }

    /// Rule scoring each phrase by its best fuzzy alignment in the input.
    ///
    /// A phrase contributes `weight * alignment` when the alignment reaches
    /// [`MIN_PHRASE_SCORE`]. Negative weights make a penalty rule.
    pub fn from_phrases<S: AsRef<str>>(
        category: impl Into<String>,
        phrases: &[S],
        weight: f64,
    ) -> Self {
        // Stems and phonetic codes of the phrases are computed once here
        let phrases: Vec<(String, Vec<PreparedWord>)> = phrases
            .iter()
            .map(|p| {
                let n = normalize(p.as_ref());
                let words = n.words().iter().map(|w| PreparedWord::new(w)).collect();
                (n.text().to_string(), words)
            })
            .filter(|(_, words): &(String, Vec<PreparedWord>)| !words.is_empty())
            .collect();

        Self::new(category, move |text| {
            let words: Vec<PreparedWord> = words_preserving_case(text)
                .iter()
                .map(|w| PreparedWord::new(w))
                .collect();
            let mut score = WeightedScore::new();
            for (key, phrase) in &phrases {
                let alignment = best_prepared_phrase_score(&words, phrase);
                if alignment >= MIN_PHRASE_SCORE {
                    score.add(key.clone(), alignment * weight);
                }
            }
            score
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn evaluate(&self, text: &str) -> WeightedScore {
        (self.score_fn)(text)
    }
}

/// Category with the weight map that earned its rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: WeightedScore,
}

impl CategoryScore {
    pub fn total(&self) -> f64 {
        self.score.total()
    }
}

/// Rank categories for `text`, best first.
pub fn classify(text: &str, rules: &[WeightedRule]) -> Vec<CategoryScore> {
    let mut ranked: Vec<CategoryScore> = rules
        .iter()
        .map(|rule| CategoryScore {
            category: rule.category.clone(),
            score: rule.evaluate(text),
        })
        .filter(|entry| entry.total() > 0.0)
        .collect();

    // sort_by is stable, so ties keep rule order
    ranked.sort_by(|a, b| b.total().total_cmp(&a.total()));

    tracing::debug!(
        candidates = ranked.len(),
        best = ranked.first().map(|c| c.category.as_str()).unwrap_or("-"),
        "weighted classification"
    );
    ranked
}

/// Top `n` category names.
pub fn classify_top(text: &str, rules: &[WeightedRule], n: usize) -> Vec<String> {
    classify(text, rules)
        .into_iter()
        .take(n)
        .map(|c| c.category)
        .collect()
}
