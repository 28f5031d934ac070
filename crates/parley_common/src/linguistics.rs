//! Stemming and phonetic primitives.
//!
//! Thin wrappers so the scorers only depend on equality of stems and
//! intersection of phonetic code sets.

use rphonetic::{DoubleMetaphone, Encoder};
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

fn encoder() -> &'static DoubleMetaphone {
    static ENCODER: OnceLock<DoubleMetaphone> = OnceLock::new();
    ENCODER.get_or_init(DoubleMetaphone::default)
}

/// English Snowball stem of a word. Case-insensitive.
pub fn stem(word: &str) -> String {
    stemmer().stem(&word.to_lowercase()).to_string()
}

/// Primary and alternate Double Metaphone codes.
///
/// Empty for input without alphabetic characters.
pub fn phonetic_codes(word: &str) -> BTreeSet<String> {
    let mut codes = BTreeSet::new();
    if !word.chars().any(|c| c.is_alphabetic()) {
        return codes;
    }

    let encoder = encoder();
    for code in [encoder.encode(word), encoder.encode_alternate(word)] {
        if !code.is_empty() {
            codes.insert(code);
        }
    }
    codes
}

/// True when the two words share at least one phonetic code.
pub fn sounds_alike(a: &str, b: &str) -> bool {
    let codes_a = phonetic_codes(a);
    if codes_a.is_empty() {
        return false;
    }
    phonetic_codes(b).iter().any(|code| codes_a.contains(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_reduces_inflections() {
        assert_eq!(stem("running"), stem("run"));
        assert_eq!(stem("computers"), stem("computer"));
        assert_eq!(stem("Running"), stem("running"));
    }

    #[test]
    fn test_stem_idempotent() {
        let once = stem("connections");
        assert_eq!(stem(&once), once);
    }

    #[test]
    fn test_phonetic_codes_empty_input() {
        assert!(phonetic_codes("").is_empty());
        assert!(phonetic_codes("123").is_empty());
    }

    #[test]
    fn test_phonetic_match() {
        assert!(sounds_alike("smith", "smyth"));
        assert!(sounds_alike("phone", "fone"));
        assert!(!sounds_alike("cat", "window"));
    }
}
