//! Text normalization shared by every engine.
//!
//! Lowercase, drop everything that is not a word character or whitespace,
//! split on whitespace. Total: empty or blank input yields no words.

use serde::Serialize;

/// Normalized form of a single utterance. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedText {
    /// Words joined by single spaces
    text: String,
    words: Vec<String>,
}

impl NormalizedText {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

/// Word characters match the regex `\w` class.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Remove punctuation but keep case.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect()
}

pub fn normalize(text: &str) -> NormalizedText {
    let words: Vec<String> = strip_punctuation(&text.to_lowercase())
        .split_whitespace()
        .map(String::from)
        .collect();

    NormalizedText {
        text: words.join(" "),
        words,
    }
}

/// Punctuation-free words with original casing, for scorers that
/// distinguish exact from case-insensitive matches.
pub fn words_preserving_case(text: &str) -> Vec<String> {
    strip_punctuation(text)
        .split_whitespace()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        let n = normalize("Hello, World!  How are you?");
        assert_eq!(n.text(), "hello world how are you");
        assert_eq!(n.words(), &["hello", "world", "how", "are", "you"]);
    }

    #[test]
    fn test_normalize_empty_and_blank() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \t\n").is_empty());
        assert!(normalize("?!...").is_empty());
        assert_eq!(normalize("   ").text(), "");
    }

    #[test]
    fn test_normalize_keeps_digits_and_underscore() {
        let n = normalize("Testing 123 snake_case");
        assert_eq!(n.words(), &["testing", "123", "snake_case"]);
    }

    #[test]
    fn test_apostrophes_are_removed() {
        assert_eq!(normalize("I'm sad").text(), "im sad");
    }

    #[test]
    fn test_words_preserving_case() {
        assert_eq!(words_preserving_case("My CPU, please."), vec!["My", "CPU", "please"]);
    }
}
