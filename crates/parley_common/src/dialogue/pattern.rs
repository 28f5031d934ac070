//! Decomposition patterns and reassembly substitution.
//!
//! A pattern holds at most one `*`. It compiles to a literal prefix and
//! suffix around an optional capture. Matching is unanchored: the prefix may
//! start anywhere and the capture runs to the last occurrence of the suffix.
//!
//! Literal segments go through the same normalizer as the input, so
//! `"I'm *"` compiles to the prefix `"im "`.

use crate::error::{ParleyError, Result};
use crate::normalize::normalize;
use serde::Serialize;

pub const WILDCARD: char = '*';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecompositionPattern {
    source: String,
    prefix: String,
    suffix: String,
    has_wildcard: bool,
}

impl DecompositionPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let wildcards = pattern.matches(WILDCARD).count();
        if wildcards > 1 {
            return Err(ParleyError::MultipleWildcards {
                pattern: pattern.to_string(),
            });
        }

        let (prefix, suffix, source) = match pattern.split_once(WILDCARD) {
            Some((p, s)) => {
                let prefix = normalize_segment(p, false, true);
                let suffix = normalize_segment(s, true, false);
                let source = format!("{}{}{}", prefix, WILDCARD, suffix);
                (prefix, suffix, source)
            }
            None => {
                let literal = normalize(pattern).text().to_string();
                (literal.clone(), String::new(), literal)
            }
        };

        Ok(Self {
            has_wildcard: wildcards == 1,
            source,
            prefix,
            suffix,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// The bare `*` pattern matches any input.
    pub fn is_universal(&self) -> bool {
        self.has_wildcard && self.prefix.trim().is_empty() && self.suffix.trim().is_empty()
    }

    /// Captured groups on success, trimmed. Empty when there is no wildcard.
    pub fn captures(&self, input: &str) -> Option<Vec<String>> {
        if self.is_universal() {
            return Some(vec![input.trim().to_string()]);
        }

        if !self.has_wildcard {
            return input.contains(&self.prefix).then(Vec::new);
        }

        let start = input.find(&self.prefix)? + self.prefix.len();
        let rest = &input[start..];
        let end = if self.suffix.is_empty() {
            rest.len()
        } else {
            rest.rfind(&self.suffix)?
        };

        Some(vec![rest[..end].trim().to_string()])
    }

    pub fn matches(&self, input: &str) -> bool {
        self.captures(input).is_some()
    }
}

/// Normalized literal segment, keeping a single space on the side that
/// faces the wildcard so `"i am *"` still needs a word boundary.
fn normalize_segment(segment: &str, space_before: bool, space_after: bool) -> String {
    let text = normalize(segment).text().to_string();
    if text.is_empty() {
        return text;
    }
    let before = space_before && segment.starts_with(char::is_whitespace);
    let after = space_after && segment.ends_with(char::is_whitespace);
    format!(
        "{}{}{}",
        if before { " " } else { "" },
        text,
        if after { " " } else { "" }
    )
}

/// Fill `(0)`, `(1)`, ... placeholders.
///
/// `(0)` is the whole input; `(n)` is capture `n`. Placeholders without a
/// capture become empty.
pub fn reassemble(template: &str, whole: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + whole.len());
    let mut rest = template;

    while let Some(open) = rest.find('(') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();

        let closed = !digits.is_empty() && after[digits.len()..].starts_with(')');
        if !closed {
            out.push('(');
            rest = after;
            continue;
        }

        let index: usize = digits.parse().unwrap_or(usize::MAX);
        let value = match index {
            0 => whole,
            n => captures.get(n - 1).map(String::as_str).unwrap_or(""),
        };
        out.push_str(value);
        rest = &after[digits.len() + 1..];
    }
    out.push_str(rest);
    out
}
