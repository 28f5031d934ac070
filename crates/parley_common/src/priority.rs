//! Priority regex classifier.
//!
//! Each rule is a regex over the normalized input. All matching rules are
//! reported, highest priority first; equal priorities keep registration
//! order. Unset priorities count as 0.

use crate::error::{ParleyError, Result};
use crate::normalize::normalize;
use crate::rulebook::RawPatternRule;
use regex::Regex;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub category: String,
    pub priority: i32,
}

impl PatternRule {
    pub fn compile(raw: &RawPatternRule) -> Result<Self> {
        if raw.category.trim().is_empty() {
            return Err(ParleyError::InvalidRule(format!(
                "pattern '{}' has no category",
                raw.pattern
            )));
        }
        let regex = Regex::new(&raw.pattern).map_err(|source| ParleyError::InvalidRegex {
            pattern: raw.pattern.clone(),
            source,
        })?;

        Ok(Self {
            regex,
            category: raw.category.clone(),
            priority: raw.priority.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PriorityClassifier {
    rules: Vec<PatternRule>,
}

impl PriorityClassifier {
    pub fn compile(raw_rules: &[RawPatternRule]) -> Result<Self> {
        if raw_rules.is_empty() {
            return Err(ParleyError::EmptyRuleTable(
                "priority classifier needs at least one pattern".to_string(),
            ));
        }
        let rules = raw_rules
            .iter()
            .map(PatternRule::compile)
            .collect::<Result<Vec<_>>>()?;

        info!(rules = rules.len(), "compiled pattern rules");
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Every matching category, highest priority first.
    pub fn classify_all(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let mut matches: Vec<&PatternRule> = self
            .rules
            .iter()
            .filter(|rule| rule.regex.is_match(normalized.text()))
            .collect();

        // Stable sort keeps registration order for equal priorities
        matches.sort_by(|a, b| b.priority.cmp(&a.priority));

        let categories: Vec<String> = matches.into_iter().map(|r| r.category.clone()).collect();
        debug!(matches = ?categories, "priority classification");
        categories
    }

    /// Highest-priority matching category, if any.
    pub fn classify_one(&self, text: &str) -> Option<String> {
        self.classify_all(text).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pattern: &str, category: &str, priority: Option<i32>) -> RawPatternRule {
        RawPatternRule {
            pattern: pattern.to_string(),
            category: category.to_string(),
            priority,
        }
    }

    #[test]
    fn test_priority_ordering() {
        let c = PriorityClassifier::compile(&[
            raw(r"\b(test|testing)\b", "low", Some(0)),
            raw(r"\b(test|testing)\b", "default", None),
            raw(r"\b(test|testing)\b", "high", Some(2)),
            raw(r"\b(test|testing)\b", "medium", Some(1)),
        ])
        .unwrap();
        assert_eq!(
            c.classify_all("testing 123"),
            vec!["high", "medium", "low", "default"]
        );
        assert_eq!(c.classify_one("testing 123"), Some("high".to_string()));
    }

    #[test]
    fn test_input_is_normalized() {
        let c = PriorityClassifier::compile(&[raw(r"^hello world$", "greeting", None)]).unwrap();
        assert_eq!(c.classify_one("Hello, World!"), Some("greeting".to_string()));
    }

    #[test]
    fn test_no_match() {
        let c = PriorityClassifier::compile(&[raw(r"\bweather\b", "weather", None)]).unwrap();
        assert!(c.classify_all("").is_empty());
        assert_eq!(c.classify_one("nothing here"), None);
    }

    #[test]
    fn test_invalid_regex_reported() {
        let err = PriorityClassifier::compile(&[raw(r"(unclosed", "x", None)]).unwrap_err();
        assert!(matches!(err, ParleyError::InvalidRegex { .. }));
        assert!(matches!(
            PriorityClassifier::compile(&[]),
            Err(ParleyError::EmptyRuleTable(_))
        ));
    }

    #[test]
    fn test_negative_priority_sorts_last() {
        let c = PriorityClassifier::compile(&[
            raw(r"help", "meh", Some(-1)),
            raw(r"help", "plain", None),
        ])
        .unwrap();
        assert_eq!(c.classify_all("help me"), vec!["plain", "meh"]);
    }
}
