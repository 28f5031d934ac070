//! Raw rule definitions and their compilation into engine tables.
//!
//! A `RuleBook` is what the configuration source hands over, already
//! deserialized. `compile()` turns it into immutable tables for every
//! engine at once; any configuration error aborts the whole compilation.

use crate::category::CategoryClassifier;
use crate::dialogue::{PatternBot, TemplateSelector};
use crate::dispatch::Dispatcher;
use crate::error::{ParleyError, Result};
use crate::priority::PriorityClassifier;
use crate::weighted::WeightedRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

fn default_keyword_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCategoryRule {
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,
    /// Defaults to twice the keyword weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrase_weight: Option<f64>,
}

impl RawCategoryRule {
    pub fn effective_phrase_weight(&self) -> f64 {
        self.phrase_weight.unwrap_or(self.keyword_weight * 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPatternRule {
    pub pattern: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDecomposition {
    pub pattern: String,
    pub reassemblies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawKeyword {
    pub word: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub decompositions: Vec<RawDecomposition>,
    #[serde(default)]
    pub defaults: Vec<String>,
}

/// Everything the engines are built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub categories: Vec<RawCategoryRule>,
    #[serde(default)]
    pub patterns: Vec<RawPatternRule>,
    #[serde(default)]
    pub keywords: Vec<RawKeyword>,
    #[serde(default)]
    pub generic_responses: Vec<String>,
}

impl RuleBook {
    /// Read a rule book; `.json` files are JSON, anything else TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let book = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            _ => toml::from_str(&contents)?,
        };
        Ok(book)
    }

    pub fn compile(&self) -> Result<CompiledRules> {
        self.compile_with(TemplateSelector::default())
    }

    pub fn compile_with(&self, selector: TemplateSelector) -> Result<CompiledRules> {
        if self.categories.is_empty() && self.patterns.is_empty() && self.keywords.is_empty() {
            return Err(ParleyError::EmptyRuleTable(
                "rule book defines no categories, patterns or keywords".to_string(),
            ));
        }

        let categories = CategoryClassifier::compile(&self.categories)?;
        let patterns = PriorityClassifier::compile(&self.patterns)?;
        let bot = PatternBot::compile(&self.keywords, &self.generic_responses)?.with_selector(selector);
        let weighted = self.categories.iter().map(weighted_rule_for).collect();

        info!(
            categories = self.categories.len(),
            patterns = self.patterns.len(),
            keywords = self.keywords.len(),
            "rule book compiled"
        );
        Ok(CompiledRules {
            categories,
            patterns,
            bot,
            weighted,
        })
    }
}

/// Weighted view of a category rule: keywords and phrases scored by fuzzy
/// alignment with their configured weights.
fn weighted_rule_for(raw: &RawCategoryRule) -> WeightedRule {
    let keyword_rule = WeightedRule::from_phrases(&raw.category, &raw.keywords, raw.keyword_weight);
    let phrase_rule =
        WeightedRule::from_phrases(&raw.category, &raw.phrases, raw.effective_phrase_weight());
    let exclusion_rule =
        WeightedRule::from_phrases(&raw.category, &raw.exclusions, -raw.effective_phrase_weight());

    WeightedRule::new(raw.category.clone(), move |text| {
        let mut score = keyword_rule.evaluate(text);
        score.add_all(&phrase_rule.evaluate(text));
        score.add_all(&exclusion_rule.evaluate(text));
        score
    })
}

/// Immutable engine tables built from one rule book.
#[derive(Debug)]
pub struct CompiledRules {
    pub categories: CategoryClassifier,
    pub patterns: PriorityClassifier,
    pub bot: PatternBot,
    pub weighted: Vec<WeightedRule>,
}

impl CompiledRules {
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::from_bot(&self.bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighted;
    use std::io::Write;

    const BOOK: &str = r#"
generic_responses = ["Please go on."]

[[categories]]
category = "computer"
keywords = ["computer", "cpu", "ram"]
phrases = ["blue screen"]

[[categories]]
category = "weather"
keywords = ["rain", "forecast"]
exclusions = ["computer"]
keyword_weight = 2.0

[[patterns]]
pattern = "\\bhelp\\b"
category = "help"
priority = 1

[[keywords]]
word = "hello"
decompositions = [{ pattern = "*", reassemblies = ["Hello!"] }]
"#;

    #[test]
    fn test_parse_toml_defaults() {
        let book: RuleBook = toml::from_str(BOOK).unwrap();
        assert_eq!(book.categories[0].keyword_weight, 1.0);
        assert_eq!(book.categories[0].effective_phrase_weight(), 2.0);
        assert_eq!(book.categories[1].effective_phrase_weight(), 4.0);
        assert_eq!(book.patterns[0].priority, Some(1));
        assert_eq!(book.keywords[0].priority, 0);
    }

    #[test]
    fn test_compile_all_engines() {
        let book: RuleBook = toml::from_str(BOOK).unwrap();
        let rules = book.compile().unwrap();
        assert_eq!(rules.categories.classify_default("my cpu is hot").name(), "computer");
        assert_eq!(rules.patterns.classify_one("help me"), Some("help".to_string()));
        assert_eq!(rules.bot.get_response("hello").response, "Hello!");
        assert_eq!(weighted::classify_top("the forecast says rain", &rules.weighted, 1), vec!["weather"]);
    }

    #[test]
    fn test_weighted_exclusion_penalizes() {
        let book: RuleBook = toml::from_str(BOOK).unwrap();
        let rules = book.compile().unwrap();
        let ranked = weighted::classify("rain on my computer", &rules.weighted);
        assert_eq!(ranked[0].category, "computer");
        assert!(ranked.iter().all(|c| c.category != "weather"));
    }

    #[test]
    fn test_compile_reports_bad_pattern() {
        let mut book: RuleBook = toml::from_str(BOOK).unwrap();
        book.keywords[0].decompositions[0].pattern = "* and *".to_string();
        assert!(matches!(
            book.compile(),
            Err(ParleyError::MultipleWildcards { .. })
        ));
    }

    #[test]
    fn test_empty_book_rejected() {
        assert!(matches!(
            RuleBook::default().compile(),
            Err(ParleyError::EmptyRuleTable(_))
        ));
    }

    #[test]
    fn test_from_path_json_and_toml() {
        let book: RuleBook = toml::from_str(BOOK).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("rules.json");
        std::fs::write(&json_path, serde_json::to_string(&book).unwrap()).unwrap();
        assert_eq!(RuleBook::from_path(&json_path).unwrap(), book);

        let toml_path = dir.path().join("rules.toml");
        let mut f = std::fs::File::create(&toml_path).unwrap();
        f.write_all(BOOK.as_bytes()).unwrap();
        assert_eq!(RuleBook::from_path(&toml_path).unwrap(), book);

        assert!(RuleBook::from_path(&dir.path().join("missing.toml")).is_err());
    }
}
