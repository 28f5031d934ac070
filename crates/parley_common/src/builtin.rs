//! Built-in rule book and functional keywords.
//!
//! Used when no rule book path is configured.

use crate::dispatch::{Computation, Dispatcher, FunctionalKeyword};
use crate::error::Result;
use crate::rulebook::{CompiledRules, RuleBook};

const DEFAULT_RULES: &str = include_str!("../rules/default.toml");

pub fn default_rule_book() -> Result<RuleBook> {
    Ok(toml::from_str(DEFAULT_RULES)?)
}

/// Functional keywords installed next to the pattern keywords.
pub fn functional_keywords() -> Vec<FunctionalKeyword> {
    vec![
        FunctionalKeyword::new("math", 10, Computation::Arithmetic),
        FunctionalKeyword::new("calculate", 10, Computation::Arithmetic),
        FunctionalKeyword::new("no", 0, Computation::Template("Are you sure, (0) ?".to_string())),
        FunctionalKeyword::new(
            "what can you do",
            4,
            Computation::Fixed(
                "I can sort your message into a topic, chat a little, and do simple math.".to_string(),
            ),
        ),
    ]
}

/// Pattern keywords of `rules` plus the built-in functional keywords.
pub fn default_dispatcher(rules: &CompiledRules) -> Dispatcher {
    let mut dispatcher = rules.dispatcher();
    for keyword in functional_keywords() {
        dispatcher.install(keyword);
    }
    dispatcher
}
