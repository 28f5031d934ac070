//! Keyword dispatch shell.
//!
//! Decomposition keywords and functional keywords share one capability
//! (`matches` / `respond`). The dispatcher ranks matching keywords by
//! priority exactly like the pattern bot, whatever their kind, so rule-based
//! and function-based bots swap without touching dispatch.

use crate::arith::{evaluate, format_number};
use crate::dialogue::engine::{
    generic_reply, keyword_candidates, keyword_reply, push_keyword_alternatives,
};
use crate::dialogue::{reassemble, Keyword, KeywordMatch, PatternBot, ResponseDetails, TemplateSelector};
use crate::error::{ParleyError, Result};
use crate::normalize::normalize;
use serde::Serialize;
use tracing::debug;

/// What every installed keyword can do.
pub trait KeywordHandler {
    fn label(&self) -> &str;

    fn priority(&self) -> i32;

    fn matches(&self, input: &str) -> bool;

    /// Reply for `input`, or `None` when this keyword has nothing to say.
    fn respond(&self, input: &str, selector: TemplateSelector) -> Option<String>;
}

impl KeywordHandler for Keyword {
    fn label(&self) -> &str {
        &self.word
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, input: &str) -> bool {
        self.occurs_in(normalize(input).text())
    }

    fn respond(&self, input: &str, selector: TemplateSelector) -> Option<String> {
        let normalized = normalize(input);
        let text = normalized.text();
        let options = match self.decompose(text) {
            Some((_, candidates)) => candidates,
            None => self.defaults.clone(),
        };
        selector.pick(&options, text).cloned()
    }
}

/// Side-effect-free computation behind a functional keyword.
#[derive(Debug, Clone)]
pub enum Computation {
    /// Constant reply
    Fixed(String),
    /// Template where `(0)` is the whole normalized input
    Template(String),
    /// Evaluate the arithmetic expression following the keyword
    Arithmetic,
    Custom(fn(&str) -> Result<String>),
}

#[derive(Debug, Clone)]
pub struct FunctionalKeyword {
    pub word: String,
    pub priority: i32,
    pub computation: Computation,
}

impl FunctionalKeyword {
    pub fn new(word: &str, priority: i32, computation: Computation) -> Self {
        Self {
            word: normalize(word).text().to_string(),
            priority,
            computation,
        }
    }

    fn compute(&self, input: &str) -> Result<String> {
        match &self.computation {
            Computation::Fixed(reply) => Ok(reply.clone()),
            Computation::Template(template) => {
                Ok(reassemble(template, normalize(input).text(), &[]))
            }
            Computation::Arithmetic => {
                evaluate(text_after_keyword(input, &self.word)).map(format_number)
            }
            Computation::Custom(f) => f(input),
        }
    }
}

impl KeywordHandler for FunctionalKeyword {
    fn label(&self) -> &str {
        &self.word
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, input: &str) -> bool {
        !self.word.is_empty() && normalize(input).text().contains(&self.word)
    }

    /// Faults become an `Error: ...` reply instead of propagating.
    fn respond(&self, input: &str, _selector: TemplateSelector) -> Option<String> {
        let reply = match self.compute(input) {
            Ok(reply) => reply,
            Err(ParleyError::Evaluation(msg)) => format!("Error: {}", msg),
            Err(e) => format!("Error: {}", e),
        };
        Some(reply)
    }
}

/// Raw text following the first case-insensitive occurrence of `word`,
/// starting at the first character that can open an expression.
///
/// Operators are punctuation, so the expression is cut from the raw input
/// rather than the normalized one.
fn text_after_keyword<'a>(input: &'a str, word: &str) -> &'a str {
    let lowered = input.to_lowercase();
    let after = match lowered.find(word) {
        // to_lowercase can change byte lengths; only trust ASCII offsets
        Some(pos) if input.is_ascii() => &input[pos + word.len()..],
        _ => input,
    };
    after.trim_start_matches(|c: char| !(c.is_ascii_digit() || matches!(c, '(' | '-' | '.')))
}

/// Closed set of keyword kinds the dispatcher can hold.
#[derive(Debug, Clone)]
pub enum DispatchKeyword {
    Pattern(Keyword),
    Functional(FunctionalKeyword),
}

impl KeywordHandler for DispatchKeyword {
    fn label(&self) -> &str {
        match self {
            DispatchKeyword::Pattern(k) => k.label(),
            DispatchKeyword::Functional(k) => k.label(),
        }
    }

    fn priority(&self) -> i32 {
        match self {
            DispatchKeyword::Pattern(k) => k.priority,
            DispatchKeyword::Functional(k) => k.priority,
        }
    }

    fn matches(&self, input: &str) -> bool {
        match self {
            DispatchKeyword::Pattern(k) => k.matches(input),
            DispatchKeyword::Functional(k) => k.matches(input),
        }
    }

    fn respond(&self, input: &str, selector: TemplateSelector) -> Option<String> {
        match self {
            DispatchKeyword::Pattern(k) => k.respond(input, selector),
            DispatchKeyword::Functional(k) => k.respond(input, selector),
        }
    }
}

impl From<Keyword> for DispatchKeyword {
    fn from(k: Keyword) -> Self {
        DispatchKeyword::Pattern(k)
    }
}

impl From<FunctionalKeyword> for DispatchKeyword {
    fn from(k: FunctionalKeyword) -> Self {
        DispatchKeyword::Functional(k)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReply {
    pub reply: String,
    pub keyword: Option<String>,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedReply {
    #[serde(flatten)]
    pub reply: DispatchReply,
    pub details: ResponseDetails,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    keywords: Vec<DispatchKeyword>,
    fallback: Vec<String>,
    selector: TemplateSelector,
}

impl Dispatcher {
    pub fn new(keywords: Vec<DispatchKeyword>, fallback: Vec<String>) -> Result<Self> {
        if fallback.is_empty() {
            return Err(ParleyError::EmptyRuleTable(
                "dispatcher needs at least one fallback reply".to_string(),
            ));
        }
        Ok(Self {
            keywords,
            fallback,
            selector: TemplateSelector::default(),
        })
    }

    /// Dispatcher over a pattern bot's keyword table and generic replies.
    pub fn from_bot(bot: &PatternBot) -> Self {
        Self {
            keywords: bot.keywords().iter().cloned().map(DispatchKeyword::from).collect(),
            fallback: bot.generic_responses().to_vec(),
            selector: bot.selector(),
        }
    }

    pub fn with_selector(mut self, selector: TemplateSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn install(&mut self, keyword: impl Into<DispatchKeyword>) {
        self.keywords.push(keyword.into());
    }

    pub fn keywords(&self) -> &[DispatchKeyword] {
        &self.keywords
    }

    /// Matching keywords, highest priority first; ties keep installation
    /// order.
    pub fn matching(&self, input: &str) -> Vec<&DispatchKeyword> {
        let mut matched: Vec<&DispatchKeyword> =
            self.keywords.iter().filter(|k| k.matches(input)).collect();
        matched.sort_by(|a, b| b.priority().cmp(&a.priority()));
        matched
    }

    pub fn select(&self, input: &str) -> Option<&DispatchKeyword> {
        self.matching(input).into_iter().next()
    }

    pub fn respond(&self, input: &str) -> DispatchReply {
        self.respond_detailed(input).reply
    }

    /// Reply plus the details of how that same reply was produced.
    pub fn respond_detailed(&self, input: &str) -> DetailedReply {
        let normalized = normalize(input);
        let text = normalized.text();
        let matched = self.matching(input);

        let mut details = ResponseDetails::new(text);
        details.matched_keywords = matched
            .iter()
            .map(|k| KeywordMatch {
                word: k.label().to_string(),
                priority: k.priority(),
            })
            .collect();

        let produced = matched.first().and_then(|top| {
            let reply = match top {
                DispatchKeyword::Pattern(k) => keyword_reply(k, text, self.selector, &mut details),
                DispatchKeyword::Functional(k) => {
                    details.functional_keyword = Some(k.word.clone());
                    k.respond(input, self.selector)
                }
            }?;
            Some((reply, top.label().to_string()))
        });

        let reply = match produced {
            Some((reply, keyword)) => {
                debug!(keyword = %keyword, "dispatched");
                DispatchReply {
                    reply,
                    keyword: Some(keyword),
                    fallback: false,
                }
            }
            None => DispatchReply {
                reply: generic_reply(&self.fallback, text, self.selector, &mut details),
                keyword: None,
                fallback: true,
            },
        };

        for other in matched.iter().skip(1) {
            let responses = match other {
                DispatchKeyword::Pattern(k) => keyword_candidates(k, text),
                DispatchKeyword::Functional(k) => k.respond(input, self.selector).into_iter().collect(),
            };
            push_keyword_alternatives(&mut details, other.label(), responses);
        }

        DetailedReply { reply, details }
    }
}
