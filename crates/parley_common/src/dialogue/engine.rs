//! Decomposition/reassembly pattern bot.
//!
//! Stateless per call: normalize, rank matching keywords by priority, try
//! the top keyword's decompositions in order, fall back to its defaults and
//! then to the generic replies.

use super::details::{Alternative, AlternativeKind, KeywordMatch, ResponseDetails};
use super::keyword::Keyword;
use super::select::TemplateSelector;
use crate::error::{ParleyError, Result};
use crate::normalize::normalize;
use crate::rulebook::RawKeyword;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotResponse {
    pub response: String,
    pub details: ResponseDetails,
}

#[derive(Debug, Clone)]
pub struct PatternBot {
    keywords: Vec<Keyword>,
    generic: Vec<String>,
    selector: TemplateSelector,
}

impl PatternBot {
    pub fn compile(raw_keywords: &[RawKeyword], generic: &[String]) -> Result<Self> {
        if generic.is_empty() {
            return Err(ParleyError::EmptyRuleTable(
                "pattern bot needs at least one generic response".to_string(),
            ));
        }
        let keywords = raw_keywords
            .iter()
            .map(Keyword::compile)
            .collect::<Result<Vec<_>>>()?;

        info!(keywords = keywords.len(), generic = generic.len(), "compiled keyword table");
        Ok(Self {
            keywords,
            generic: generic.to_vec(),
            selector: TemplateSelector::default(),
        })
    }

    pub fn with_selector(mut self, selector: TemplateSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn selector(&self) -> TemplateSelector {
        self.selector
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn generic_responses(&self) -> &[String] {
        &self.generic
    }

    /// Keywords present in the normalized input, highest priority first.
    pub fn matching_keywords(&self, normalized: &str) -> Vec<&Keyword> {
        let mut matched: Vec<&Keyword> = self
            .keywords
            .iter()
            .filter(|k| k.occurs_in(normalized))
            .collect();
        matched.sort_by(|a, b| b.priority.cmp(&a.priority));
        matched
    }

    pub fn get_response(&self, input: &str) -> BotResponse {
        let normalized = normalize(input);
        let text = normalized.text();
        let matched = self.matching_keywords(text);

        let mut details = ResponseDetails::new(text);
        details.matched_keywords = matched
            .iter()
            .map(|k| KeywordMatch {
                word: k.word.clone(),
                priority: k.priority,
            })
            .collect();

        let response = match matched.first() {
            Some(top) => keyword_reply(top, text, self.selector, &mut details),
            None => None,
        }
        .unwrap_or_else(|| generic_reply(&self.generic, text, self.selector, &mut details));

        for other in matched.iter().skip(1) {
            push_keyword_alternatives(&mut details, &other.word, keyword_candidates(other, text));
        }

        debug!(
            keyword = details.selected_keyword().unwrap_or("-"),
            generic = details.used_generic,
            "pattern bot reply"
        );
        BotResponse { response, details }
    }
}

/// Reply from a selected keyword, or `None` if it has nothing to say.
pub(crate) fn keyword_reply(
    keyword: &Keyword,
    text: &str,
    selector: TemplateSelector,
    details: &mut ResponseDetails,
) -> Option<String> {
    if let Some((rule, candidates)) = keyword.decompose(text) {
        let idx = selector.pick_index(candidates.len(), text)?;
        details.decomposition = Some(rule.pattern.source().to_string());
        details.template = Some(rule.reassemblies[idx].clone());
        push_others(details, &candidates, idx, Some(keyword.word.as_str()), AlternativeKind::OtherTemplate);
        return Some(candidates[idx].clone());
    }

    let idx = selector.pick_index(keyword.defaults.len(), text)?;
    push_others(
        details,
        &keyword.defaults,
        idx,
        Some(keyword.word.as_str()),
        AlternativeKind::KeywordDefault,
    );
    Some(keyword.defaults[idx].clone())
}

/// Generic fallback. `generic` is never empty once compiled.
pub(crate) fn generic_reply(
    generic: &[String],
    text: &str,
    selector: TemplateSelector,
    details: &mut ResponseDetails,
) -> String {
    details.used_generic = true;
    let Some(idx) = selector.pick_index(generic.len(), text) else {
        return String::new();
    };
    push_others(details, generic, idx, None, AlternativeKind::Generic);
    generic[idx].clone()
}

/// What a keyword would answer on its own.
pub(crate) fn keyword_candidates(keyword: &Keyword, text: &str) -> Vec<String> {
    match keyword.decompose(text) {
        Some((_, candidates)) => candidates,
        None => keyword.defaults.clone(),
    }
}

pub(crate) fn push_keyword_alternatives(
    details: &mut ResponseDetails,
    keyword: &str,
    responses: Vec<String>,
) {
    for response in responses {
        details.alternatives.push(Alternative {
            keyword: Some(keyword.to_string()),
            response,
            kind: AlternativeKind::OtherKeyword,
        });
    }
}

fn push_others(
    details: &mut ResponseDetails,
    options: &[String],
    chosen: usize,
    keyword: Option<&str>,
    kind: AlternativeKind,
) {
    for (i, response) in options.iter().enumerate() {
        if i != chosen {
            details.alternatives.push(Alternative {
                keyword: keyword.map(String::from),
                response: response.clone(),
                kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rulebook::RawDecomposition;

    fn decomp(pattern: &str, reassemblies: &[&str]) -> RawDecomposition {
        RawDecomposition {
            pattern: pattern.to_string(),
            reassemblies: reassemblies.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn kw(word: &str, priority: i32, decompositions: Vec<RawDecomposition>, defaults: &[&str]) -> RawKeyword {
        RawKeyword {
            word: word.to_string(),
            priority,
            decompositions,
            defaults: defaults.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn bot() -> PatternBot {
        let generic = vec!["Please go on.".to_string(), "I see.".to_string()];
        PatternBot::compile(
            &[
                kw("hello", 0, vec![decomp("*", &["Hello!", "Hi there!", "Hey!"])], &[]),
                kw("i am", 2, vec![decomp("i am *", &["Why do you say you are (1)?"])], &[]),
                kw(
                    "computer",
                    5,
                    vec![decomp("* computers", &["Do machines worry you?"])],
                    &["Computers, hm."],
                ),
            ],
            &generic,
        )
        .unwrap()
    }

    #[test]
    fn test_hello_membership() {
        let reply = bot().get_response("Hello");
        assert!(["Hello!", "Hi there!", "Hey!"].contains(&reply.response.as_str()));
        assert_eq!(reply.details.decomposition.as_deref(), Some("*"));
        assert_eq!(reply.details.alternatives.len(), 2);
    }

    #[test]
    fn test_capture_substitution() {
        let reply = bot().get_response("I am feeling happy");
        assert_eq!(reply.response, "Why do you say you are feeling happy?");
        assert_eq!(reply.details.template.as_deref(), Some("Why do you say you are (1)?"));
        assert!(!reply.details.used_generic);
    }

    #[test]
    fn test_priority_picks_keyword() {
        let reply = bot().get_response("i am scared of my computer");
        assert_eq!(reply.details.selected_keyword(), Some("computer"));
        // decomposition misses, so the keyword default is used
        assert_eq!(reply.response, "Computers, hm.");
        assert!(reply.details.alternatives.iter().any(|a| {
            a.kind == AlternativeKind::OtherKeyword && a.response == "Why do you say you are scared of my computer?"
        }));
    }

    #[test]
    fn test_generic_fallback() {
        let b = bot().with_selector(TemplateSelector::Fixed { index: 1 });
        let reply = b.get_response("The sky is blue");
        assert_eq!(reply.response, "I see.");
        assert!(reply.details.used_generic);
        assert!(reply.details.matched_keywords.is_empty());
        assert_eq!(reply.details.alternatives[0].kind, AlternativeKind::Generic);
    }

    #[test]
    fn test_keyword_without_defaults_falls_back_to_generic() {
        let reply = bot()
            .with_selector(TemplateSelector::Fixed { index: 0 })
            .get_response("i am");
        assert_eq!(reply.details.selected_keyword(), Some("i am"));
        assert!(reply.details.used_generic);
        assert_eq!(reply.response, "Please go on.");
    }

    #[test]
    fn test_empty_input_is_generic() {
        let reply = bot().get_response("   ");
        assert!(reply.details.used_generic);
        assert!(bot().generic_responses().contains(&reply.response));
    }

    #[test]
    fn test_no_generic_is_config_error() {
        assert!(matches!(
            PatternBot::compile(&[], &[]),
            Err(ParleyError::EmptyRuleTable(_))
        ));
    }

    #[test]
    fn test_contraction_decomposition() {
        let b = PatternBot::compile(
            &[kw("I'm", 1, vec![decomp("I'm *", &["How long have you been (1)?"])], &["default reply"])],
            &["Go on.".to_string()],
        )
        .unwrap();
        let reply = b.get_response("I'm tired");
        assert_eq!(reply.response, "How long have you been tired?");
        assert_eq!(reply.details.decomposition.as_deref(), Some("im *"));
    }

    #[test]
    fn test_deterministic_selector() {
        let b = bot().with_selector(TemplateSelector::Fixed { index: 2 });
        assert_eq!(b.get_response("hello").response, "Hey!");
    }
}
