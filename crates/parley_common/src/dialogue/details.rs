//! Read-only audit record produced alongside every pattern bot reply.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    pub word: String,
    pub priority: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeKind {
    /// Another template of the decomposition that was used
    OtherTemplate,
    /// Un-decomposed default reply of the selected keyword
    KeywordDefault,
    /// Reply a lower-ranked keyword would have produced
    OtherKeyword,
    /// Another generic fallback reply
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub response: String,
    pub kind: AlternativeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDetails {
    pub normalized_input: String,
    /// Matched keywords, highest priority first
    pub matched_keywords: Vec<KeywordMatch>,
    pub used_generic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decomposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Set when a functional keyword computed the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functional_keyword: Option<String>,
    pub alternatives: Vec<Alternative>,
}

impl ResponseDetails {
    pub fn new(normalized_input: impl Into<String>) -> Self {
        Self {
            normalized_input: normalized_input.into(),
            matched_keywords: Vec::new(),
            used_generic: false,
            decomposition: None,
            template: None,
            functional_keyword: None,
            alternatives: Vec::new(),
        }
    }

    pub fn selected_keyword(&self) -> Option<&str> {
        self.matched_keywords.first().map(|k| k.word.as_str())
    }
}
