//! Decomposition/reassembly dialogue engine.

pub mod details;
pub mod engine;
pub mod keyword;
pub mod pattern;
pub mod select;

pub use details::{Alternative, AlternativeKind, KeywordMatch, ResponseDetails};
pub use engine::{BotResponse, PatternBot};
pub use keyword::{DecompositionRule, Keyword};
pub use pattern::{reassemble, DecompositionPattern};
pub use select::TemplateSelector;
