//! Parley core: text classification and pattern-matching dialogue engines.
//!
//! Every engine compiles its rule table once and then answers calls as a
//! pure function of the input. Only compilation can fail.

pub mod arith;
pub mod builtin;
pub mod category;
pub mod config;
pub mod dialogue;
pub mod dispatch;
pub mod error;
pub mod linguistics;
pub mod normalize;
pub mod orchestrator;
pub mod priority;
pub mod rulebook;
pub mod similarity;
pub mod table;
pub mod weighted;

pub use category::{CategoryClassifier, Classification, UNKNOWN_CATEGORY};
pub use config::{EngineKind, ParleyConfig};
pub use dialogue::{BotResponse, PatternBot, ResponseDetails, TemplateSelector};
pub use dispatch::{
    Computation, DetailedReply, DispatchKeyword, Dispatcher, FunctionalKeyword, KeywordHandler,
};
pub use error::{ParleyError, Result};
pub use normalize::{normalize, NormalizedText};
pub use orchestrator::{ChatOrchestrator, ChatTurn, OfflineBackend, RemoteBackend, ReplySource};
pub use priority::PriorityClassifier;
pub use rulebook::{CompiledRules, RuleBook};
pub use similarity::{phrase_score, word_score};
pub use table::{RuleTable, SharedRules};
pub use weighted::{CategoryScore, WeightedRule, WeightedScore};
