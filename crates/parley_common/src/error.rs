//! Error types for Parley.
//!
//! Only table compilation and configuration loading fail hard. Classification
//! and dialogue calls are total and never return these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("Decomposition pattern '{pattern}' has more than one wildcard")]
    MultipleWildcards { pattern: String },

    #[error("Rule table is empty: {0}")]
    EmptyRuleTable(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Remote backend error: {0}")]
    Remote(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ParleyError {
    pub fn code(&self) -> i32 {
        match self {
            ParleyError::MultipleWildcards { .. } => -32010,
            ParleyError::EmptyRuleTable(_) => -32011,
            ParleyError::InvalidRule(_) => -32012,
            ParleyError::InvalidRegex { .. } => -32013,
            ParleyError::Config(_) => -32014,
            ParleyError::Remote(_) => -32002,
            ParleyError::Evaluation(_) => -32003,
            ParleyError::Io(_) => -32006,
            ParleyError::Json(_) => -32700,
            ParleyError::Toml(_) => -32701,
        }
    }

    /// Configuration errors are raised while compiling rule tables.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ParleyError::MultipleWildcards { .. }
                | ParleyError::EmptyRuleTable(_)
                | ParleyError::InvalidRule(_)
                | ParleyError::InvalidRegex { .. }
                | ParleyError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_flagged() {
        let err = ParleyError::MultipleWildcards {
            pattern: "* and *".to_string(),
        };
        assert!(err.is_configuration());
        assert!(err.to_string().contains("* and *"));
        assert!(!ParleyError::Remote("down".to_string()).is_configuration());
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ParleyError::EmptyRuleTable(String::new()).code(),
            ParleyError::InvalidRule(String::new()).code(),
            ParleyError::Config(String::new()).code(),
            ParleyError::Remote(String::new()).code(),
            ParleyError::Evaluation(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
