//! Whole-table publication for hot reload.
//!
//! Readers take an `Arc` snapshot and keep using it for the whole call. A
//! reload compiles a complete replacement first and swaps the reference;
//! tables are never mutated in place.

use crate::builtin::default_rule_book;
use crate::dialogue::TemplateSelector;
use crate::error::Result;
use crate::rulebook::{CompiledRules, RuleBook};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

#[derive(Debug)]
pub struct RuleTable<T> {
    current: RwLock<Arc<T>>,
}

impl<T> RuleTable<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    pub fn snapshot(&self) -> Arc<T> {
        // A poisoned lock still holds a complete table
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the whole table, returning the previous one.
    pub fn publish(&self, value: T) -> Arc<T> {
        let next = Arc::new(value);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

/// Compiled rules shared between in-flight calls.
#[derive(Debug)]
pub struct SharedRules {
    table: RuleTable<CompiledRules>,
    selector: TemplateSelector,
}

impl SharedRules {
    pub fn new(rules: CompiledRules, selector: TemplateSelector) -> Self {
        Self {
            table: RuleTable::new(rules),
            selector,
        }
    }

    pub fn builtin(selector: TemplateSelector) -> Result<Self> {
        let rules = default_rule_book()?.compile_with(selector)?;
        Ok(Self::new(rules, selector))
    }

    pub fn snapshot(&self) -> Arc<CompiledRules> {
        self.table.snapshot()
    }

    pub fn reload(&self, book: &RuleBook) -> Result<()> {
        let rules = book.compile_with(self.selector)?;
        self.table.publish(rules);
        info!("rule tables republished");
        Ok(())
    }

    /// Compile and publish a rule book file. On failure the previous tables
    /// stay in place.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let result = RuleBook::from_path(path).and_then(|book| self.reload(&book));
        if let Err(e) = &result {
            warn!(path = %path.display(), error = %e, "rule reload rejected");
        }
        result
    }
}
