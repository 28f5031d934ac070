//! Command handlers for parleyctl.

use anyhow::{Context as _, Result};
use parley_common::builtin::default_dispatcher;
use parley_common::dialogue::ResponseDetails;
use parley_common::dispatch::DispatchKeyword;
use parley_common::orchestrator::{ChatOrchestrator, OfflineBackend};
use parley_common::weighted::{self, CategoryScore};
use parley_common::{Classification, EngineKind, ParleyConfig, RuleBook, SharedRules};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Loaded configuration plus the shared rule tables built from it.
pub struct Context {
    pub config: ParleyConfig,
    pub rules: Arc<SharedRules>,
    /// Rule book file in use; `None` means built-in rules
    pub rules_path: Option<PathBuf>,
}

impl Context {
    /// Load config, then the rule book (`--rules` beats `[rules] path`).
    pub fn load(config_path: Option<&Path>, rules_path: Option<&Path>) -> Result<Self> {
        let config = ParleyConfig::load(config_path).context("Failed to load configuration")?;
        Self::from_config(config, rules_path)
    }

    pub fn from_config(config: ParleyConfig, rules_path: Option<&Path>) -> Result<Self> {
        let rules_path = rules_path
            .map(Path::to_path_buf)
            .or_else(|| config.rules.path.clone());

        let rules = match &rules_path {
            Some(path) => {
                let book = RuleBook::from_path(path)
                    .with_context(|| format!("Failed to read rule book {}", path.display()))?;
                let compiled = book
                    .compile_with(config.selection)
                    .with_context(|| format!("Invalid rule book {}", path.display()))?;
                SharedRules::new(compiled, config.selection)
            }
            None => SharedRules::builtin(config.selection).context("Built-in rules are invalid")?,
        };

        let source = match &rules_path {
            Some(path) => path.display().to_string(),
            None => "built-in".to_string(),
        };
        info!(rules = %source, "rules loaded");
        Ok(Self {
            config,
            rules: Arc::new(rules),
            rules_path,
        })
    }
}

// ============================================================================
// classify
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "engine", rename_all = "lowercase")]
pub enum ClassifyOutput {
    Category { result: Classification },
    Priority { categories: Vec<String> },
    Weighted { ranked: Vec<CategoryScore> },
}

impl ClassifyOutput {
    /// One line for humans.
    pub fn summary(&self) -> String {
        match self {
            ClassifyOutput::Category { result } => match result {
                Classification::Category { name, score } => format!("{} ({:.2})", name, score),
                Classification::Unknown => result.to_string(),
            },
            ClassifyOutput::Priority { categories } if categories.is_empty() => {
                "(no match)".to_string()
            }
            ClassifyOutput::Priority { categories } => categories.join(", "),
            ClassifyOutput::Weighted { ranked } if ranked.is_empty() => "(no match)".to_string(),
            ClassifyOutput::Weighted { ranked } => ranked
                .iter()
                .map(|c| format!("{} ({:.2})", c.category, c.total()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

pub fn classify(
    ctx: &Context,
    text: &str,
    engine: Option<EngineKind>,
    threshold: Option<f64>,
    top: Option<usize>,
) -> ClassifyOutput {
    let rules = ctx.rules.snapshot();
    match engine.unwrap_or(ctx.config.engine.default_engine) {
        EngineKind::Category => ClassifyOutput::Category {
            result: rules
                .categories
                .classify(text, threshold.unwrap_or(ctx.config.engine.threshold)),
        },
        EngineKind::Priority => ClassifyOutput::Priority {
            categories: rules.patterns.classify_all(text),
        },
        EngineKind::Weighted => {
            let n = top.unwrap_or(ctx.config.engine.top_n);
            let mut ranked = weighted::classify(text, &rules.weighted);
            ranked.truncate(n);
            ClassifyOutput::Weighted { ranked }
        }
    }
}

pub fn handle_classify(
    ctx: &Context,
    text: &str,
    engine: Option<EngineKind>,
    threshold: Option<f64>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let output = classify(ctx, text, engine, threshold, top);
    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.summary());
    }
    Ok(())
}

// ============================================================================
// chat
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatOutput {
    pub reply: String,
    /// Keyword that produced the reply, `None` for a fallback
    pub keyword: Option<String>,
    pub details: ResponseDetails,
}

/// One reply through the full dispatch shell, with the details of that
/// same reply.
pub fn chat(ctx: &Context, text: &str) -> ChatOutput {
    let rules = ctx.rules.snapshot();
    let out = default_dispatcher(&rules).respond_detailed(text);
    ChatOutput {
        reply: out.reply.reply,
        keyword: out.reply.keyword,
        details: out.details,
    }
}

pub fn handle_chat(ctx: &Context, text: &str, details: bool) -> Result<()> {
    let output = chat(ctx, text);
    if details {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.reply);
    }
    Ok(())
}

// ============================================================================
// repl
// ============================================================================

fn print_repl_help() {
    println!("Commands:");
    println!("  exit, quit  - Exit REPL");
    println!("  reload      - Reload the rule book file");
    println!("  help        - Show this help");
    println!("  <anything>  - Talk");
}

/// Reply for one REPL line, or `None` to stop.
pub async fn repl_line(ctx: &Context, orchestrator: &ChatOrchestrator, line: &str) -> Option<String> {
    match line.to_lowercase().as_str() {
        "exit" | "quit" => None,
        "help" => {
            print_repl_help();
            Some(String::new())
        }
        "reload" => Some(match &ctx.rules_path {
            Some(path) => match ctx.rules.reload_from(path) {
                Ok(()) => format!("Reloaded {}", path.display()),
                Err(e) => format!("Reload failed, keeping current rules: {}", e),
            },
            None => "Using built-in rules; nothing to reload.".to_string(),
        }),
        _ => {
            // Functional keywords answer directly; everything else goes
            // through the orchestrator.
            let rules = ctx.rules.snapshot();
            let dispatcher = default_dispatcher(&rules);
            if matches!(dispatcher.select(line), Some(DispatchKeyword::Functional(_))) {
                Some(dispatcher.respond(line).reply)
            } else {
                Some(orchestrator.respond(line, &[]).await.reply)
            }
        }
    }
}

pub async fn handle_repl(ctx: &Context) -> Result<()> {
    let timeout = Duration::from_millis(ctx.config.orchestrator.remote_timeout_ms);
    let orchestrator =
        ChatOrchestrator::new(Arc::clone(&ctx.rules), Box::new(OfflineBackend), timeout);

    println!("parleyctl v{} (type 'help' for commands)", env!("CARGO_PKG_VERSION"));
    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match repl_line(ctx, &orchestrator, input).await {
            Some(reply) if reply.is_empty() => {}
            Some(reply) => println!("parley> {}", reply),
            None => {
                println!("Goodbye!");
                break;
            }
        }
    }
    Ok(())
}

// ============================================================================
// check
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub categories: usize,
    pub patterns: usize,
    pub keywords: usize,
    pub generic_responses: usize,
}

/// Parse and compile a rule book without installing it.
pub fn check(path: Option<&Path>) -> Result<CheckReport> {
    let (book, source) = match path {
        Some(path) => (
            RuleBook::from_path(path)
                .with_context(|| format!("Failed to read rule book {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (
            parley_common::builtin::default_rule_book().context("Built-in rules are invalid")?,
            "built-in".to_string(),
        ),
    };
    book.compile()
        .with_context(|| format!("Rule book {} does not compile", source))?;

    Ok(CheckReport {
        source,
        categories: book.categories.len(),
        patterns: book.patterns.len(),
        keywords: book.keywords.len(),
        generic_responses: book.generic_responses.len(),
    })
}

pub fn handle_check(path: Option<&Path>) -> Result<()> {
    let report = check(path)?;
    println!("{}: OK", report.source);
    println!("  categories         {}", report.categories);
    println!("  patterns           {}", report.patterns);
    println!("  keywords           {}", report.keywords);
    println!("  generic responses  {}", report.generic_responses);
    Ok(())
}
