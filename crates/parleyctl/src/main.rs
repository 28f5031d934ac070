//! parleyctl - classify text and chat with the Parley engines.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use parley_common::{EngineKind, ParleyConfig};
use parleyctl::{commands, logging, Context};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parleyctl")]
#[command(about = "Parley - text classification and pattern-matching chat", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.config/parley/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rule book file, TOML or JSON (default: built-in rules)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify text into a category
    Classify {
        /// Engine: category, priority or weighted
        #[arg(long)]
        engine: Option<EngineKind>,

        /// Minimum score for the category engine
        #[arg(long)]
        threshold: Option<f64>,

        /// Number of weighted categories to report
        #[arg(long)]
        top: Option<usize>,

        /// Print JSON instead of a summary line
        #[arg(long)]
        json: bool,

        /// Text to classify
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Get one reply from the dialogue engine
    Chat {
        /// Print the reply with its response details as JSON
        #[arg(long)]
        details: bool,

        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Interactive conversation
    Repl,

    /// Validate a rule book without using it
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config,
        rules,
        command,
    } = Cli::parse();

    let config = ParleyConfig::load(config.as_deref()).context("Failed to load configuration")?;
    logging::init(&config.log.level);

    match command {
        Commands::Classify {
            engine,
            threshold,
            top,
            json,
            text,
        } => {
            let ctx = Context::from_config(config, rules.as_deref())?;
            commands::handle_classify(&ctx, &text.join(" "), engine, threshold, top, json)
        }
        Commands::Chat { details, text } => {
            let ctx = Context::from_config(config, rules.as_deref())?;
            commands::handle_chat(&ctx, &text.join(" "), details)
        }
        Commands::Repl => {
            let ctx = Context::from_config(config, rules.as_deref())?;
            commands::handle_repl(&ctx).await
        }
        Commands::Check => {
            commands::handle_check(rules.as_deref().or(config.rules.path.as_deref()))
        }
    }
}
