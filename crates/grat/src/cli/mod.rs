//! grat app cli definition and entrypoint.
mod ask;
mod chat;
pub mod ux;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grat_core::config::get_config;

use crate::log::setup_logging;

/// grat - answers grounded on a reasoning model's thoughts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show verbose logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Start with the reasoning process hidden.
    #[arg(long, global = true)]
    hide_reasoning: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat interactively. This is the default.
    Chat {
        /// Responder model identifier, overrides the config.
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Ask a single question and exit.
    Ask {
        /// Question to ask.
        question: Vec<String>,
        /// Responder model identifier, overrides the config.
        #[arg(short, long)]
        model: Option<String>,
    },
}

/// Runs the main CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        setup_logging().context("Failed to set up logging")?;
    }

    let mut config = get_config(cli.config.clone()).context("Failed to load configuration")?;
    if cli.hide_reasoning {
        config.show_reasoning = false;
    }

    match cli.command {
        Some(Commands::Ask { question, model }) => ask::execute(question, model, &config).await,
        Some(Commands::Chat { model }) => chat::execute(model, &config).await,
        None => chat::execute(None, &config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_chat() {
        let cli = Cli::try_parse_from(["grat"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.hide_reasoning);
    }

    #[test]
    fn test_cli_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "grat",
            "ask",
            "why",
            "is",
            "the",
            "sky",
            "blue",
            "--model",
            "openai/gpt-4o",
            "--hide-reasoning",
        ])
        .unwrap();
        assert!(cli.hide_reasoning);
        match cli.command {
            Some(Commands::Ask { question, model }) => {
                assert_eq!(question.join(" "), "why is the sky blue");
                assert_eq!(model.as_deref(), Some("openai/gpt-4o"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_chat_with_config() {
        let cli = Cli::try_parse_from(["grat", "chat", "-c", "/tmp/grat.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/grat.yml")));
        assert!(matches!(cli.command, Some(Commands::Chat { model: None })));
    }
}
