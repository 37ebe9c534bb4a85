use std::io::{Write, stdout};

use anyhow::{Context, Result, bail};
use grat_core::chain::ModelChain;
use grat_core::config::Config;
use tracing::debug;

use crate::cli::ux::TerminalSink;

/// Answers a single question and exits.
pub async fn execute(question: Vec<String>, model: Option<String>, config: &Config) -> Result<()> {
    let question = question.join(" ");
    if question.trim().is_empty() {
        bail!("No question provided");
    }

    let mut chain =
        ModelChain::from_config(config, model).context("Failed to initialize model chain")?;
    run(&mut chain, question.trim(), stdout()).await
}

async fn run<W: Write>(chain: &mut ModelChain, question: &str, out: W) -> Result<()> {
    debug!(model = chain.model(), "Asking a single question");
    let mut sink = TerminalSink::new(out).with_spinner("Thinking...");
    let turn = chain
        .ask(question, &mut sink)
        .await
        .context("Error during reasoning")?;

    if !turn.completed {
        bail!(turn.final_answer);
    }
    Ok(())
}
