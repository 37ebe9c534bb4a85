use anyhow::{Context, Result};
use grat_core::chain::ModelChain;
use grat_core::config::Config;
use std::sync::Arc;
use tokio::sync::Mutex;

mod commands;
mod repl;
pub(crate) mod test_utils;

/// Executes the chat command, starting an interactive REPL session.
pub async fn execute(model: Option<String>, config: &Config) -> Result<()> {
    let chain =
        ModelChain::from_config(config, model).context("Failed to initialize model chain")?;
    repl::run(Arc::new(Mutex::new(chain)), config.responder_model_names()).await
}
