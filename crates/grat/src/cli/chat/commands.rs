use crate::cli::ux::{ChatMessageType, TerminalSink, format_exchange, help_text, style_chat_text};
use anyhow::Result;
use grat_core::chain::ModelChain;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Command keywords, used for completion and hints.
pub const COMMAND_NAMES: &[&str] = &["clear", "help", "log", "model", "quit", "reasoning"];

/// A line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Exit the chat session
    Quit,
    /// Clear chat history
    Clear,
    /// Switch the responder model
    Model(String),
    /// Toggle reasoning visibility
    Reasoning,
    /// Show the last exchange sent to both models
    Log,
    /// List commands
    Help,
    /// Anything else is a question
    Ask(String),
}

impl Command {
    /// Parses a line of input. Keywords are matched case-insensitively, model
    /// names keep their case. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let lower = line.to_lowercase();
        let command = match lower.as_str() {
            "quit" => Command::Quit,
            "clear" => Command::Clear,
            "reasoning" => Command::Reasoning,
            "log" => Command::Log,
            "help" => Command::Help,
            "model" => Command::Model(String::new()),
            _ if lower.starts_with("model ") => Command::Model(
                line.get("model ".len()..)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            ),
            _ => Command::Ask(line.to_string()),
        };
        Some(command)
    }

    /// Executes a REPL command, writing its output to `out`.
    ///
    /// Returns `Ok(false)` if the REPL should exit.
    pub async fn execute<W: Write>(
        self,
        session: Arc<Mutex<ModelChain>>,
        out: &mut W,
    ) -> Result<bool> {
        debug!(command = ?self, "Executing command");
        match self {
            Command::Quit => self.execute_quit(out),
            Command::Clear => self.execute_clear(session, out).await,
            Command::Model(ref name) => self.execute_model(session, name, out).await,
            Command::Reasoning => self.execute_reasoning(session, out).await,
            Command::Log => self.execute_log(session, out).await,
            Command::Help => {
                writeln!(out, "{}", help_text())?;
                Ok(true)
            }
            Command::Ask(ref question) => self.execute_ask(session, question, out).await,
        }
    }

    fn execute_quit<W: Write>(&self, out: &mut W) -> Result<bool> {
        writeln!(out, "\nGoodbye!")?;
        Ok(false)
    }

    async fn execute_clear<W: Write>(
        &self,
        session: Arc<Mutex<ModelChain>>,
        out: &mut W,
    ) -> Result<bool> {
        session.lock().await.clear();
        let notice = style_chat_text("Chat history cleared!", ChatMessageType::Notice);
        writeln!(out, "\n{notice}\n")?;
        Ok(true)
    }

    async fn execute_model<W: Write>(
        &self,
        session: Arc<Mutex<ModelChain>>,
        name: &str,
        out: &mut W,
    ) -> Result<bool> {
        let mut chain = session.lock().await;
        chain.set_model(name);
        writeln!(out, "\nChanged model to: {}\n", chain.model())?;
        Ok(true)
    }

    async fn execute_reasoning<W: Write>(
        &self,
        session: Arc<Mutex<ModelChain>>,
        out: &mut W,
    ) -> Result<bool> {
        let visible = session.lock().await.toggle_reasoning_visibility();
        let status = if visible { "visible" } else { "hidden" };
        let notice = format!("Reasoning process is now {status}");
        writeln!(out, "\n{}\n", style_chat_text(&notice, ChatMessageType::Notice))?;
        Ok(true)
    }

    async fn execute_log<W: Write>(
        &self,
        session: Arc<Mutex<ModelChain>>,
        out: &mut W,
    ) -> Result<bool> {
        let chain = session.lock().await;
        writeln!(out, "{}", format_exchange(chain.state().last_exchange()))?;
        Ok(true)
    }

    async fn execute_ask<W: Write>(
        &self,
        session: Arc<Mutex<ModelChain>>,
        question: &str,
        out: &mut W,
    ) -> Result<bool> {
        let mut chain = session.lock().await;
        let mut sink = TerminalSink::new(&mut *out).with_spinner("Thinking...");
        let result = chain.ask(question, &mut sink).await;
        drop(sink);

        if let Err(err) = result {
            error!(%err, "Reasoning failed");
            let message = format!("Error during reasoning: {err}");
            writeln!(
                out,
                "\n{}\n",
                style_chat_text(&message, ChatMessageType::Error)
            )?;
        }
        Ok(true)
    }
}
