use crate::cli::chat::commands::{COMMAND_NAMES, Command};
use crate::cli::ux::{ChatMessageType, style_chat_text, welcome_banner};
use anyhow::Result;
use grat_core::chain::ModelChain;
use rustyline::completion::{Candidate, Completer};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{CompletionType, Editor, Helper, Highlighter, Validator};
use std::io::stdout;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const MODEL_PREFIX: &str = "model ";

#[derive(Helper, Validator, Highlighter)]
struct Repl {
    pub command_names: Vec<String>,
    pub model_names: Vec<String>,
}

#[derive(Debug)]
struct CompletionCandidate {
    text: String,
    display_string: String,
}

impl CompletionCandidate {
    pub fn new(text: &str) -> Self {
        let display_string = style_chat_text(text, ChatMessageType::Footer).to_string();
        Self {
            text: text.to_owned(),
            display_string,
        }
    }
}

impl Candidate for CompletionCandidate {
    fn display(&self) -> &str {
        &self.display_string
    }

    fn replacement(&self) -> &str {
        &self.text
    }
}

impl Completer for Repl {
    type Candidate = CompletionCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        let line_to_pos = &line[..pos];
        if line_to_pos
            .get(..MODEL_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(MODEL_PREFIX))
        {
            return Ok(model_compl(line_to_pos, &self.model_names));
        }
        if line_to_pos.contains(' ') {
            return Ok((0, Vec::new()));
        }

        let prefix = line_to_pos.to_lowercase();
        let candidates = self
            .command_names
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .map(|name| CompletionCandidate::new(name))
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for Repl {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if line.is_empty() || pos < line.len() || line.contains(' ') {
            return None;
        }
        let prefix = line.to_lowercase();
        self.command_names
            .iter()
            .find(|cmd_name| cmd_name.starts_with(&prefix) && cmd_name.len() > prefix.len())
            .map(|cmd_name| cmd_name[prefix.len()..].into())
    }
}

fn model_compl(line_to_pos: &str, model_names: &[String]) -> (usize, Vec<CompletionCandidate>) {
    let start = line_to_pos.rfind(' ').map_or(0, |space_pos| space_pos + 1);
    let model_prefix = &line_to_pos[start..];
    let candidates = model_names
        .iter()
        .filter(|name| name.starts_with(model_prefix))
        .map(|name| CompletionCandidate::new(name))
        .collect();
    (start, candidates)
}

/// Runs the interactive REPL for the chat session.
pub async fn run(chain: Arc<Mutex<ModelChain>>, model_names: Vec<String>) -> Result<()> {
    println!("{}", welcome_banner());

    let config = rustyline::Config::builder()
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(Repl {
        command_names: COMMAND_NAMES.iter().map(|s| s.to_string()).collect(),
        model_names,
    }));

    let prompt = format!("\n{}", style_chat_text("You: ", ChatMessageType::Prompt));
    let mut out = stdout();
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                rl.add_history_entry(&line)?;
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                if !command.execute(chain.clone(), &mut out).await? {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted) => {
                debug!("Input interrupted");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                return Ok(());
            }
            Err(err) => {
                return Err(err.into());
            }
        }
    }
}
