//! A chat session chaining a reasoner and a responder.
//!
//! Every turn first streams the reasoner's thoughts for the user's question,
//! then streams an answer from the responder given the question together with
//! those thoughts and the prior conversation.
use crate::completion::{BackendError, Reasoner, Responder};
use crate::config::Config;
use crate::conversation::ConversationState;
use crate::reasoning::ReasoningExtractor;
use crate::sink::{OutputSink, SinkEvent};
use anyhow::{Context, Result};
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};

/// Answer recorded for a turn whose response stream failed.
pub const RESPONSE_FAILED: &str = "Error occurred while streaming response";

/// Prompt sent to the responder for a question and its reasoning.
pub fn combined_prompt(user_input: &str, reasoning: &str) -> String {
    format!("<question>{user_input}</question>\n\n<thinking>{reasoning}</thinking>\n\n")
}

/// One question-to-answer cycle across both backends.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub user_input: String,
    pub reasoning_transcript: String,
    /// The full answer, or [`RESPONSE_FAILED`] when the response stream failed.
    pub final_answer: String,
    pub thinking_time: Duration,
    /// False when the response stream failed and nothing was committed.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub responder_model: String,
    pub reasoning_visible: bool,
}

pub struct ModelChain {
    reasoner: Box<dyn Reasoner>,
    responder: Box<dyn Responder>,
    state: ConversationState,
    session: SessionConfig,
}

impl ModelChain {
    pub fn new(
        reasoner: Box<dyn Reasoner>,
        responder: Box<dyn Responder>,
        session: SessionConfig,
    ) -> Self {
        Self {
            reasoner,
            responder,
            state: ConversationState::new(),
            session,
        }
    }

    /// Builds a chain from the configured reasoner and responder. `model`
    /// overrides the responder model identifier.
    pub fn from_config(config: &Config, model: Option<String>) -> Result<Self> {
        let reasoner = crate::get_reasoner(config.reasoner.clone())
            .context("Failed to initialize reasoner")?;
        let responder = crate::get_responder(config.responder.clone())
            .context("Failed to initialize responder")?;

        Ok(Self::new(
            reasoner,
            responder,
            SessionConfig {
                responder_model: model.unwrap_or_else(|| config.responder.name.clone()),
                reasoning_visible: config.show_reasoning,
            },
        ))
    }

    /// Runs one turn for `user_input`.
    ///
    /// A reasoner failure is returned as an error; the raw input stays in the
    /// reasoner history. A responder failure is reported to the sink and yields
    /// a turn with [`RESPONSE_FAILED`] as its answer, with no assistant message
    /// recorded in either history.
    pub async fn ask(
        &mut self,
        user_input: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<Turn, BackendError> {
        let extractor =
            ReasoningExtractor::new(self.reasoner.as_ref(), self.session.reasoning_visible);
        let reasoning = extractor.extract(user_input, &mut self.state, sink).await?;

        self.state
            .push_responder_prompt(combined_prompt(user_input, &reasoning.transcript));

        let model = self.session.responder_model.clone();
        sink.emit(SinkEvent::AnswerStarted(model.clone()));
        debug!(
            model = %model,
            messages = self.state.responder_history().len(),
            "Requesting response"
        );

        let mut final_answer = String::new();
        let mut stream = self
            .responder
            .stream(&model, self.state.responder_history())
            .await;
        while let Some(delta) = stream.next().await {
            match delta {
                Ok(Ok(Some(text))) => {
                    final_answer.push_str(&text);
                    sink.emit(SinkEvent::AnswerDelta(text));
                }
                Ok(Ok(None)) => {}
                Ok(Err(err)) => {
                    warn!(%err, "Skipping malformed chunk");
                    sink.emit(SinkEvent::Error(format!("Error processing chunk: {err}")));
                }
                Err(err) => {
                    warn!(%err, "Response stream failed");
                    sink.emit(SinkEvent::Error(format!("Error in streaming response: {err}")));
                    return Ok(Turn {
                        user_input: user_input.to_string(),
                        reasoning_transcript: reasoning.transcript,
                        final_answer: RESPONSE_FAILED.to_string(),
                        thinking_time: reasoning.elapsed,
                        completed: false,
                    });
                }
            }
        }

        self.state.commit_answer(&final_answer);
        sink.emit(SinkEvent::AnswerFinished);

        Ok(Turn {
            user_input: user_input.to_string(),
            reasoning_transcript: reasoning.transcript,
            final_answer,
            thinking_time: reasoning.elapsed,
            completed: true,
        })
    }

    /// Sets the responder model used from the next turn on. Not validated.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.session.responder_model = model.into();
    }

    pub fn model(&self) -> &str {
        &self.session.responder_model
    }

    pub fn reasoner_model(&self) -> &str {
        self.reasoner.model()
    }

    /// Flips whether thoughts are shown and returns the new setting.
    pub fn toggle_reasoning_visibility(&mut self) -> bool {
        self.session.reasoning_visible = !self.session.reasoning_visible;
        self.session.reasoning_visible
    }

    pub fn reasoning_visible(&self) -> bool {
        self.session.reasoning_visible
    }

    /// Clears both histories. The session config is kept.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }
}
