//! Streaming capabilities of the two backends chained by grat.
//!
//! A [`Reasoner`] yields [`Fragment`]s tagged as thought or final text. A
//! [`Responder`] yields plain text deltas for a role-tagged conversation. Both
//! streams are finite and ordered; a [`BackendError`] ends them early.
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderType {
    Assistant,
    User,
}

impl From<SenderType> for String {
    fn from(val: SenderType) -> Self {
        val.as_str().into()
    }
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match &self {
            SenderType::User => "user",
            SenderType::Assistant => "assistant",
        }
    }
}

/// A role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: SenderType,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: SenderType::User,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: SenderType::Assistant,
        }
    }
}

/// One incremental unit of reasoner output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub is_thought: bool,
}

impl Fragment {
    pub fn thought(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_thought: true,
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_thought: false,
        }
    }
}

/// Failure of a backend call. Ends the stream it occurs in.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Invalid backend configuration: {0}")]
    Config(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Stream interrupted: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A malformed delta within an otherwise healthy responder stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ChunkProcessingError(pub String);

/// A responder delta. `Ok(None)` is an absent delta and carries no text.
pub type Delta = Result<Option<String>, ChunkProcessingError>;

pub type FragmentStream = BoxStream<'static, Result<Fragment, BackendError>>;
pub type DeltaStream = BoxStream<'static, Result<Delta, BackendError>>;

/// Backend whose streamed thoughts are mined for reasoning.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Model identifier used for every call.
    fn model(&self) -> &str;
    async fn stream(&self, prompt: &str) -> FragmentStream;
}

/// Backend producing the user facing answer from a full conversation.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn stream(&self, model: &str, messages: &[ChatMessage]) -> DeltaStream;
}
