use super::ApiErrorDetail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest {
    pub(super) model: String,
    pub(super) messages: Vec<RequestMessage>,
    pub(super) stream: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct RequestMessage {
    pub(super) role: &'static str,
    pub(super) content: String,
}

/// A streamed chunk. Any field may be absent or `null`, and an upstream
/// failure arrives as a chunk carrying only `error`.
#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionStreamResponse {
    #[serde(default)]
    pub(super) choices: Option<Vec<ChatCompletionStreamChoice>>,
    #[serde(default)]
    pub(super) error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionStreamChoice {
    #[serde(default)]
    pub(super) delta: Option<Delta>,
    #[serde(default)]
    pub(super) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Delta {
    #[serde(default)]
    pub(super) content: Option<String>,
}
