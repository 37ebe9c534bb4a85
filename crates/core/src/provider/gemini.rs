use super::gemini_types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, RequestPart,
    ThinkingConfig,
};
use super::{RemoteSettings, error_for_request, error_for_response};
use crate::completion::{BackendError, Fragment, FragmentStream, Reasoner};
use crate::model::ModelConfig;
use anyhow::Result;
use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::StreamExt;
use tracing::debug;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1alpha";

/// Reasoner backed by the Gemini `streamGenerateContent` API with thoughts
/// included in the response.
pub struct GeminiReasoner {
    config: ModelConfig,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiReasoner {
    pub fn new(model_config: ModelConfig) -> Result<Self> {
        let (base_url, api_key) =
            RemoteSettings::from_settings(&model_config.settings, DEFAULT_GEMINI_BASE_URL)?;

        Ok(Self {
            config: model_config,
            client: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.config.name
        )
    }

    /// Fragments of the first candidate in one event, skipping empty parts.
    fn fragments(data: &str) -> Result<Vec<Fragment>, BackendError> {
        let response: GenerateContentResponse = serde_json::from_str(data)
            .map_err(|e| BackendError::Malformed(format!("{e}: {data}")))?;

        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        Ok(parts
            .into_iter()
            .filter_map(|part| match part.text {
                Some(text) if !text.is_empty() => Some(Fragment {
                    text,
                    is_thought: part.thought,
                }),
                _ => None,
            })
            .collect())
    }
}

fn error_for_event_stream(err: EventStreamError<reqwest::Error>) -> BackendError {
    match err {
        EventStreamError::Transport(err) => BackendError::Transport(err.to_string()),
        other => BackendError::Malformed(other.to_string()),
    }
}

#[async_trait]
impl Reasoner for GeminiReasoner {
    fn model(&self) -> &str {
        &self.config.name
    }

    async fn stream(&self, prompt: &str) -> FragmentStream {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig {
                    include_thoughts: true,
                },
            },
        };
        let request = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body);
        debug!(model = %self.config.name, "Starting reasoning stream");

        let stream = async_stream::stream! {
            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    yield Err(error_for_request(err));
                    return;
                }
            };
            if !response.status().is_success() {
                yield Err(error_for_response(response).await);
                return;
            }

            let mut events = response.bytes_stream().eventsource();
            while let Some(event) = events.next().await {
                let data = match event {
                    Ok(event) => event.data,
                    Err(err) => {
                        yield Err(error_for_event_stream(err));
                        return;
                    }
                };
                match GeminiReasoner::fragments(&data) {
                    Ok(fragments) => {
                        for fragment in fragments {
                            yield Ok(fragment);
                        }
                    }
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
            debug!("Reasoning stream finished");
        };

        Box::pin(stream)
    }
}
