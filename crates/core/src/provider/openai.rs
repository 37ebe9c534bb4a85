use super::RemoteSettings;
use super::openai_types::{ChatCompletionRequest, ChatCompletionStreamResponse, RequestMessage};
use crate::completion::{
    BackendError, ChatMessage, ChunkProcessingError, Delta, DeltaStream, Responder,
};
use crate::model::ModelConfig;
use anyhow::Result;
use async_openai::Client as OpenAIClient;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_trait::async_trait;
use futures::stream::StreamExt;
use tracing::{debug, warn};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Responder for any OpenAI compatible chat completions endpoint.
pub struct OpenAIResponder {
    client: OpenAIClient<OpenAIConfig>,
}

impl OpenAIResponder {
    pub fn new(model_config: ModelConfig) -> Result<Self> {
        let (base_url, api_key) =
            RemoteSettings::from_settings(&model_config.settings, DEFAULT_OPENAI_BASE_URL)?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        Ok(Self {
            client: OpenAIClient::with_config(config),
        })
    }

    fn to_request_message(msg: &ChatMessage) -> RequestMessage {
        RequestMessage {
            role: msg.sender.as_str(),
            content: msg.text.clone(),
        }
    }

    /// Interprets one chunk. An `error` chunk ends the stream, a chunk
    /// without choices is skipped.
    fn delta(chunk: ChatCompletionStreamResponse) -> Result<Delta, BackendError> {
        if let Some(error) = chunk.error {
            return Err(BackendError::Transport(error.message));
        }

        let choice = chunk.choices.and_then(|choices| choices.into_iter().next());
        let delta = match choice {
            Some(choice) => {
                if let Some(reason) = &choice.finish_reason {
                    debug!(finish_reason = %reason, "Response stream finished");
                }
                Ok(choice.delta.and_then(|d| d.content))
            }
            None => {
                warn!("Chunk without choices");
                Err(ChunkProcessingError("no choices in chunk".to_string()))
            }
        };
        Ok(delta)
    }
}

/// Maps a client failure to a backend error.
fn error_for_openai(err: OpenAIError) -> BackendError {
    let message = err.to_string();
    match err {
        OpenAIError::Reqwest(_) => BackendError::Request(message),
        OpenAIError::ApiError(api_error) => BackendError::Transport(api_error.message),
        OpenAIError::JSONDeserialize(..) => BackendError::Malformed(message),
        _ => BackendError::Transport(message),
    }
}

#[async_trait]
impl Responder for OpenAIResponder {
    async fn stream(&self, model: &str, messages: &[ChatMessage]) -> DeltaStream {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages
                .iter()
                .map(OpenAIResponder::to_request_message)
                .collect(),
            stream: true,
        };
        debug!(model, messages = messages.len(), "Starting response stream");

        let client = self.client.clone();
        let stream = async_stream::stream! {
            let mut chunks = match client
                .chat()
                .create_stream_byot::<_, ChatCompletionStreamResponse>(request)
                .await
            {
                Ok(chunks) => chunks,
                Err(err) => {
                    yield Err(error_for_openai(err));
                    return;
                }
            };

            while let Some(next) = chunks.next().await {
                let chunk = match next {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        yield Err(error_for_openai(err));
                        return;
                    }
                };
                match OpenAIResponder::delta(chunk) {
                    Ok(delta) => yield Ok(delta),
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        };

        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelProvider;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    fn chunk(delta: serde_json::Value, finish_reason: Option<&str>) -> serde_json::Value {
        json!({
            "id": "gen-1",
            "object": "chat.completion.chunk",
            "created": 1684,
            "model": "openai/gpt-4o-mini",
            "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
        })
    }

    fn parse(data: &str) -> ChatCompletionStreamResponse {
        serde_json::from_str(data).unwrap()
    }

    fn event_stream(events: Vec<serde_json::Value>) -> String {
        let mut body = String::from(": OPENROUTER PROCESSING\n\n");
        for event in events {
            body.push_str(&format!("data: {}\n\n", serde_json::to_string(&event).unwrap()));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    fn create_mock_model_config(server_url: &str) -> ModelConfig {
        let settings: HashMap<String, serde_yaml::Value> = HashMap::from([
            ("base_url".to_string(), server_url.into()),
            ("api_key".to_string(), "MOCK_OPENAI_API_KEY".into()),
        ]);

        ModelConfig {
            name: "test-model".to_string(),
            provider: ModelProvider::Openai,
            settings,
        }
    }

    async fn mount(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_openai_stream_sends_full_history() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri());

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer MOCK_OPENAI_API_KEY"))
            .and(body_json(json!({
                "model": "openai/gpt-4o-mini",
                "messages": [
                    {"role": "user", "content": "first"},
                    {"role": "assistant", "content": "answer"},
                    {"role": "user", "content": "second"}
                ],
                "stream": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                event_stream(vec![chunk(json!({"content": "ok"}), Some("stop"))]),
                "text/event-stream",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let model = OpenAIResponder::new(config).unwrap();
        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("answer"),
            ChatMessage::user("second"),
        ];
        let deltas: Vec<_> = model
            .stream("openai/gpt-4o-mini", &messages)
            .await
            .map(|d| d.unwrap())
            .collect()
            .await;

        assert_eq!(deltas, vec![Ok(Some("ok".to_string()))]);
    }

    #[tokio::test]
    async fn test_openai_stream_deltas() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri());
        let body = event_stream(vec![
            chunk(json!({"role": "assistant", "content": "Hello"}), None),
            chunk(json!(null), None),
            chunk(json!({"content": " world"}), None),
            chunk(json!({"content": null}), None),
            json!({"id": "gen-1", "choices": []}),
            json!({"id": "gen-1", "choices": null}),
            chunk(json!({}), Some("stop")),
        ]);
        mount(
            &server,
            ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
        )
        .await;

        let model = OpenAIResponder::new(config).unwrap();
        let deltas: Vec<_> = model
            .stream("test-model", &[ChatMessage::user("hi")])
            .await
            .map(|d| d.unwrap())
            .collect()
            .await;

        assert_eq!(deltas.len(), 7);
        assert_eq!(deltas[0], Ok(Some("Hello".to_string())));
        assert_eq!(deltas[1], Ok(None));
        assert_eq!(deltas[2], Ok(Some(" world".to_string())));
        assert_eq!(deltas[3], Ok(None));
        assert!(deltas[4].is_err());
        assert!(deltas[5].is_err());
        assert_eq!(deltas[6], Ok(None));
    }

    #[test]
    fn test_delta_null_delta_is_absent() {
        let chunk = parse(r#"{"choices":[{"delta":null,"finish_reason":null}]}"#);
        assert_eq!(OpenAIResponder::delta(chunk).unwrap(), Ok(None));

        let chunk = parse(r#"{"choices":[{"finish_reason":null}]}"#);
        assert_eq!(OpenAIResponder::delta(chunk).unwrap(), Ok(None));
    }

    #[test]
    fn test_delta_null_or_empty_choices_is_chunk_error() {
        for data in [r#"{"choices":null}"#, r#"{"choices":[]}"#, r#"{"id":"gen-1"}"#] {
            let result = OpenAIResponder::delta(parse(data)).unwrap();
            assert_eq!(
                result,
                Err(ChunkProcessingError("no choices in chunk".to_string())),
                "for {data}"
            );
        }
    }

    #[test]
    fn test_delta_error_chunk() {
        let chunk = parse(r#"{"error":{"message":"upstream overloaded","code":502}}"#);
        assert!(matches!(
            OpenAIResponder::delta(chunk),
            Err(BackendError::Transport(msg)) if msg == "upstream overloaded"
        ));
    }

    #[tokio::test]
    async fn test_openai_stream_rejected_request() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri());
        mount(
            &server,
            ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "not-a-model is not a valid model ID", "code": 400}
            })),
        )
        .await;

        let model = OpenAIResponder::new(config).unwrap();
        let results: Vec<_> = model
            .stream("not-a-model", &[ChatMessage::user("hi")])
            .await
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(BackendError::Transport(_))));
    }

    #[tokio::test]
    async fn test_openai_stream_error_event_aborts() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri());
        let body = format!(
            "data: {}\n\ndata: {}\n\ndata: {}\n\n",
            chunk(json!({"content": "Par"}), None),
            json!({"error": {"message": "upstream overloaded", "code": 502}}),
            chunk(json!({"content": "never"}), None),
        );
        mount(
            &server,
            ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
        )
        .await;

        let model = OpenAIResponder::new(config).unwrap();
        let results: Vec<_> = model
            .stream("test-model", &[ChatMessage::user("hi")])
            .await
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), &Ok(Some("Par".to_string())));
        assert!(
            matches!(&results[1], Err(BackendError::Transport(msg)) if msg == "upstream overloaded")
        );
    }

    #[tokio::test]
    async fn test_openai_stream_malformed_event_aborts() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri());
        let body = format!(
            "data: {}\n\ndata: {{not json\n\n",
            chunk(json!({"content": "Par"}), None),
        );
        mount(
            &server,
            ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
        )
        .await;

        let model = OpenAIResponder::new(config).unwrap();
        let results: Vec<_> = model
            .stream("test-model", &[ChatMessage::user("hi")])
            .await
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert!(matches!(&results[1], Err(BackendError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_openai_stream_connection_refused() {
        // Nothing listens on port 9 in test environments
        let settings: HashMap<String, serde_yaml::Value> = HashMap::from([
            ("base_url".to_string(), "http://127.0.0.1:9".into()),
            ("api_key".to_string(), "k".into()),
        ]);
        let model = OpenAIResponder::new(ModelConfig {
            name: "test-model".to_string(),
            provider: ModelProvider::Openai,
            settings,
        })
        .unwrap();

        let results: Vec<_> = model
            .stream("test-model", &[ChatMessage::user("hi")])
            .await
            .collect()
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
