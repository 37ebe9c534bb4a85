//! A scripted provider for tests and offline runs.
use crate::completion::{
    BackendError, ChatMessage, Delta, DeltaStream, Fragment, FragmentStream, Reasoner, Responder,
};
use crate::model::ModelConfig;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream;

/// A scripted `Reasoner`.
///
/// The `response_mode` setting controls the output:
/// - `""` (default): one thought fragment followed by one final fragment.
/// - `"error"`: one thought fragment followed by a backend error.
#[derive(Debug)]
pub struct TestReasoner {
    config: ModelConfig,
}

impl TestReasoner {
    pub fn new(config: ModelConfig) -> Result<Self> {
        Ok(Self { config })
    }
}

#[async_trait]
impl Reasoner for TestReasoner {
    fn model(&self) -> &str {
        &self.config.name
    }

    async fn stream(&self, prompt: &str) -> FragmentStream {
        let response_mode: String = self.config.get_setting("response_mode").unwrap_or_default();
        let thought = Fragment::thought(format!("Thinking about: {prompt}"));

        let fragments: Vec<Result<Fragment, BackendError>> = match response_mode.as_str() {
            "error" => vec![
                Ok(thought),
                Err(BackendError::Transport("TestReasoner error".to_string())),
            ],
            _ => vec![Ok(thought), Ok(Fragment::answer("Done."))],
        };
        Box::pin(stream::iter(fragments))
    }
}

/// A scripted `Responder`.
///
/// Default mode streams "Hello", an absent delta and " world". The `"error"`
/// mode streams "Hello" followed by a backend error.
#[derive(Debug)]
pub struct TestResponder {
    config: ModelConfig,
}

impl TestResponder {
    pub fn new(config: ModelConfig) -> Result<Self> {
        Ok(Self { config })
    }
}

#[async_trait]
impl Responder for TestResponder {
    async fn stream(&self, _model: &str, _messages: &[ChatMessage]) -> DeltaStream {
        let response_mode: String = self.config.get_setting("response_mode").unwrap_or_default();

        let deltas: Vec<Result<Delta, BackendError>> = match response_mode.as_str() {
            "error" => vec![
                Ok(Ok(Some("Hello".to_string()))),
                Err(BackendError::Transport("TestResponder error".to_string())),
            ],
            _ => vec![
                Ok(Ok(Some("Hello".to_string()))),
                Ok(Ok(None)),
                Ok(Ok(Some(" world".to_string()))),
            ],
        };
        Box::pin(stream::iter(deltas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelProvider;
    use futures::StreamExt;
    use std::collections::HashMap;

    fn config(mode: &str) -> ModelConfig {
        ModelConfig {
            name: "test".to_string(),
            provider: ModelProvider::Test,
            settings: HashMap::from([("response_mode".to_string(), mode.into())]),
        }
    }

    #[tokio::test]
    async fn test_reasoner_modes() {
        let ok: Vec<_> = TestReasoner::new(config("")).unwrap().stream("q").await.collect().await;
        assert_eq!(ok.len(), 2);
        assert_eq!(ok[0].as_ref().unwrap(), &Fragment::thought("Thinking about: q"));

        let err: Vec<_> = TestReasoner::new(config("error"))
            .unwrap()
            .stream("q")
            .await
            .collect()
            .await;
        assert!(err[1].is_err());
    }

    #[tokio::test]
    async fn test_responder_modes() {
        let ok: Vec<_> = TestResponder::new(config(""))
            .unwrap()
            .stream("m", &[])
            .await
            .collect()
            .await;
        assert_eq!(ok.len(), 3);

        let err: Vec<_> = TestResponder::new(config("error"))
            .unwrap()
            .stream("m", &[])
            .await
            .collect()
            .await;
        assert!(err[1].is_err());
    }
}
