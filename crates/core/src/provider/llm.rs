use crate::completion::{Reasoner, Responder};
use crate::model::{ModelConfig, ModelProvider};
use crate::provider::{gemini, openai, test_provider};
use anyhow::{Result, bail};
use tracing::instrument;

#[instrument(skip(model_config))]
pub fn get_reasoner(model_config: ModelConfig) -> Result<Box<dyn Reasoner>> {
    match model_config.provider {
        ModelProvider::Gemini => Ok(Box::new(gemini::GeminiReasoner::new(model_config)?)),
        ModelProvider::Test => Ok(Box::new(test_provider::TestReasoner::new(model_config)?)),
        ModelProvider::Openai => bail!(
            "Model '{}' cannot be used as reasoner: provider 'openai' does not stream thoughts",
            model_config.name
        ),
    }
}

#[instrument(skip(model_config))]
pub fn get_responder(model_config: ModelConfig) -> Result<Box<dyn Responder>> {
    match model_config.provider {
        ModelProvider::Openai => Ok(Box::new(openai::OpenAIResponder::new(model_config)?)),
        ModelProvider::Test => Ok(Box::new(test_provider::TestResponder::new(model_config)?)),
        ModelProvider::Gemini => bail!(
            "Model '{}' cannot be used as responder: provider 'gemini' is only supported for reasoning",
            model_config.name
        ),
    }
}
