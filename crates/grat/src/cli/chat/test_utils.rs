#![cfg(test)]

//! Test utilities for chat modules

use grat_core::config::Config;
use grat_core::model::{ModelConfig, ModelProvider};
use std::collections::HashMap;

fn test_model(name: &str, response_mode: &str) -> ModelConfig {
    let mut settings = HashMap::new();
    if !response_mode.is_empty() {
        settings.insert(
            "response_mode".to_string(),
            serde_yaml::Value::String(response_mode.to_string()),
        );
    }
    ModelConfig {
        name: name.to_string(),
        provider: ModelProvider::Test,
        settings,
    }
}

/// Creates a config backed by the scripted test provider. An empty mode
/// selects the default script.
pub fn test_config(reasoner_mode: &str, responder_mode: &str) -> Config {
    let reasoner = test_model("test-thinker", reasoner_mode);
    let responder = test_model("test/mini", responder_mode);
    let models = HashMap::from([
        ("thinker".to_string(), reasoner.clone()),
        ("mini".to_string(), responder.clone()),
        ("big".to_string(), test_model("test/big", "")),
    ]);

    Config {
        models,
        reasoner,
        responder,
        show_reasoning: true,
    }
}
