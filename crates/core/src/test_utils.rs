//! Test utilities for grat-core crate

use crate::model::{ModelConfig, ModelProvider};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::Builder;

/// Creates a temporary config file with the given content.
/// Uses tempfile::Builder to ensure unique directories for parallel tests.
///
/// # Panics
/// Panics if temp directory creation or file writing fails.
pub fn create_temp_config(content: &str) -> PathBuf {
    let temp_dir = Builder::new()
        .prefix("grat-test")
        .rand_bytes(8)
        .tempdir()
        .unwrap();
    let config_path = temp_dir.path().join("grat.yml");
    File::create(&config_path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
    // Keep the temp directory alive by leaking it (this is just for tests)
    let _ = Box::leak(Box::new(temp_dir));
    config_path
}

/// Model configuration pointing at a local server.
pub fn dummy_model_config(name: &str, provider: ModelProvider) -> ModelConfig {
    ModelConfig {
        name: name.to_string(),
        provider,
        settings: std::collections::HashMap::from([
            ("base_url".to_string(), "http://localhost:1234".into()),
            ("api_key".to_string(), "sk-dummy".into()),
        ]),
    }
}
