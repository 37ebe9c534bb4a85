use std::{
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::model::{ModelConfig, ModelProvider};

/// Written out on first run.
pub const DEFAULT_CONFIG: &str = include_str!("../data/config.yml");

#[derive(Error, Debug)]
pub enum GratConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YAMLError(#[from] serde_yaml::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub models: HashMap<String, ModelConfig>,
    pub reasoner: ModelConfig,
    pub responder: ModelConfig,
    #[serde(default = "default_show_reasoning")]
    pub show_reasoning: bool,
}

impl Config {
    /// Identifiers of configured models that can answer, sorted.
    pub fn responder_model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .models
            .values()
            .filter(|m| m.provider != ModelProvider::Gemini)
            .map(|m| m.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

fn default_show_reasoning() -> bool {
    true
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StringOrObject<T> {
    String(String),
    Object(T),
}

#[derive(Deserialize, Debug)]
struct RawConfig {
    #[serde(default)]
    models: HashMap<String, ModelConfig>,
    reasoner: StringOrObject<ModelConfig>,
    responder: StringOrObject<ModelConfig>,
    show_reasoning: Option<bool>,
}

impl RawConfig {
    #[instrument]
    fn to_config(&self) -> Result<Config, GratConfigError> {
        let mut models_with_names = HashMap::new();
        for (k, v) in &self.models {
            // Model name defaults to its key
            let model_name = if v.name.is_empty() {
                k.clone()
            } else {
                v.name.clone()
            };
            let model = ModelConfig {
                name: model_name,
                ..v.clone()
            };
            models_with_names.insert(k.clone(), model);
        }

        let resolve_model =
            |model_entry: &StringOrObject<ModelConfig>| -> Result<ModelConfig, GratConfigError> {
                match model_entry {
                    StringOrObject::String(s) => models_with_names
                        .get(s)
                        .cloned()
                        .ok_or_else(|| GratConfigError::Config(format!("Model '{s}' not found"))),
                    StringOrObject::Object(m) => Ok(m.clone()),
                }
            };

        let reasoner = resolve_model(&self.reasoner)?;
        let responder = resolve_model(&self.responder)?;

        Ok(Config {
            models: models_with_names,
            reasoner,
            responder,
            show_reasoning: self.show_reasoning.unwrap_or_else(default_show_reasoning),
        })
    }
}

/// `$XDG_CONFIG_HOME/grat/grat.yml`, falling back to the platform config dir.
pub fn default_config_path() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("grat")
        .join("grat.yml")
}

#[instrument(skip(config_path))]
pub fn create_or_get_config_file(
    config_path: Option<PathBuf>,
) -> Result<(bool, PathBuf), GratConfigError> {
    let actual_path = config_path.unwrap_or_else(default_config_path);

    let parent_dir = actual_path.parent().ok_or_else(|| {
        GratConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        File::create(&actual_path)?.write_all(DEFAULT_CONFIG.as_bytes())?;
        Ok((false, actual_path))
    }
}

#[instrument(skip(config_path))]
pub fn get_config(config_path: Option<PathBuf>) -> Result<Config, GratConfigError> {
    let (_, config_file) = create_or_get_config_file(config_path)?;
    let content = fs::read_to_string(&config_file)?;
    let raw: RawConfig = serde_yaml::from_str(&content)?;
    raw.to_config()
}
