pub mod gemini;
mod gemini_types;
pub mod llm;
pub mod openai;
mod openai_types;
pub mod test_provider;

use crate::completion::BackendError;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::collections::HashMap;

/// Connection settings shared by the remote providers.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RemoteSettings {
    #[serde(default)]
    base_url: Option<String>,
    api_key: String,
}

impl RemoteSettings {
    /// Parses settings, resolving `env:NAME` keys from the environment.
    pub(crate) fn from_settings(
        settings: &HashMap<String, serde_yaml::Value>,
        default_base_url: &str,
    ) -> Result<(String, String)> {
        let settings: RemoteSettings = serde_yaml::from_value(
            serde_yaml::to_value(settings).map_err(|_e| anyhow!("Invalid settings structure"))?,
        )
        .map_err(|e| anyhow!("Invalid model settings: {e}"))?;

        // If api_key starts with "env:", read from environment variable
        let api_key = if let Some(env_key) = settings.api_key.strip_prefix("env:") {
            let env_key = env_key.trim();
            std::env::var(env_key)
                .map_err(|_| anyhow!("Environment variable {} not found", env_key))?
        } else {
            settings.api_key
        };

        let base_url = settings
            .base_url
            .unwrap_or_else(|| default_base_url.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok((base_url, api_key))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub(crate) message: String,
}

/// Maps a non-success HTTP response to a backend error.
pub(crate) async fn error_for_response(response: reqwest::Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    match status.as_u16() {
        401 | 403 => BackendError::Auth(message),
        code => BackendError::Rejected {
            status: code,
            message,
        },
    }
}

/// Maps a failure to send a request.
pub(crate) fn error_for_request(err: reqwest::Error) -> BackendError {
    BackendError::Request(err.to_string())
}
