use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::analysis::client::AnalysisClient;
use crate::config::InferenceConfig;
use crate::error::AnalysisError;
use crate::sanitize;

/// Client for the Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<serde_json::Value>,
}

impl OllamaClient {
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
            },
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            prompt = %sanitize::preview(prompt, 80),
            "Sending generate request"
        );

        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: &self.options,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AnalysisError::Connection {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Inference server returned an error");
            return Err(AnalysisError::Server {
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let generated: GenerateResponse =
            response.json().await.map_err(|e| AnalysisError::Server {
                status: Some(status.as_u16()),
                message: format!("Invalid response body: {}", e),
            })?;

        match generated.response {
            Some(serde_json::Value::String(text)) if !text.is_empty() => Ok(text),
            _ => Err(AnalysisError::Server {
                status: Some(status.as_u16()),
                message: "No response from the model".to_string(),
            }),
        }
    }
}
