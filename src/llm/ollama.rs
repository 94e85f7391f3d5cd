//! Ollama backend implementation.
//!
//! Ollama is a local LLM server reached over HTTP on the same host.

use super::{COMPLETION_TIMEOUT, PROBE_TIMEOUT};
use crate::config::OllamaConfig;
use crate::error::ServiceError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "Ollama";

/// Ollama backend for local LLM inference.
pub struct OllamaBackend {
    host: String,
    client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    pub fn new(config: &OllamaConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            host: config.host.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Ask `model` to answer `user_prompt` under `system_prompt`.
    pub async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ServiceError> {
        let url = format!("{}/api/chat", self.host);

        let request = OllamaChatRequest {
            model: model.to_string(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            stream: false,
        };

        debug!("POST {} (model {})", url, model);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Result<OllamaError, _> = response.json().await;
            let message = body
                .map(|e| e.error)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Status {
                service: SERVICE,
                status,
                message,
            });
        }

        let ollama_response: OllamaChatResponse =
            response
                .json()
                .await
                .map_err(|source| ServiceError::Decode {
                    service: SERVICE,
                    source,
                })?;

        let answer = ollama_response.message.content.trim().to_string();
        if answer.is_empty() {
            return Err(ServiceError::EmptyResponse(SERVICE));
        }
        Ok(answer)
    }

    /// List the names of locally installed models.
    pub async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        let url = format!("{}/api/tags", self.host);
        let response = self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                service: SERVICE,
                status,
                message,
            });
        }

        let tags: OllamaTags = response
            .json()
            .await
            .map_err(|source| ServiceError::Decode {
                service: SERVICE,
                source,
            })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check whether the daemon answers and has `model` installed. Installed
    /// names carry a tag (`llama3.2:latest`), so this is a substring match.
    pub async fn probe(&self, model: &str) -> bool {
        match self.list_models().await {
            Ok(names) => names.iter().any(|name| name.contains(model)),
            Err(e) => {
                debug!("Ollama probe failed: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}
