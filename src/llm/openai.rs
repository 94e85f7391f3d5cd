//! OpenAI backend implementation.
//!
//! Uses the OpenAI chat completions API with GPT models.

use super::{COMPLETION_TIMEOUT, PROBE_TIMEOUT};
use crate::config::OpenAIConfig;
use crate::error::ServiceError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "OpenAI API";

/// OpenAI backend for the chat completions API.
pub struct OpenAIBackend {
    api_key: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend. Fails when no API key is configured.
    pub fn new(config: &OpenAIConfig) -> Result<Self, ServiceError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ServiceError::NotConfigured(
                "OpenAI API key not found. Set OPENAI_API_KEY environment variable \
                 or add api_key to config file."
                    .to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
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
        let url = format!("{}/chat/completions", self.base_url);

        let request = OpenAIRequest {
            model: model.to_string(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!("POST {} (model {})", url, model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Result<OpenAIError, _> = response.json().await;
            let message = body
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Status {
                service: SERVICE,
                status,
                message,
            });
        }

        let openai_response: OpenAIResponse =
            response
                .json()
                .await
                .map_err(|source| ServiceError::Decode {
                    service: SERVICE,
                    source,
                })?;

        openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ServiceError::EmptyResponse(SERVICE))
    }

    /// Check whether the API answers with our credentials.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("OpenAI probe failed: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> OpenAIBackend {
        let config = OpenAIConfig {
            api_key: Some("sk-test".to_string()),
            base_url: server.uri(),
            ..OpenAIConfig::default()
        };
        OpenAIBackend::new(&config).unwrap()
    }

    #[test]
    fn test_new_without_key_fails() {
        let result = OpenAIBackend::new(&OpenAIConfig::default());
        assert!(matches!(result, Err(ServiceError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 2000,
                "messages": [
                    {"role": "system", "content": "be helpful"},
                    {"role": "user", "content": "what is a list?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  A list is ...\n"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = backend_for(&server)
            .complete("gpt-4o-mini", "be helpful", "what is a list?")
            .await
            .unwrap();
        assert_eq!(answer, "A list is ...");
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "You exceeded your current quota"}
            })))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .complete("gpt-4o-mini", "sys", "q")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Status { .. }));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("exceeded your current quota"));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .complete("gpt-4o-mini", "sys", "q")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        assert!(backend_for(&server).probe().await);

        let unauthorized = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&unauthorized)
            .await;
        assert!(!backend_for(&unauthorized).probe().await);
    }
}
