//! LLM backend implementations.
//!
//! This module provides a unified interface over the two completion
//! services the tutor knows: the OpenAI API and a local Ollama daemon.

pub mod ollama;
pub mod openai;

use crate::config::Config;
use crate::error::ServiceError;
use crate::models::{ModelKey, Provider};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on a single completion request.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);
/// Upper bound on an availability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Enum-based backend for LLM providers.
pub enum Backend {
    OpenAI(openai::OpenAIBackend),
    Ollama(ollama::OllamaBackend),
}

impl Backend {
    /// Ask `model` to answer `user_prompt` under `system_prompt`.
    pub async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ServiceError> {
        match self {
            Backend::OpenAI(b) => b.complete(model, system_prompt, user_prompt).await,
            Backend::Ollama(b) => b.complete(model, system_prompt, user_prompt).await,
        }
    }

    /// Check whether `model` can currently be served. Never fails.
    pub async fn probe(&self, model: &str) -> bool {
        match self {
            Backend::OpenAI(b) => b.probe().await,
            Backend::Ollama(b) => b.probe(model).await,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Backend::OpenAI(_) => Provider::OpenAI,
            Backend::Ollama(_) => Provider::Ollama,
        }
    }
}

/// The backends that initialised successfully, at most one per provider.
#[derive(Default)]
pub struct Backends {
    openai: Option<Backend>,
    ollama: Option<Backend>,
}

impl Backends {
    pub fn new(openai: Option<Backend>, ollama: Option<Backend>) -> Self {
        Self { openai, ollama }
    }

    /// Get the backend serving `provider`, if it initialised.
    pub fn get(&self, provider: Provider) -> Option<&Backend> {
        match provider {
            Provider::OpenAI => self.openai.as_ref(),
            Provider::Ollama => self.ollama.as_ref(),
        }
    }

    /// Live availability check for a model. Always re-probes.
    pub async fn is_available(&self, key: ModelKey) -> bool {
        let descriptor = key.descriptor();
        match self.get(descriptor.provider) {
            Some(backend) => backend.probe(descriptor.name).await,
            None => false,
        }
    }

    /// Send a question to the backend serving `key`.
    pub async fn complete(
        &self,
        key: ModelKey,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ServiceError> {
        let descriptor = key.descriptor();
        let backend = self.get(descriptor.provider).ok_or_else(|| {
            ServiceError::NotConfigured(format!(
                "{} backend is not initialized",
                descriptor.provider.name()
            ))
        })?;
        debug!(
            "Dispatching to {} ({})",
            backend.provider().name(),
            descriptor.name
        );
        backend
            .complete(descriptor.name, system_prompt, user_prompt)
            .await
    }
}

/// Create every backend the configuration allows. A backend that fails to
/// initialise is logged and left out; this never aborts startup.
pub async fn create_backends(config: &Config) -> Backends {
    let openai = match openai::OpenAIBackend::new(&config.openai) {
        Ok(backend) => {
            info!("✅ OpenAI client initialized");
            Some(Backend::OpenAI(backend))
        }
        Err(e) => {
            warn!("⚠️ OpenAI client initialization failed: {}", e);
            None
        }
    };

    let ollama = match ollama::OllamaBackend::new(&config.ollama) {
        Ok(backend) => {
            match backend.list_models().await {
                Ok(_) => info!("✅ Ollama connection established"),
                Err(e) => warn!("⚠️ Ollama connection failed: {}", e),
            }
            Some(Backend::Ollama(backend))
        }
        Err(e) => {
            warn!("⚠️ Ollama client initialization failed: {}", e);
            None
        }
    };

    Backends::new(openai, ollama)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, OpenAIConfig};

    #[tokio::test]
    async fn test_missing_backend_is_unavailable() {
        let backends = Backends::default();
        assert!(!backends.is_available(ModelKey::Gpt).await);
        assert!(!backends.is_available(ModelKey::Llama).await);
    }

    #[tokio::test]
    async fn test_missing_backend_complete_fails() {
        let backends = Backends::default();
        let err = backends
            .complete(ModelKey::Gpt, "sys", "q")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotConfigured(_)));
        assert!(err.to_string().contains("openai"));
    }

    #[tokio::test]
    async fn test_create_without_api_key_skips_openai() {
        let config = Config {
            openai: OpenAIConfig::default(),
            ollama: OllamaConfig {
                host: "http://127.0.0.1:9".to_string(),
            },
            ..Config::default()
        };
        let backends = create_backends(&config).await;
        assert!(backends.get(Provider::OpenAI).is_none());
        // An unreachable daemon still gets a client; it just probes as down.
        let ollama = backends.get(Provider::Ollama).unwrap();
        assert_eq!(ollama.provider(), Provider::Ollama);
        assert!(!backends.is_available(ModelKey::Llama).await);
    }
}
