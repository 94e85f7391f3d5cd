//! The fixed model registry.
//!
//! Every model the tutor can talk to is listed here. Adding a model or a
//! provider means adding a variant, not editing a config file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which completion service serves a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// The OpenAI chat completions API.
    OpenAI,
    /// A local Ollama daemon.
    Ollama,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Ollama => "ollama",
        }
    }
}

/// Short key a user types after `!model`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKey {
    Gpt,
    #[default]
    Llama,
}

impl ModelKey {
    /// All keys, in display order.
    pub const ALL: [ModelKey; 2] = [ModelKey::Gpt, ModelKey::Llama];

    /// Look up a key, ignoring case.
    pub fn parse(name: &str) -> Option<ModelKey> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::Gpt => "gpt",
            ModelKey::Llama => "llama",
        }
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        match self {
            ModelKey::Gpt => &GPT,
            ModelKey::Llama => &LLAMA,
        }
    }

    /// Comma separated list of every key, for error messages.
    pub fn available_list() -> String {
        Self::ALL
            .iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a selectable model.
#[derive(Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Model name sent to the provider.
    pub name: &'static str,
    pub provider: Provider,
    /// Human readable label.
    pub description: &'static str,
}

static GPT: ModelDescriptor = ModelDescriptor {
    name: "gpt-4o-mini",
    provider: Provider::OpenAI,
    description: "OpenAI GPT-4o Mini",
};

static LLAMA: ModelDescriptor = ModelDescriptor {
    name: "llama3.2",
    provider: Provider::Ollama,
    description: "Llama 3.2 (Local)",
};
