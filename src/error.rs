//! Error types surfaced to the user during a session.

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to a completion backend.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotConfigured(String),
    #[error("Failed to connect to {service}: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} request failed with status {status}: {message}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("Failed to parse {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),
}

/// Anything a single user turn can fail with. None of these end the session.
#[derive(Debug, Error)]
pub enum TutorError {
    #[error("Unknown command: {0}. Type !help for available commands.")]
    UnknownCommand(String),
    #[error("Unknown model: {name}. Available: {available}")]
    UnknownModel { name: String, available: String },
    #[error("Model {0} is not available")]
    UnavailableModel(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("No conversation to save.")]
    NoHistory,
    #[error("Error saving conversation to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_lists_keys() {
        let err = TutorError::UnknownModel {
            name: "ggpt".to_string(),
            available: "gpt, llama".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown model: ggpt. Available: gpt, llama");
    }

    #[test]
    fn test_write_error_keeps_cause() {
        let err = TutorError::Write {
            path: PathBuf::from("/nope/out.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/out.md"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_service_error_is_transparent() {
        let err: TutorError = ServiceError::EmptyResponse("OpenAI").into();
        assert_eq!(err.to_string(), "Empty response from OpenAI");
    }
}
