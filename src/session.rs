//! Session state: the selected model, the transcript, and its export.

use crate::error::TutorError;
use crate::models::{ModelDescriptor, ModelKey};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Questions longer than this are cut in the `!history` preview.
pub const PREVIEW_CHARS: usize = 100;

/// One recorded question and its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// State for a single run of the tutor.
#[derive(Debug, Default)]
pub struct Session {
    current: ModelKey,
    history: Vec<Exchange>,
    availability: HashMap<ModelKey, bool>,
}

impl Session {
    pub fn new(current: ModelKey) -> Self {
        Self {
            current,
            ..Self::default()
        }
    }

    pub fn current_model(&self) -> ModelKey {
        self.current
    }

    pub fn current_descriptor(&self) -> &'static ModelDescriptor {
        self.current.descriptor()
    }

    /// Switch models. Callers check availability first.
    pub fn set_model(&mut self, key: ModelKey) {
        self.current = key;
    }

    /// Remember the outcome of the latest probe for `key`.
    pub fn note_availability(&mut self, key: ModelKey, available: bool) {
        self.availability.insert(key, available);
    }

    /// Result of the latest probe, if `key` was ever probed.
    pub fn last_availability(&self, key: ModelKey) -> Option<bool> {
        self.availability.get(&key).copied()
    }

    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push(Exchange {
            question: question.into(),
            answer: answer.into(),
        });
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Markdown list of truncated questions, or `None` when nothing was asked.
    pub fn history_preview(&self) -> Option<String> {
        if self.history.is_empty() {
            return None;
        }

        let mut text = String::from("## 📜 Conversation History:\n\n");
        for (i, exchange) in self.history.iter().enumerate() {
            text.push_str(&format!(
                "**{}.** {}\n",
                i + 1,
                preview(&exchange.question, PREVIEW_CHARS)
            ));
        }
        Some(text)
    }

    /// Render the transcript in the export format.
    pub fn render_export(&self, now: &DateTime<Local>) -> String {
        let mut out = format!(
            "# AI Tutor Conversation - {}\n\n",
            now.format("%Y-%m-%d %H:%M:%S")
        );
        for (i, exchange) in self.history.iter().enumerate() {
            let n = i + 1;
            out.push_str(&format!("## Question {}\n\n{}\n\n", n, exchange.question));
            out.push_str(&format!("## Answer {}\n\n{}\n\n", n, exchange.answer));
            out.push_str("---\n\n");
        }
        out
    }

    /// Write the transcript to a timestamped Markdown file in `dir`.
    pub fn export_history(&self, dir: &Path, now: DateTime<Local>) -> Result<PathBuf, TutorError> {
        if self.history.is_empty() {
            return Err(TutorError::NoHistory);
        }

        let path = dir.join(export_filename(&now));
        let write = || -> std::io::Result<()> {
            let mut writer = BufWriter::new(File::create(&path)?);
            writer.write_all(self.render_export(&now).as_bytes())?;
            writer.flush()
        };
        write().map_err(|source| TutorError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// `tutor_conversation_<YYYYMMDD_HHMMSS>.md`
pub fn export_filename(now: &DateTime<Local>) -> String {
    format!("tutor_conversation_{}.md", now.format("%Y%m%d_%H%M%S"))
}

/// First `limit` characters of `text`, with `...` when something was cut.
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
