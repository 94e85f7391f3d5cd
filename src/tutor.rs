//! The interactive session loop.
//!
//! Reads a line, decides whether it is a command or a question, and either
//! handles it locally or forwards it to the selected backend. Every error a
//! single turn can produce is printed and the loop carries on.

use crate::command::{Command, Input};
use crate::config::Config;
use crate::error::TutorError;
use crate::llm::Backends;
use crate::models::ModelKey;
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::render::Renderer;
use crate::session::Session;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const INPUT_PROMPT: &str = "🤔 Please enter your question (or !help for commands): ";
const FAREWELL: &str = "👋 Goodbye!";

const COMMANDS_MD: &str = "- `!model <name>` - Switch between models (gpt/llama)
- `!history` - Show conversation history
- `!clear` - Clear conversation history
- `!save` - Save conversation to markdown file
- `!quit` or `!exit` - Exit the tutor
- `!help` - Show this help message
";

/// One read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D or closed stdin.
    Eof,
}

/// Where input lines come from.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether the loop keeps going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the session and drives the read → dispatch → respond cycle.
pub struct Tutor<W: Write> {
    session: Session,
    backends: Backends,
    renderer: Renderer,
    export_dir: PathBuf,
    out: W,
}

impl<W: Write> Tutor<W> {
    pub fn new(config: &Config, backends: Backends, renderer: Renderer, out: W) -> Self {
        Self {
            session: Session::new(config.default_model),
            backends,
            renderer,
            export_dir: config.export_dir.clone(),
            out,
        }
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    fn say_error(&mut self, line: &str) -> io::Result<()> {
        let styled = self.renderer.error(line);
        self.say(&styled)
    }

    fn say_markdown(&mut self, markdown: &str) -> io::Result<()> {
        let rendered = self.renderer.render(markdown);
        self.out.write_all(rendered.as_bytes())?;
        self.out.flush()
    }

    /// Probe `key` now and remember the answer.
    async fn probe(&mut self, key: ModelKey) -> bool {
        let available = self.backends.is_available(key).await;
        self.session.note_availability(key, available);
        available
    }

    /// Print the welcome screen with a live availability mark per model.
    pub async fn display_welcome(&mut self) -> io::Result<()> {
        let mut text = String::from(
            "# 🎓 Interactive AI Technical Tutor\n\n\
             Welcome! I'm here to help you understand Python code, software engineering, \
             data science, and LLMs.\n\n\
             ## Available Models:\n\n",
        );
        for key in ModelKey::ALL {
            let status = if self.probe(key).await { "✅" } else { "❌" };
            text.push_str(&format!(
                "- **{}**: {} {}\n",
                key,
                key.descriptor().description,
                status
            ));
        }
        text.push_str(&format!(
            "\n**Current model**: {}\n\n**Commands**:\n\n{}",
            self.session.current_descriptor().description,
            COMMANDS_MD
        ));
        self.say_markdown(&text)
    }

    /// Switch to the model named `name` if it is known and reachable right now.
    pub async fn select_model(&mut self, name: &str) -> Result<ModelKey, TutorError> {
        let key = ModelKey::parse(name).ok_or_else(|| TutorError::UnknownModel {
            name: name.to_string(),
            available: ModelKey::available_list(),
        })?;

        if !self.probe(key).await {
            return Err(TutorError::UnavailableModel(key.to_string()));
        }

        self.session.set_model(key);
        info!("Switched model to {}", key);
        Ok(key)
    }

    /// Send a question to the current model.
    pub async fn ask(&self, question: &str) -> Result<String, TutorError> {
        let key = self.session.current_model();
        debug!("Asking {}: {}", key, question);
        let answer = self
            .backends
            .complete(key, SYSTEM_PROMPT, &user_prompt(question))
            .await?;
        Ok(answer)
    }

    /// Handle one raw input line.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match Input::parse(line) {
            Input::Empty => {
                self.say("Please enter a question or command.")?;
                Ok(Flow::Continue)
            }
            Input::Command(command) => self.handle_command(command).await,
            Input::Question(question) => {
                self.handle_question(question).await?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn handle_command(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Quit => {
                self.say(FAREWELL)?;
                return Ok(Flow::Quit);
            }
            Command::Help => {
                let help = format!("## 📚 Available Commands:\n\n{}", COMMANDS_MD);
                self.say_markdown(&help)?;
            }
            Command::Model(None) => self.show_models()?,
            Command::Model(Some(name)) => match self.select_model(&name).await {
                Ok(key) => {
                    let line = format!("✅ Switched to {}", key.descriptor().description);
                    self.say(&line)?;
                }
                Err(e) => self.say_error(&format!("❌ {}", e))?,
            },
            Command::History => match self.session.history_preview() {
                Some(preview) => self.say_markdown(&preview)?,
                None => self.say("No conversation history yet.")?,
            },
            Command::Clear => {
                self.session.clear_history();
                self.say("✅ Conversation history cleared")?;
            }
            Command::Save => self.save()?,
            Command::Unknown(verb) => {
                let e = TutorError::UnknownCommand(verb);
                self.say_error(&format!("❌ {}", e))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn show_models(&mut self) -> io::Result<()> {
        let line = format!(
            "Current model: {}",
            self.session.current_descriptor().description
        );
        self.say(&line)?;
        for key in ModelKey::ALL {
            let status = match self.session.last_availability(key) {
                Some(true) => "✅",
                Some(false) => "❌",
                None => "❔",
            };
            let line = format!(
                "  {} - {} {}",
                key,
                key.descriptor().description,
                status
            );
            self.say(&line)?;
        }
        Ok(())
    }

    fn save(&mut self) -> io::Result<()> {
        match self
            .session
            .export_history(&self.export_dir, chrono::Local::now())
        {
            Ok(path) => {
                info!("Conversation exported to {}", path.display());
                self.say(&format!("✅ Conversation saved to: {}", display_path(&path)))
            }
            Err(TutorError::NoHistory) => self.say(&TutorError::NoHistory.to_string()),
            Err(e) => {
                warn!("Export failed: {}", e);
                self.say_error(&format!("❌ {}", e))
            }
        }
    }

    async fn handle_question(&mut self, question: String) -> io::Result<()> {
        let line = format!(
            "🤖 Thinking... (using {})",
            self.session.current_descriptor().description
        );
        self.say(&line)?;

        match self.ask(&question).await {
            Ok(answer) => {
                self.say_markdown(&answer)?;
                self.session.record_exchange(question, answer);
                self.say("\n💡 Follow-up question, new question, or command?")
            }
            Err(e) => {
                error!(
                    "Error getting response from {}: {}",
                    self.session.current_model(),
                    e
                );
                self.say_error(&format!("❌ Error: {}", e))?;
                self.say_error("❌ Sorry, I couldn't get a response. Please try again.")
            }
        }
    }

    /// Run until the user quits, closes input, or interrupts.
    pub async fn run<L: LineSource>(&mut self, input: &mut L) -> Result<()> {
        self.run_until(input, || async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Like [`Tutor::run`], but a turn in flight is abandoned when the
    /// future made by `interrupt` for that turn resolves.
    pub async fn run_until<L, I, F>(&mut self, input: &mut L, mut interrupt: I) -> Result<()>
    where
        L: LineSource,
        I: FnMut() -> F,
        F: Future<Output = ()>,
    {
        loop {
            self.say(&format!("\n{}", "=".repeat(60)))?;

            let line = match input.read_line(INPUT_PROMPT)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted | ReadOutcome::Eof => {
                    self.say(&format!("\n\n{}", FAREWELL))?;
                    break;
                }
            };

            // An interrupt while a request is in flight abandons it and ends the session.
            let flow = tokio::select! {
                flow = self.handle_line(&line) => Some(flow),
                _ = interrupt() => None,
            };

            match flow {
                Some(flow) => {
                    if flow? == Flow::Quit {
                        break;
                    }
                }
                None => {
                    self.say("\n\n👋 Session interrupted. Goodbye!")?;
                    break;
                }
            }
        }
        info!(
            "Session ended with {} recorded exchanges",
            self.session.history().len()
        );
        Ok(())
    }
}

/// Exports land in the working directory by default; show those without `./`.
fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
