//! tutor - an interactive technical tutor for the terminal.
//!
//! Ask questions about code, software engineering, data science, or LLMs
//! and get Markdown answers from OpenAI or a local Ollama model. Lines
//! starting with `!` are commands (`!help` lists them).

mod command;
mod config;
mod error;
mod llm;
mod models;
mod prompt;
mod render;
mod session;
mod tutor;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::DefaultEditor;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tutor")]
#[command(author, version, about = "An interactive AI technical tutor")]
#[command(long_about = "Ask technical questions and get explanations from OpenAI or a local Ollama model.\n\nType !help inside the session for commands.")]
struct Cli {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _cli = Cli::parse();

    // Silently ignored when there is no .env file.
    dotenvy::dotenv().ok();
    init_logging();

    ExitCode::from(exit_status(run().await, &mut std::io::stderr()))
}

/// Map the outcome of a run to a process exit status, reporting a fatal
/// error on `err_out`.
fn exit_status(result: Result<()>, err_out: &mut impl Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            let _ = writeln!(err_out, "❌ Fatal error: {:#}", e);
            1
        }
    }
}

/// Log to stderr so answers on stdout stay clean.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tutor=info,reqwest=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the session and run it until the user leaves.
async fn run() -> Result<()> {
    let config = config::Config::load().context("Failed to load configuration")?;
    info!(
        "Starting tutor (default model: {}, exports to {})",
        config.default_model,
        config.export_dir.display()
    );

    let backends = llm::create_backends(&config).await;
    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;

    let mut tutor = tutor::Tutor::new(
        &config,
        backends,
        render::Renderer::for_stdout(),
        std::io::stdout(),
    );
    tutor.display_welcome().await?;
    tutor.run(&mut editor).await
}
