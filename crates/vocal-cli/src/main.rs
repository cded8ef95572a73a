//! `vocal` - a readline REPL driving one scheduling dialogue.
//!
//! Transcripts come from stdin instead of a speech service, and events
//! land in an in-memory calendar so the pipeline can be exercised without
//! browser automation. The parsing capability is the real OpenAI-backed
//! one and needs `OPENAI_API_KEY`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use vocal_application::{SchedulingService, SchedulingUseCase};
use vocal_core::{Language, VocalConfig};
use vocal_interaction::{InMemoryCalendar, OpenAiScheduleParser, SharedCalendar, SlotExtractor};

#[derive(Parser, Debug)]
#[command(name = "vocal", about = "Dialogue-driven calendar scheduling REPL")]
struct Args {
    /// Session language tag (en, zh-Hans, zh-Hant)
    #[arg(long, default_value = "en")]
    language: String,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let language: Language = args
        .language
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            VocalConfig::from_toml_str(&raw).context("parsing config file")?
        }
        None => VocalConfig::default(),
    };

    let parser = OpenAiScheduleParser::try_from_env()
        .context("building the schedule parser")?
        .with_model(config.parser.model.clone())
        .with_max_tokens(config.parser.max_tokens);

    let extractor = SlotExtractor::new(Arc::new(parser), config.parser.timeout());
    let calendar = SharedCalendar::new(InMemoryCalendar::new(), config.calendar.timeout());
    let usecase = Arc::new(SchedulingUseCase::new(
        extractor,
        calendar,
        config.policy.clone(),
    ));
    let service = SchedulingService::new(usecase);

    let (mut session_id, greeting) = service.start_session(language).await;
    println!("{} {}", "assistant>".bright_green(), greeting);

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(&"you> ".bright_cyan().to_string()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                let outcome = match service.advance(&session_id, line).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        eprintln!("{} {}", "error>".bright_red(), err);
                        continue;
                    }
                };

                println!("{} {}", "assistant>".bright_green(), outcome.message);

                if outcome.done {
                    let (next_id, next_greeting) = service.start_session(language).await;
                    session_id = next_id;
                    println!();
                    println!("{} {}", "assistant>".bright_green(), next_greeting);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "bye".bright_yellow());
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "error>".bright_red(), err);
                break;
            }
        }
    }

    Ok(())
}
