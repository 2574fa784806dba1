//! pico CLI — the main entry point.
//!
//! Modes:
//! - `pico "<prompt>"`     — run one turn and print the reply
//! - `pico`                — interactive REPL (`exit`, `quit` or EOF to leave)
//! - `pico --list-models`  — show the model catalog

use std::path::PathBuf;

use clap::Parser;
use pico_config::AppConfig;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "pico", about = "pico — minimal coding agent", version)]
struct Cli {
    /// Single prompt; omit to start the REPL
    prompt: Option<String>,

    /// Session file to resume and append to (default: a new file in the sessions dir)
    #[arg(long)]
    session: Option<PathBuf>,

    /// Provider name (overrides config and PICO_PROVIDER)
    #[arg(long)]
    provider: Option<String>,

    /// Model id (overrides config and PICO_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// List every provider and model, then exit
    #[arg(long)]
    list_models: bool,

    /// Print turn events as JSON lines on stderr
    #[arg(long)]
    events: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries replies only
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;
    let config = AppConfig::load(&cwd).map_err(|e| format!("Failed to load config: {e}"))?;
    let catalog = config.catalog();

    if cli.list_models {
        commands::models::run(&catalog, &mut std::io::stdout())?;
        return Ok(());
    }

    let options = commands::agent::Options {
        prompt: cli.prompt,
        session: cli.session,
        provider: cli.provider,
        model: cli.model,
        events: cli.events,
    };
    commands::agent::run(&config, &catalog, options).await
}
