//! `pico [PROMPT]` — single-prompt or REPL chat with the agent.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use pico_agent::Agent;
use pico_config::AppConfig;
use pico_core::event::{Event, EventBus, TracingObserver};
use pico_core::model::ModelCatalog;
use pico_providers::{AdapterRegistry, Credentials};
use pico_session::SessionStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

/// Command-line choices for a chat run.
#[derive(Debug, Default)]
pub struct Options {
    pub prompt: Option<String>,
    pub session: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub events: bool,
}

pub async fn run(
    config: &AppConfig,
    catalog: &ModelCatalog,
    options: Options,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = options.provider.as_deref().unwrap_or(&config.default_provider);
    let model = options.model.as_deref().unwrap_or(&config.default_model);

    let bus = Arc::new(EventBus::new());
    bus.subscribe(Arc::new(TracingObserver));
    if options.events {
        bus.subscribe(Arc::new(print_event));
    }

    let store = match options.session {
        Some(path) => SessionStore::open(path),
        None => SessionStore::create_in(&config.ensure_sessions_dir()?),
    };
    let history = store.load()?;

    let mut agent = Agent::new(
        config.workspace_dir(),
        catalog,
        Arc::new(AdapterRegistry::with_builtins()),
        provider,
        model,
    )?
    .with_event_bus(bus)
    .with_credentials(Credentials::new().with_overrides(config.api_keys()))
    .with_history(history);

    info!(
        session = %store.path().display(),
        replayed = agent.transcript().len(),
        "Session opened"
    );

    let mut stdout = std::io::stdout();
    match options.prompt {
        Some(prompt) => turn(&mut agent, &store, &prompt, &mut stdout).await,
        None => repl(&mut agent, &store, BufReader::new(tokio::io::stdin()), &mut stdout).await,
    }
}

/// Run one turn, persist the exchange and print the reply.
///
/// A failed turn prints `error: <message>` and persists nothing; only
/// session and output failures are returned.
pub async fn turn(
    agent: &mut Agent,
    store: &SessionStore,
    text: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match agent.run_turn(text).await {
        Ok(reply) => {
            if let Some((user, assistant)) = agent.transcript().last_exchange() {
                store.append(user)?;
                store.append(assistant)?;
            }
            writeln!(out, "{}", reply.content)?;
        }
        Err(e) => writeln!(out, "error: {e}")?,
    }
    Ok(())
}

/// Read lines until `exit`, `quit` or EOF; blank lines are skipped.
pub async fn repl(
    agent: &mut Agent,
    store: &SessionStore,
    input: impl AsyncBufRead + Unpin,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(out, "pico repl. type 'exit' to quit.")?;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let text = line.trim();
        if text == "exit" || text == "quit" {
            break;
        }
        if text.is_empty() {
            continue;
        }
        turn(agent, store, text, out).await?;
    }
    Ok(())
}

fn print_event(event: &Event) {
    if let Ok(line) = serde_json::to_string(event) {
        eprintln!("{line}");
    }
}
