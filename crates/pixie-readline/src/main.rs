mod command;
mod helper;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;

use pixie_application::{ChatSession, InferenceEngine, SearchGateway, TurnServices};
use pixie_core::config::AppConfig;
use pixie_core::conversation::Role;
use pixie_core::prompt::PromptBuilder;
use pixie_core::turn::{StreamEvent, TaskStatus};
use pixie_infrastructure::logging::init_logging;
use pixie_infrastructure::{ConfigService, PixiePaths};
use pixie_interaction::{DuckDuckGoSearch, LlamaServerBackend};

use command::Command;
use helper::CliHelper;

/// PixieAI - chat with a local model, optionally grounded in web search.
#[derive(Parser, Debug)]
#[command(name = "pixie", version, about)]
struct Args {
    /// Path to config.toml (defaults to ~/.config/pixie/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the inference server, overriding the config file
    #[arg(long)]
    server_url: Option<String>,

    /// Start with web search enabled
    #[arg(long)]
    search: bool,

    /// Load the model before the first question
    #[arg(long)]
    preload: bool,

    /// Write a starter config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging is best-effort; the REPL works without it.
    let _log_guard = match PixiePaths::log_dir().and_then(|dir| init_logging(&dir)) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("{}", format!("Logging disabled: {err}").bright_black());
            None
        }
    };

    let config_service = match &args.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    tracing::info!("[Readline] Config file {}", config_service.path().display());

    if args.init_config {
        let path = config_service.save_default()?;
        println!("{}", format!("Wrote {}", path.display()).bright_green());
        return Ok(());
    }

    let mut config = config_service.load()?;
    if let Some(url) = args.server_url {
        config.model.server_url = url;
    }
    let mut use_search = args.search || config.search.enabled_by_default;

    let mut session = ChatSession::new(build_services(&config)?);

    println!("{}", format!("=== {} ===", config.persona.name).bright_magenta().bold());
    println!(
        "{}",
        format!("Model {} via {}", config.model.id, config.model.server_url).bright_black()
    );
    println!("{}", "Type a question, or /help for commands.".bright_black());
    println!();

    if args.preload {
        println!("{}", TaskStatus::LoadingModel.to_string().bright_black());
        match session.services().engine.load().await {
            Ok(handle) => {
                println!("{}", format!("Loaded {}", handle.resolved_name).bright_black());
            }
            Err(err) => eprintln!("{}", err.to_string().red()),
        }
    }

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    loop {
        let prompt = if use_search { "[web] >> " } else { ">> " };
        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Input error: {err}").red());
                break;
            }
        };

        let Some(command) = Command::parse(&line) else {
            continue;
        };
        let _ = rl.add_history_entry(line.trim());

        match command {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::ToggleSearch => {
                use_search = !use_search;
                let state = if use_search { "on" } else { "off" };
                println!("{}", format!("Web search {state}").bright_yellow());
            }
            Command::History => print_history(&session),
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command {name}; try /help").bright_black());
            }
            Command::Ask(question) => ask(&mut session, &question, use_search).await,
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

fn build_services(config: &AppConfig) -> Result<TurnServices> {
    let backend = Arc::new(LlamaServerBackend::new(config.model.server_url.clone()));
    let provider = Arc::new(DuckDuckGoSearch::new(Duration::from_secs(
        config.search.timeout_secs,
    ))?);

    Ok(TurnServices {
        engine: Arc::new(InferenceEngine::new(backend, config.model.id.clone())),
        search: SearchGateway::new(provider, config.search.max_results),
        prompt_builder: PromptBuilder::new(config.persona.clone()),
        params: config.generation,
    })
}

/// Runs one turn to completion, rendering events as they arrive.
async fn ask(session: &mut ChatSession, question: &str, use_search: bool) {
    let mut streaming = false;

    let result = session
        .run_turn(question, use_search, |event| match event {
            StreamEvent::StatusChanged(status) => {
                println!("{}", status.to_string().bright_black());
            }
            StreamEvent::TokenProduced(fragment) => {
                streaming = true;
                print!("{}", fragment.bright_blue());
                let _ = std::io::stdout().flush();
            }
            StreamEvent::Completed(_) | StreamEvent::Failed(_) => {}
        })
        .await;

    if streaming {
        println!();
    }
    match result {
        Ok(_) => println!("{}", "Ready".bright_black()),
        Err(err) => {
            tracing::debug!("[Readline] turn error kind={:?}", err.kind());
            eprintln!("{}", format!("Error: {err}").red());
        }
    }
    println!();
}

fn print_history(session: &ChatSession) {
    let history = session.history();
    if history.is_empty() {
        println!("{}", "No conversation yet.".bright_black());
        return;
    }

    for turn in history.turns() {
        // RFC 3339: keep the HH:MM:SS part
        let stamp = turn.timestamp.get(11..19).unwrap_or(&turn.timestamp);
        match turn.role {
            Role::User => {
                let line = format!("> {}", turn.content);
                println!("{} {}", stamp.bright_black(), line.green());
            }
            Role::Assistant => println!("{} {}", stamp.bright_black(), turn.content.bright_blue()),
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_yellow());
    println!("  {}  toggle web search for the next questions", "/search".bright_cyan());
    println!("  {} show this conversation", "/history".bright_cyan());
    println!("  {}    show this help", "/help".bright_cyan());
    println!("  {}    exit", "/quit".bright_cyan());
}
