use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trendmaker_core::{AskClient, ChatView, Config, Message, Sender};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "trendmaker", version)]
#[command(about = "Chat with the TrendMaker marketing strategy assistant")]
struct Cli {
    /// Base URL of the ask service (overrides the config file)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Increase log verbosity (-v enables debug logs for trendmaker)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Where the interactive UI writes its log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the reply
    Ask {
        /// Your question
        message: String,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The interactive UI owns the terminal, so its logs go to a file
    let log_target = match cli.command {
        None => Some(match &cli.log_file {
            Some(path) => path.clone(),
            None => default_log_path()?,
        }),
        Some(_) => cli.log_file.clone(),
    };
    init_logging(cli.verbose, log_target.as_deref())?;

    let config_path = Config::config_path().ok();
    let mut config = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::new(),
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    info!(endpoint = %config.endpoint, "configuration loaded");

    match cli.command {
        None => run_tui(config, config_path).await?,
        Some(Commands::Ask { message }) => ask_once(&config.endpoint, &message).await,
        Some(Commands::Config) => show_config(&config, config_path.as_deref()),
    }

    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?;
    Ok(dir.join("trendmaker").join("trendmaker.log"))
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let mut env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());

    if verbose > 0 {
        for directive in ["trendmaker=debug", "trendmaker_core=debug"] {
            if let Ok(parsed) = directive.parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

async fn run_tui(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let backend = Arc::new(AskClient::new(&config.endpoint));
    let mut app = App::new(config, config_path, backend, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn ask_once(endpoint: &str, message: &str) {
    let client = AskClient::new(endpoint);
    let mut view = ChatView::new();
    view.set_input(message);

    if view.send(&client).await.is_none() {
        println!("{}", "Nothing to send: the message is empty".yellow());
        return;
    }

    for msg in view.log() {
        print_message(msg);
    }
}

fn print_message(msg: &Message) {
    match msg.sender() {
        Sender::User => println!("{} {}", "You:".bold().cyan(), msg.text()),
        Sender::Agent => println!("{} {}", "Agent:".bold().yellow(), msg.text()),
    }
}

fn show_config(config: &Config, path: Option<&Path>) {
    println!("\n{}", "⚙️  TrendMaker Configuration".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    let path_text = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no config directory)".to_string());
    println!("{:<12} {}", "File:".bold(), path_text.dimmed());
    println!("{:<12} {}", "Endpoint:".bold(), config.endpoint.green());
    println!("{:<12} {}", "Theme:".bold(), config.theme.as_str());
    println!("{:<12} {}%", "Dashboard:".bold(), config.dashboard_percent);
}
