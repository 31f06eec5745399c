//! Main Entrypoint for the LangChat Terminal Client
//!
//! This binary is responsible for:
//! 1. Resolving configuration from flags, the environment and `.env`.
//! 2. Initializing logging on stderr.
//! 3. Probing the backend's health endpoint.
//! 4. Running one message (`--message`) or an interactive loop on stdin.

use anyhow::Context;
use clap::Parser;
use langchat_cli::{config::Config, render::Renderer, repl};
use langchat_core::{ChatBackend, ChatSession, HttpBackend};
use tokio::io::BufReader;
use tracing::{info, warn};

/// Chat with a streaming LangChat backend from the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Backend base URL. Overrides LANGCHAT_BACKEND_URL.
    #[arg(long)]
    backend_url: Option<String>,
    /// Maximum log level (error, warn, info, debug, trace). Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
    /// Send a single message, print the reply, and exit.
    #[arg(short, long)]
    message: Option<String>,
    /// Skip the startup health probe.
    #[arg(long)]
    no_health: bool,
}

/// Listens for the `Ctrl+C` signal to stop the client.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal.");
}

async fn probe_health(backend: &HttpBackend) {
    match backend.health().await {
        Ok(health) if health.status == "ok" => info!("Backend is healthy."),
        Ok(health) => warn!(status = %health.status, "Backend reported an unexpected health status"),
        Err(e) => warn!(error = %e, "Backend health probe failed"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --- 1. Load Configuration ---
    let config = Config::resolve(args.backend_url, args.log_level)
        .context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    // --- 3. Connect to Backend ---
    let backend =
        HttpBackend::new(config.backend_url.as_str()).context("Failed to create backend client")?;
    if !args.no_health {
        probe_health(&backend).await;
    }

    let mut session = ChatSession::new();
    let mut events = session.subscribe();
    info!(chat_id = %session.chat_id(), backend_url = %config.backend_url, "Chat session started");

    // --- 4. Run ---
    let one_shot = args.message.is_some();
    let mut renderer = Renderer::new(std::io::stdout(), one_shot);
    let run = async {
        match args.message {
            Some(message) => {
                session.set_input(message);
                repl::run_turn(&mut session, &backend, &mut events, &mut renderer)
                    .await
                    .map(|_| ())
            }
            None => {
                let stdin = BufReader::new(tokio::io::stdin());
                repl::run_interactive(&mut session, &backend, &mut events, stdin, &mut renderer)
                    .await
            }
        }
    };

    tokio::select! {
        result = run => result?,
        _ = shutdown_signal() => {}
    }

    info!(messages = session.transcript().len(), "Chat session ended.");
    Ok(())
}
