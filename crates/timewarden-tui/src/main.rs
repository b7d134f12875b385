//! Timewarden — terminal dashboard for administering remote
//! screen-time accounts.

mod action;
mod app;
mod component;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use timewarden_api::{Client, TransportConfig};
use timewarden_core::{Session, TokenStore};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "timewarden", version, about = "Screen-time administration TUI")]
struct Cli {
    /// Backend base URL, including the API prefix.
    #[arg(long, env = "TIMEWARDEN_BACKEND_URL")]
    backend_url: Option<String>,

    /// Accept invalid TLS certificates (self-signed backends).
    #[arg(long)]
    insecure: bool,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Log filter, e.g. `info` or `timewarden=debug`.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // The TUI owns the terminal, so logs go to a daily file instead.
    let appender = tracing_appender::rolling::daily(timewarden_config::log_dir(), "timewarden.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let mut config = timewarden_config::load_config_or_default();
    if let Some(backend_url) = cli.backend_url {
        config.backend_url = backend_url;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if cli.insecure {
        config.insecure = true;
    }

    info!(backend_url = %config.backend_url, "starting");

    let transport = TransportConfig {
        timeout: Duration::from_secs(config.timeout),
        insecure: config.insecure,
    };
    let client = Arc::new(Client::new(&config.backend_url, &transport)?);
    let store = TokenStore::new(timewarden_config::token_path());

    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let session = Arc::new(Session::new(client, store, ui_tx));

    App::new(session, config, ui_rx).run().await
}
