//! AgroCam - multi-agent agricultural advisory for Cameroon
//!
//! CLI entry point for the AgroCam server and tools.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod api;
mod cli;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    let service = cli.command.as_ref().is_some_and(|c| c.is_service());
    let _guard = init_logging(service);

    if service {
        info!("Starting AgroCam v{}", env!("CARGO_PKG_VERSION"));
    }

    cli::run(cli).await
}

/// Console logging plus a daily log file; the guard flushes the file on drop
fn init_logging(service: bool) -> Option<WorkerGuard> {
    let default_filter = if service {
        "agrocam=info,tower_http=info"
    } else {
        "agrocam=warn"
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let json = env_flag("AGROCAM_LOG_JSON", false);
    let console = if json {
        tracing_subscriber::fmt::layer().json().with_filter(filter()).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_filter(filter()).boxed()
    };

    let (file, guard) = match log_dir().filter(|_| env_flag("AGROCAM_LOG_FILE", true)) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "agrocam.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter())
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

fn log_dir() -> Option<std::path::PathBuf> {
    let dir = dirs::data_local_dir()?.join("agrocam").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
