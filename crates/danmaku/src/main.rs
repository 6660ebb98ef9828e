// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! danmaku - relays Bilibili live-room events into an AI chat pipeline.
//!
//! This is the binary entry point.

mod app;
mod relay;
mod serve;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use danmaku_config::DanmakuConfig;
use danmaku_core::DanmakuError;

/// danmaku - relays Bilibili live-room events into an AI chat pipeline.
#[derive(Parser, Debug)]
#[command(name = "danmaku", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll the relay and forward new events until interrupted.
    Serve {
        /// Milliseconds between polls. Overrides `polling.interval_ms`.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },
    /// Show the relay's running state and buffered event count.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Update the stored relay settings and push credentials to the relay.
    Configure(relay::ConfigureArgs),
    /// Ask the relay to stop.
    Stop,
    /// Print the relay's pending events without forwarding them.
    Fetch {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the persisted watermark and relay settings.
    State {
        /// Forget the watermark so buffered events are forwarded again.
        #[arg(long)]
        reset_watermark: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => danmaku_config::load_and_validate_path(path),
        None => danmaku_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            danmaku_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli.command, config).await {
        print_failure(&e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: DanmakuConfig) -> Result<(), DanmakuError> {
    match command {
        Commands::Serve { interval_ms } => serve::run_serve(config, interval_ms).await,
        Commands::Status { json } => relay::run_status(config, json).await,
        Commands::Configure(args) => relay::run_configure(config, args).await,
        Commands::Stop => relay::run_stop(config).await,
        Commands::Fetch { json } => relay::run_fetch(config, json).await,
        Commands::State { reset_watermark } => state::run_state(config, reset_watermark).await,
    }
}

/// Relay failures carry the client's error slot, which is already a
/// complete user-facing sentence.
fn print_failure(error: &DanmakuError) {
    use colored::Colorize;
    use std::io::IsTerminal;

    let text = match error {
        DanmakuError::Relay { message, .. } => message.clone(),
        other => other.to_string(),
    };
    if std::io::stderr().is_terminal() {
        eprintln!("{} {text}", "error:".red().bold());
    } else {
        eprintln!("error: {text}");
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("danmaku={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
