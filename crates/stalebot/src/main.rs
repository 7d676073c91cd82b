//! Jira stale bot CLI.
//!
//! Runs once against the project in the config file and exits.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use jira_stalebot::{load_personal_access_token, Config, Stalebot, TerminalConfirmer};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Mark inactive Jira issues stale and close them.
#[derive(Parser)]
#[command(name = "jira-stalebot", version, about)]
struct Cli {
    /// Path to the stalebot config file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log operations without changing any issue.
    #[arg(long)]
    dry_run: bool,

    /// Log verbosity: 0 info, 1 debug, 2 or more trace.
    #[arg(short, long, default_value_t = 0)]
    verbosity: u32,

    /// Apply operations without asking for confirmation.
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    if let Err(e) = run(cli, &cancel).await {
        error!(error = %format!("{e:#}"), "stalebot failed");
        // A pending prompt read holds a blocking thread; exit without
        // waiting for it.
        std::process::exit(1);
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<()> {
    let token = load_personal_access_token().context("load personal access token")?;
    let config = Config::load(&cli.config).context("load stalebot config")?;
    let client = jira::Client::new(&config.jira_base_url, &token).context("create jira client")?;

    let mut bot = Stalebot::new(client, config).dry_run(cli.dry_run);
    if !cli.yes {
        bot = bot.with_confirmer(TerminalConfirmer);
    }

    let summary = bot.run(cancel).await.context("run stalebot")?;
    info!(
        processed = summary.processed,
        acted = summary.acted,
        limit_reached = summary.limit_reached,
        dry_run = cli.dry_run,
        "stalebot finished"
    );
    Ok(())
}

/// Our crates log at the requested level, everything else at warn.
/// `RUST_LOG` replaces the whole filter when set.
fn init_tracing(verbosity: u32) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,jira_stalebot={level},jira={level}")));

    let interactive = std::io::stdin().is_terminal()
        || std::io::stdout().is_terminal()
        || std::io::stderr().is_terminal();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if interactive {
        builder.with_target(false).init();
    } else {
        builder.json().init();
    }
}

async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let Ok(mut terminate) = signal(SignalKind::terminate()) else {
            tokio::signal::ctrl_c().await.ok();
            cancel.cancel();
            return;
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("received SIGINT, cancelling"),
            _ = terminate.recv() => info!("received SIGTERM, cancelling"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
        info!("received interrupt, cancelling");
    }
    cancel.cancel();
}
