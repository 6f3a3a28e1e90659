//! threadpull — keep a local folder in sync with a thread's attachments.
//!
//! Polls the thread's JSON metadata on an interval, downloads any attachment
//! not already present by name, and stops once the thread is archived,
//! redirected, or gone. Requests are paced and rate-limited replies are
//! waited out rather than skipped.

#![warn(clippy::all)]

mod cli;
mod config;
mod download;
mod notify;
mod poll;
mod remote;
pub mod retry;
mod shutdown;
mod snapshot;
mod systemd;
mod thread;
mod types;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use notify::{DesktopNotifier, LogNotifier, Notifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    // A bad thread URL is an input mistake, not a failure of the watcher.
    let config = match config::Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    tokio::fs::create_dir_all(&config.directory)
        .await
        .with_context(|| format!("Failed to create {}", config.directory.display()))?;

    let api = remote::ChanClient::new(config.endpoints.clone())?;
    let notifier: Box<dyn Notifier> = if config.desktop_notifications {
        Box::new(DesktopNotifier::default())
    } else {
        Box::new(LogNotifier)
    };
    let systemd = systemd::SystemdNotifier::new(config.notify_systemd);
    let shutdown_token = shutdown::install_signal_handler()?;

    tracing::info!(
        thread = %config.thread,
        directory = %config.directory.display(),
        interval_secs = config.poll_interval.as_secs(),
        bypass_archive_check = config.bypass_archive_check,
        "Starting threadpull"
    );

    let poller = poll::Poller::new(&api, notifier.as_ref(), systemd, &config, shutdown_token);
    let terminal = poller.run().await?;
    tracing::debug!(?terminal, "Exiting");

    Ok(())
}
