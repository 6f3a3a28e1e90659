use std::path::PathBuf;
use std::time::Duration;

use crate::remote::Endpoints;
use crate::thread::{ThreadRef, ThreadRefError};

/// Fixed delays the remote service's usage policy asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after every completed attachment.
    pub request_delay: Duration,
    /// Pause before retrying after a transport failure.
    pub retry_delay: Duration,
    /// Pause before retrying a rate-limited attachment.
    pub rate_limit_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_secs(1),
            retry_delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
impl Pacing {
    pub(crate) fn immediate() -> Self {
        Self {
            request_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
        }
    }
}

/// Application configuration, built once from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub thread: ThreadRef,
    pub directory: PathBuf,
    pub poll_interval: Duration,
    pub pacing: Pacing,
    pub endpoints: Endpoints,

    pub bypass_archive_check: bool,
    pub no_progress_bar: bool,
    pub desktop_notifications: bool,
    pub notify_systemd: bool,
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Fails only when the thread URL does not have the canonical shape.
    pub fn from_cli(cli: crate::cli::Cli) -> Result<Self, ThreadRefError> {
        let thread = ThreadRef::parse(&cli.url)?;
        let bypass_archive_check = cli.bypass_archive_check();

        Ok(Self {
            thread,
            directory: expand_tilde(&cli.directory),
            poll_interval: Duration::from_secs(cli.interval),
            pacing: Pacing::default(),
            endpoints: Endpoints::default(),
            bypass_archive_check,
            no_progress_bar: cli.no_progress_bar,
            desktop_notifications: !cli.no_notify,
            notify_systemd: cli.notify_systemd,
        })
    }

    /// Last component of the destination directory, as shown to the operator.
    pub fn folder_name(&self) -> String {
        self.directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.directory.display().to_string())
    }
}
