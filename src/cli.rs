use clap::Parser;

use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "threadpull",
    about = "Download a thread's attachments and keep polling for new ones"
)]
pub struct Cli {
    /// Thread URL, e.g. https://boards.4chan.org/c/thread/4322780
    pub url: String,

    /// Local directory for downloads (created if missing)
    pub directory: String,

    /// Seconds to wait between polls
    pub interval: u64,

    /// Any value here disables the archive check (positional form)
    #[arg(hide = true)]
    pub bypass: Option<String>,

    /// Keep downloading even after the thread reports itself archived
    #[arg(long)]
    pub bypass_archive_check: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Log terminal events instead of sending desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Report readiness and status to systemd
    #[arg(long)]
    pub notify_systemd: bool,
}

impl Cli {
    pub fn bypass_archive_check(&self) -> bool {
        self.bypass_archive_check || self.bypass.is_some()
    }
}
