//! Attachment fetcher — walks the pending set one file at a time.
//!
//! Nothing runs in parallel: the media host rate-limits aggressively, so
//! every attempt is followed by a fixed pause and a rate-limited response
//! holds the loop on the same file until it clears.

pub mod error;
pub mod file;
pub mod reconcile;

use std::io::IsTerminal;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use crate::config::Pacing;
use crate::remote::ChanApi;
use crate::systemd::SystemdNotifier;
use error::DownloadError;

pub use reconcile::{reconcile, PendingSet};

/// Body length of the media host's "too many requests" reply.
pub const RATE_LIMITED_BODY_LEN: u64 = 17;

/// How a transfer that reached the end of its body should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Completed(u64),
    RateLimited,
}

/// Exact-length match only; one byte either side is a real file.
pub fn classify_attempt(bytes_written: u64) -> AttemptOutcome {
    if bytes_written == RATE_LIMITED_BODY_LEN {
        AttemptOutcome::RateLimited
    } else {
        AttemptOutcome::Completed(bytes_written)
    }
}

/// Returns `ProgressBar::hidden()` when disabled or stdout is not a TTY.
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Everything a fetch pass needs besides the pending set itself.
pub struct DownloadContext<'a> {
    pub(crate) api: &'a dyn ChanApi,
    pub(crate) board: &'a str,
    pub(crate) directory: &'a Path,
    pub(crate) pacing: Pacing,
    pub(crate) no_progress_bar: bool,
    pub(crate) shutdown: &'a CancellationToken,
    pub(crate) systemd: SystemdNotifier,
}

/// Download every pending attachment into `ctx.directory`.
///
/// Each entry is retried until it lands: transport failures wait
/// `pacing.retry_delay`, rate-limited replies wait `pacing.rate_limit_delay`,
/// and a completed file is followed by `pacing.request_delay` before the next
/// one starts. Only a local disk failure ends the pass early with an error.
/// Once `shutdown` is cancelled no further entry is started.
///
/// Returns the number of attachments completed.
pub async fn fetch_pending(
    ctx: &DownloadContext<'_>,
    pending: &PendingSet,
) -> Result<u64, DownloadError> {
    if pending.is_empty() {
        return Ok(0);
    }

    let pacing = ctx.pacing;
    let pb = create_progress_bar(ctx.no_progress_bar, pending.len() as u64);
    let mut completed = 0u64;

    for (file_name, declared_size) in pending.iter() {
        if ctx.shutdown.is_cancelled() {
            pb.suspend(|| tracing::info!("Shutdown requested, stopping new downloads"));
            break;
        }
        pb.set_message(file_name.clone());
        let dest = ctx.directory.join(file_name);

        loop {
            ctx.systemd.watchdog();
            match ctx.api.download_attachment(ctx.board, file_name, &dest).await {
                Ok(bytes) => match classify_attempt(bytes) {
                    AttemptOutcome::RateLimited => {
                        pb.suspend(|| {
                            tracing::warn!(
                                "Too many requests on {}, waiting {}s",
                                file_name,
                                pacing.rate_limit_delay.as_secs()
                            )
                        });
                        tokio::time::sleep(pacing.rate_limit_delay).await;
                    }
                    AttemptOutcome::Completed(bytes) => {
                        tracing::debug!(
                            file = %file_name,
                            bytes,
                            declared = declared_size,
                            "Downloaded"
                        );
                        completed += 1;
                        pb.inc(1);
                        tokio::time::sleep(pacing.request_delay).await;
                        break;
                    }
                },
                Err(e) if e.is_retryable() => {
                    pb.suspend(|| tracing::warn!("Download of {} failed, retrying: {}", file_name, e));
                    tokio::time::sleep(pacing.retry_delay).await;
                }
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e);
                }
            }
        }
    }

    pb.finish_and_clear();
    Ok(completed)
}
