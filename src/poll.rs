//! Watch loop: poll metadata, reconcile, download, sleep, repeat.
//!
//! The loop is a state machine. Per-cycle data (snapshot, attachment set,
//! pending set, counter) lives only inside the state that needs it and is
//! dropped on the way back to [`State::Polling`].

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::download::{self, DownloadContext, PendingSet};
use crate::notify::Notifier;
use crate::remote::metadata::{self, MetadataOutcome};
use crate::remote::ChanApi;
use crate::snapshot::{AttachmentSet, Extraction, ThreadSnapshot};
use crate::systemd::SystemdNotifier;

/// Ways a watch ends without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The opening post reports the thread archived.
    Archived,
    /// A placeholder page came back instead of metadata.
    Redirected,
    /// The metadata endpoint returned nothing.
    NotFound,
    /// Shutdown was requested by signal.
    Interrupted,
}

impl Terminal {
    fn status_line(&self) -> &'static str {
        match self {
            Terminal::Archived => "Thread archived",
            Terminal::Redirected => "Thread redirected (removed)",
            Terminal::NotFound => "Thread not found (404)",
            Terminal::Interrupted => "Stopped",
        }
    }

    fn notification(&self, board: &str, folder: &str) -> Option<String> {
        match self {
            Terminal::Archived => Some(format!("{board} {folder} became archived")),
            Terminal::Redirected => Some(format!("{board} {folder} was redirected (thread removed)")),
            Terminal::NotFound => Some(format!("{board} {folder} returned 404 (thread removed)")),
            Terminal::Interrupted => None,
        }
    }
}

#[derive(Debug)]
enum State {
    Polling,
    Reconciling(AttachmentSet),
    Downloading(PendingSet),
    Sleeping { downloaded: u64 },
    Done(Terminal),
}

/// Result of a single pass from `Polling` up to (not including) the sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Finished { downloaded: u64 },
    Terminal(Terminal),
}

pub struct Poller<'a> {
    api: &'a dyn ChanApi,
    notifier: &'a dyn Notifier,
    systemd: SystemdNotifier,
    config: &'a Config,
    shutdown: CancellationToken,
}

impl<'a> Poller<'a> {
    pub fn new(
        api: &'a dyn ChanApi,
        notifier: &'a dyn Notifier,
        systemd: SystemdNotifier,
        config: &'a Config,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            api,
            notifier,
            systemd,
            config,
            shutdown,
        }
    }

    /// Run until a terminal state. `Err` is the fatal path: malformed
    /// metadata or a local filesystem failure.
    pub async fn run(&self) -> anyhow::Result<Terminal> {
        let thread = self.config.thread.to_string();
        self.systemd.ready(&thread);

        let result = loop {
            match self.run_cycle().await {
                Ok(CycleOutcome::Finished { downloaded }) => {
                    if let Some(terminal) = self.sleep(downloaded).await {
                        break Ok(terminal);
                    }
                }
                Ok(CycleOutcome::Terminal(terminal)) => break Ok(terminal),
                Err(e) => break Err(e),
            }
        };

        match &result {
            Ok(terminal) => {
                self.conclude(*terminal).await;
                self.systemd.stopping(terminal.status_line());
            }
            Err(e) => {
                tracing::error!("Watch of {} failed: {:#}", thread, e);
                self.systemd.stopping("Failed");
            }
        }
        result
    }

    /// One poll/reconcile/download pass, stopping short of the sleep.
    pub async fn run_cycle(&self) -> anyhow::Result<CycleOutcome> {
        let mut state = State::Polling;
        loop {
            state = match state {
                State::Done(terminal) => return Ok(CycleOutcome::Terminal(terminal)),
                State::Sleeping { downloaded } => {
                    return Ok(CycleOutcome::Finished { downloaded })
                }
                other => self.step(other).await?,
            };
        }
    }

    async fn step(&self, state: State) -> anyhow::Result<State> {
        let next = match state {
            State::Polling => {
                let outcome = metadata::fetch_thread(
                    self.api,
                    &self.config.thread,
                    self.config.pacing.retry_delay,
                    self.systemd,
                )
                .await?;
                match outcome {
                    MetadataOutcome::Redirected => State::Done(Terminal::Redirected),
                    MetadataOutcome::NotFound => State::Done(Terminal::NotFound),
                    MetadataOutcome::Body(body) => {
                        let snapshot = ThreadSnapshot::parse(&body)?;
                        match snapshot.extract(self.config.bypass_archive_check) {
                            Extraction::Archived => State::Done(Terminal::Archived),
                            Extraction::Attachments(set) => {
                                tracing::debug!(attachments = set.len(), "Snapshot parsed");
                                State::Reconciling(set)
                            }
                        }
                    }
                }
            }
            State::Reconciling(attachments) => {
                let pending = download::reconcile(&self.config.directory, &attachments)
                    .with_context(|| {
                        format!("Failed to list {}", self.config.directory.display())
                    })?;
                tracing::info!(
                    wanted = attachments.len(),
                    pending = pending.len(),
                    "Reconciled with local files"
                );
                State::Downloading(pending)
            }
            State::Downloading(pending) => {
                let ctx = DownloadContext {
                    api: self.api,
                    board: &self.config.thread.board,
                    directory: &self.config.directory,
                    pacing: self.config.pacing,
                    no_progress_bar: self.config.no_progress_bar,
                    shutdown: &self.shutdown,
                    systemd: self.systemd,
                };
                let downloaded = download::fetch_pending(&ctx, &pending).await?;
                State::Sleeping { downloaded }
            }
            terminal_or_sleeping => terminal_or_sleeping,
        };
        Ok(next)
    }

    /// Report the finished cycle and wait out the poll interval. `Some` when
    /// shutdown was requested during the wait.
    async fn sleep(&self, downloaded: u64) -> Option<Terminal> {
        println!("Downloaded {} files", downloaded);
        self.systemd
            .cycle_finished(&self.config.thread.to_string(), downloaded);

        tracing::debug!(
            "Waiting {} seconds...",
            self.config.poll_interval.as_secs()
        );
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Some(Terminal::Interrupted),
            _ = tokio::time::sleep(self.config.poll_interval) => None,
        }
    }

    async fn conclude(&self, terminal: Terminal) {
        println!("{}", terminal.status_line());
        if let Some(message) =
            terminal.notification(&self.config.thread.board, &self.config.folder_name())
        {
            self.notifier.notify(&message).await;
        }
        tracing::info!(thread = %self.config.thread, ?terminal, "Watch finished");
    }
}
