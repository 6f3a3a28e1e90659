//! Stop requests from the terminal or the service manager.
//!
//! SIGINT, SIGTERM and SIGHUP all mean the same thing here. The first one
//! cancels the watch token: the current attachment is allowed to finish, no
//! further one is started, and the watcher exits at its next sleep without
//! sending a notification. Any later signal exits immediately with 130.

use tokio_util::sync::CancellationToken;

/// Exit status for a forced stop, as a shell reports SIGINT.
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// Let the watcher wind down on its own.
    Cancel,
    /// The operator asked twice; stop now.
    ForceExit,
}

/// `received` counts signals including the one being handled.
fn on_signal(received: u32) -> SignalAction {
    if received <= 1 {
        SignalAction::Cancel
    } else {
        SignalAction::ForceExit
    }
}

/// The three stop signals, registered once and awaited together.
struct StopSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl StopSignals {
    fn register() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                terminate: signal(SignalKind::terminate())?,
                hangup: signal(SignalKind::hangup())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next stop signal; `None` once no signal can arrive.
    async fn recv(&mut self) -> Option<&'static str> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => res.ok().map(|_| "SIGINT"),
                sig = self.terminate.recv() => sig.map(|_| "SIGTERM"),
                sig = self.hangup.recv() => sig.map(|_| "SIGHUP"),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok().map(|_| "Ctrl+C")
        }
    }
}

/// Start listening for stop signals and return the token they cancel.
pub(crate) fn install_signal_handler() -> anyhow::Result<CancellationToken> {
    let mut signals = StopSignals::register()?;
    let token = CancellationToken::new();
    let watch = token.clone();

    tokio::spawn(async move {
        let mut received = 0u32;
        while let Some(name) = signals.recv().await {
            received += 1;
            match on_signal(received) {
                SignalAction::Cancel => {
                    tracing::info!(
                        signal = name,
                        "Stopping after the current attachment; signal again to quit now"
                    );
                    watch.cancel();
                }
                SignalAction::ForceExit => {
                    tracing::warn!(signal = name, "Quitting without waiting");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
        tracing::debug!("Signal listener closed");
    });

    Ok(token)
}
