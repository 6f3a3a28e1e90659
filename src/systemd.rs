//! sd_notify integration for running the watcher as a systemd service.
//!
//! Every call is a no-op unless enabled, and on non-Linux platforms.
//! WATCHDOG is sent before every request attempt, not once per cycle, so a
//! long run of retries or rate-limit waits keeps the service alive as long
//! as each single wait is shorter than `WatchdogSec`.

/// One state update to send to the service manager.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ServiceState {
    Ready,
    Stopping,
    Watchdog,
    Status(String),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SystemdNotifier {
    enabled: bool,
}

fn ready_states(thread: &str) -> Vec<ServiceState> {
    vec![
        ServiceState::Ready,
        ServiceState::Status(format!("Watching {thread}")),
    ]
}

fn cycle_states(thread: &str, downloaded: u64) -> Vec<ServiceState> {
    vec![
        ServiceState::Watchdog,
        ServiceState::Status(format!("Watching {thread}, {downloaded} new files last cycle")),
    ]
}

impl SystemdNotifier {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Watch loop is about to make its first poll.
    pub(crate) fn ready(&self, thread: &str) {
        self.send(&ready_states(thread));
    }

    /// Keepalive; called ahead of every metadata and attachment request.
    pub(crate) fn watchdog(&self) {
        self.send(&[ServiceState::Watchdog]);
    }

    pub(crate) fn cycle_finished(&self, thread: &str, downloaded: u64) {
        self.send(&cycle_states(thread, downloaded));
    }

    pub(crate) fn stopping(&self, reason: &str) {
        self.send(&[
            ServiceState::Stopping,
            ServiceState::Status(reason.to_string()),
        ]);
    }

    fn send(&self, states: &[ServiceState]) {
        if !self.enabled {
            return;
        }
        self.send_impl(states);
    }

    #[cfg(target_os = "linux")]
    fn send_impl(&self, states: &[ServiceState]) {
        use sd_notify::NotifyState;

        let mapped: Vec<NotifyState<'_>> = states
            .iter()
            .map(|s| match s {
                ServiceState::Ready => NotifyState::Ready,
                ServiceState::Stopping => NotifyState::Stopping,
                ServiceState::Watchdog => NotifyState::Watchdog,
                ServiceState::Status(msg) => NotifyState::Status(msg.as_str()),
            })
            .collect();
        if let Err(e) = sd_notify::notify(false, &mapped) {
            tracing::debug!(error = %e, ?states, "sd_notify failed");
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn send_impl(&self, _states: &[ServiceState]) {}
}
