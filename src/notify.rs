//! Operator notifications for the end of a watch.
//!
//! Delivery is best-effort: a missing `notify-send` or a headless session is
//! logged and otherwise ignored, it never changes how the process exits.

use tokio::process::Command;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Sends a desktop notification through `notify-send`.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: String,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self {
            program: "notify-send".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, message: &str) {
        match Command::new(&self.program).arg(message).status().await {
            Ok(status) if status.success() => {
                tracing::debug!(%message, "Desktop notification sent");
            }
            Ok(status) => {
                tracing::warn!(%message, ?status, "{} exited unsuccessfully", self.program);
            }
            Err(e) => {
                tracing::warn!(%message, "Could not run {}: {}", self.program, e);
            }
        }
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Captures every message for assertions.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) messages: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    /// Log sink shared with the subscriber installed for one test.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn install(&self) -> tracing::subscriber::DefaultGuard {
            let sink = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || sink.clone())
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn missing_program_is_logged_not_raised() {
        let log = CapturedLog::default();
        let _guard = log.install();
        let n = DesktopNotifier {
            program: "threadpull-no-such-notifier".to_string(),
        };
        n.notify("c cute became archived").await;

        let text = log.text();
        assert!(text.contains("WARN"));
        assert!(text.contains("Could not run threadpull-no-such-notifier"));
    }

    #[tokio::test]
    async fn log_notifier_writes_message_at_info() {
        let log = CapturedLog::default();
        let _guard = log.install();
        LogNotifier.notify("c cute became archived").await;

        let text = log.text();
        assert!(text.contains("INFO"));
        assert!(text.contains("c cute became archived"));
    }
}
