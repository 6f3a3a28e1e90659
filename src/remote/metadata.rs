//! Thread metadata polling with retry-forever on transient failure.

use std::time::Duration;

use super::{ChanApi, RemoteError};
use crate::retry::{self, RetryAction};
use crate::systemd::SystemdNotifier;
use crate::thread::ThreadRef;

/// Leading bytes of the placeholder page served instead of JSON once a
/// thread has been taken down.
const REDIRECT_MARKER: &str = "<html>";

/// What one successful metadata poll tells us about the thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// The raw JSON document for this cycle.
    Body(String),
    /// A landing page came back instead of data.
    Redirected,
    /// Nothing came back at all.
    NotFound,
}

/// Classify a completed metadata response.
pub fn classify(status: u16, body: String) -> MetadataOutcome {
    if status == 404 || body.is_empty() {
        MetadataOutcome::NotFound
    } else if (300..400).contains(&status) || body.starts_with(REDIRECT_MARKER) {
        MetadataOutcome::Redirected
    } else {
        MetadataOutcome::Body(body)
    }
}

/// Poll the thread's metadata until the server gives a usable answer.
///
/// Transport failures, 429 and 5xx responses are waited out with
/// `retry_delay` between attempts, indefinitely. The watchdog is pinged
/// ahead of every attempt.
pub async fn fetch_thread(
    api: &dyn ChanApi,
    thread: &ThreadRef,
    retry_delay: Duration,
    systemd: SystemdNotifier,
) -> Result<MetadataOutcome, RemoteError> {
    let response = retry::retry_forever(
        retry_delay,
        |e: &RemoteError| {
            if e.is_transient() {
                RetryAction::Retry
            } else {
                RetryAction::Abort
            }
        },
        || async move {
            systemd.watchdog();
            let response = api.get_thread(thread).await?;
            if response.status == 429 || response.status >= 500 {
                return Err(RemoteError::Status {
                    status: response.status,
                    url: thread.to_string(),
                });
            }
            Ok(response)
        },
    )
    .await?;

    tracing::debug!(
        status = response.status,
        bytes = response.body.len(),
        "Thread metadata received"
    );
    Ok(classify(response.status, response.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::{FakeApi, ThreadReply};

    fn thread() -> ThreadRef {
        ThreadRef {
            board: "c".into(),
            thread_id: "1".into(),
        }
    }

    #[test]
    fn test_empty_body_is_not_found() {
        assert_eq!(classify(200, String::new()), MetadataOutcome::NotFound);
    }

    #[test]
    fn test_404_is_not_found() {
        assert_eq!(
            classify(404, "<html>404</html>".into()),
            MetadataOutcome::NotFound
        );
    }

    #[test]
    fn test_html_body_is_redirected() {
        assert_eq!(
            classify(200, "<html><head></head></html>".into()),
            MetadataOutcome::Redirected
        );
    }

    #[test]
    fn test_redirect_status_is_redirected() {
        assert_eq!(
            classify(302, "see elsewhere".into()),
            MetadataOutcome::Redirected
        );
    }

    #[test]
    fn test_marker_must_lead() {
        let body = r#"{"posts":[{"com":"<html>"}]}"#.to_string();
        assert_eq!(classify(200, body.clone()), MetadataOutcome::Body(body));
    }

    #[tokio::test]
    async fn test_fetch_retries_through_transport_and_server_errors() {
        let api = FakeApi::default();
        api.push_thread(ThreadReply::ConnectionRefused);
        api.push_thread(ThreadReply::Response(503, "busy".into()));
        api.push_thread(ThreadReply::Response(429, String::new()));
        api.push_thread(ThreadReply::Response(200, r#"{"posts":[]}"#.into()));

        let outcome = fetch_thread(&api, &thread(), Duration::ZERO, SystemdNotifier::new(false))
            .await
            .unwrap();
        assert_eq!(outcome, MetadataOutcome::Body(r#"{"posts":[]}"#.into()));
        assert_eq!(api.thread_calls(), 4);
    }

    #[tokio::test]
    async fn test_fetch_reports_not_found_without_retry() {
        let api = FakeApi::default();
        api.push_thread(ThreadReply::Response(200, String::new()));

        let outcome = fetch_thread(&api, &thread(), Duration::ZERO, SystemdNotifier::new(false))
            .await
            .unwrap();
        assert_eq!(outcome, MetadataOutcome::NotFound);
        assert_eq!(api.thread_calls(), 1);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_watchdog_pinged_before_every_attempt() {
        use crate::systemd::tests::NotifySocket;

        let socket = NotifySocket::bind();
        let api = FakeApi::default();
        api.push_thread(ThreadReply::ConnectionRefused);
        api.push_thread(ThreadReply::Response(503, "busy".into()));
        api.push_thread(ThreadReply::Response(200, r#"{"posts":[]}"#.into()));

        fetch_thread(&api, &thread(), Duration::ZERO, SystemdNotifier::new(true))
            .await
            .unwrap();
        assert_eq!(api.thread_calls(), 3);
        assert_eq!(socket.watchdog_count(), 3);
    }
}
