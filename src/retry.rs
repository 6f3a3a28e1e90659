use std::future::Future;
use std::time::Duration;

/// Retry decision returned by the error classifier callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry,
    Abort,
}

/// Retry an async operation with a fixed delay until it succeeds.
///
/// There is no attempt cap: a flaky endpoint is waited out rather than given
/// up on. The only way out besides `Ok` is the classifier returning `Abort`,
/// in which case that error is returned as-is.
pub async fn retry_forever<F, Fut, T, E, C>(
    delay: Duration,
    classifier: C,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> RetryAction,
    E: std::fmt::Display,
{
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if classifier(&e) == RetryAction::Abort {
                    return Err(e);
                }
                tracing::warn!(
                    "Transient error (attempt {}), retrying in {}s: {}",
                    attempt,
                    delay.as_secs_f32(),
                    e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
