use thiserror::Error;

/// Errors talking to the thread metadata endpoint.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

impl RemoteError {
    /// Whether waiting and asking again could plausibly succeed.
    ///
    /// Transport failures are transient unless the request could not even be
    /// built. Among statuses only 429 and 5xx are; other statuses are never
    /// turned into a `RemoteError` in the first place.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Http { source, .. } => !source.is_builder(),
            RemoteError::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> RemoteError {
        RemoteError::Status {
            status,
            url: "x".into(),
        }
    }

    #[test]
    fn test_429_and_5xx_transient() {
        assert!(status(429).is_transient());
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
    }

    #[test]
    fn test_client_errors_not_transient() {
        assert!(!status(400).is_transient());
        assert!(!status(403).is_transient());
    }

    #[tokio::test]
    async fn test_connection_error_transient() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();
        let e = RemoteError::Http {
            url: "http://127.0.0.1:1".into(),
            source: err,
        };
        assert!(e.is_transient());
    }

    #[tokio::test]
    async fn test_builder_error_not_transient() {
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .unwrap_err();
        let e = RemoteError::Http {
            url: "not a url".into(),
            source: err,
        };
        assert!(!e.is_transient());
    }
}
