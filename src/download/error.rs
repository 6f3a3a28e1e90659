use thiserror::Error;

/// Typed attachment download errors enabling retry classification.
///
/// Network trouble is waited out; a destination file we cannot create or
/// write is not going to fix itself and stops the loop.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error downloading {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Disk error writing {path}: {source}")]
    Disk {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            DownloadError::Http { source, .. } => !source.is_builder(),
            DownloadError::Disk { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_not_retryable() {
        let e = DownloadError::Disk {
            path: "x".into(),
            source: std::io::Error::other("disk full"),
        };
        assert!(!e.is_retryable());
    }

    #[tokio::test]
    async fn test_http_connection_error_retryable() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();
        let e = DownloadError::Http {
            url: "x".into(),
            source: err,
        };
        assert!(e.is_retryable());
    }

    #[tokio::test]
    async fn test_http_builder_error_not_retryable() {
        let err = reqwest::Client::new()
            .get("::::")
            .send()
            .await
            .unwrap_err();
        let e = DownloadError::Http {
            url: "::::".into(),
            source: err,
        };
        assert!(!e.is_retryable());
    }
}
