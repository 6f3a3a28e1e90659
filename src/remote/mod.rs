//! HTTP seam to the 4chan read-only API and media host.
//!
//! Every method performs exactly one request. Retry and pacing policy live
//! with the callers so they can be exercised against [`ChanApi`] fakes.

pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod metadata;

use std::path::Path;

use crate::download::error::DownloadError;
use crate::download::file;
use crate::thread::ThreadRef;

pub use error::RemoteError;

/// The API rejects requests without an identifying client string.
pub const USER_AGENT: &str = "Dark Secret Ninja/1.0";

/// Base URLs of the metadata and media hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
    pub media_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: "https://a.4cdn.org".to_string(),
            media_base: "https://i.4cdn.org".to_string(),
        }
    }
}

impl Endpoints {
    pub fn thread_url(&self, thread: &ThreadRef) -> String {
        format!(
            "{}/{}/thread/{}.json",
            self.api_base, thread.board, thread.thread_id
        )
    }

    pub fn attachment_url(&self, board: &str, file_name: &str) -> String {
        format!("{}/{}/{}", self.media_base, board, file_name)
    }
}

/// Raw metadata response: status plus the full body, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait::async_trait]
pub trait ChanApi: Send + Sync {
    /// Fetch the thread's metadata document. Any HTTP response is `Ok`;
    /// only transport failures are errors.
    async fn get_thread(&self, thread: &ThreadRef) -> Result<ThreadResponse, RemoteError>;

    /// Stream one attachment into `dest`, truncating it first. Returns the
    /// number of body bytes written.
    async fn download_attachment(
        &self,
        board: &str,
        file_name: &str,
        dest: &Path,
    ) -> Result<u64, DownloadError>;
}

/// Production [`ChanApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ChanClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ChanClient {
    pub fn new(endpoints: Endpoints) -> anyhow::Result<Self> {
        // A taken-down thread answers with a redirect to a landing page; we
        // want to see that response, not the page it points at.
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http, endpoints })
    }
}

#[async_trait::async_trait]
impl ChanApi for ChanClient {
    async fn get_thread(&self, thread: &ThreadRef) -> Result<ThreadResponse, RemoteError> {
        let url = self.endpoints.thread_url(thread);
        tracing::debug!(%url, "Fetching thread metadata");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| RemoteError::Http {
                url: url.clone(),
                source,
            })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| RemoteError::Http { url, source })?;

        Ok(ThreadResponse { status, body })
    }

    async fn download_attachment(
        &self,
        board: &str,
        file_name: &str,
        dest: &Path,
    ) -> Result<u64, DownloadError> {
        let url = self.endpoints.attachment_url(board, file_name);
        file::stream_to_file(&self.http, &url, dest).await
    }
}
