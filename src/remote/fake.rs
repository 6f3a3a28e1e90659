//! Scripted [`ChanApi`] for driving the poll and download loops in tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use super::{ChanApi, RemoteError, ThreadResponse};
use crate::download::error::DownloadError;
use crate::thread::ThreadRef;

#[derive(Debug, Clone)]
pub(crate) enum ThreadReply {
    Response(u16, String),
    ConnectionRefused,
}

#[derive(Debug, Clone)]
pub(crate) enum DownloadReply {
    Body(Vec<u8>),
    ConnectionRefused,
}

/// Replies are consumed in order. An exhausted thread script answers with an
/// empty body (thread gone); an exhausted download script answers with a
/// 100-byte body.
#[derive(Default)]
pub(crate) struct FakeApi {
    threads: Mutex<VecDeque<ThreadReply>>,
    downloads: Mutex<VecDeque<DownloadReply>>,
    thread_calls: Mutex<usize>,
    download_calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn push_thread(&self, reply: ThreadReply) {
        self.threads.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_download(&self, reply: DownloadReply) {
        self.downloads.lock().unwrap().push_back(reply);
    }

    pub(crate) fn thread_calls(&self) -> usize {
        *self.thread_calls.lock().unwrap()
    }

    pub(crate) fn download_calls(&self) -> Vec<String> {
        self.download_calls.lock().unwrap().clone()
    }
}

async fn refused() -> reqwest::Error {
    reqwest::Client::new()
        .get("http://127.0.0.1:1")
        .send()
        .await
        .unwrap_err()
}

#[async_trait::async_trait]
impl ChanApi for FakeApi {
    async fn get_thread(&self, thread: &ThreadRef) -> Result<ThreadResponse, RemoteError> {
        *self.thread_calls.lock().unwrap() += 1;
        let reply = self.threads.lock().unwrap().pop_front();
        match reply {
            Some(ThreadReply::Response(status, body)) => Ok(ThreadResponse { status, body }),
            Some(ThreadReply::ConnectionRefused) => Err(RemoteError::Http {
                url: thread.to_string(),
                source: refused().await,
            }),
            None => Ok(ThreadResponse {
                status: 200,
                body: String::new(),
            }),
        }
    }

    async fn download_attachment(
        &self,
        _board: &str,
        file_name: &str,
        dest: &Path,
    ) -> Result<u64, DownloadError> {
        self.download_calls
            .lock()
            .unwrap()
            .push(file_name.to_string());
        let disk = |source: std::io::Error| DownloadError::Disk {
            path: dest.display().to_string(),
            source,
        };
        // Same order as the real client: the file exists before the request.
        std::fs::File::create(dest).map_err(disk)?;
        let reply = self.downloads.lock().unwrap().pop_front();
        let body = match reply {
            Some(DownloadReply::Body(body)) => body,
            Some(DownloadReply::ConnectionRefused) => {
                return Err(DownloadError::Http {
                    url: file_name.to_string(),
                    source: refused().await,
                })
            }
            None => vec![b'x'; 100],
        };
        std::fs::write(dest, &body).map_err(disk)?;
        Ok(body.len() as u64)
    }
}
