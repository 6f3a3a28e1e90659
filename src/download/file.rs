use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::error::DownloadError;

/// Single download attempt: stream the response body straight into `dest`.
///
/// The file is created or truncated before the request goes out, so a
/// failed attempt leaves an empty file behind, and is flushed and closed
/// before returning on every path. The HTTP status is logged but not acted
/// on; the caller decides what the byte count means.
pub async fn stream_to_file(client: &Client, url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let path_str = dest.display().to_string();
    let disk_err = |source: std::io::Error| DownloadError::Disk {
        path: path_str.clone(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dest)
        .await
        .map_err(disk_err)?;

    let response = client.get(url).send().await.map_err(|source| DownloadError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, status = status.as_u16(), "Unexpected status for attachment");
    }
    let content_length = response.content_length();

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| {
            tracing::warn!(
                "Body read error for {} (content_length={:?}, bytes_so_far={}): {}",
                path_str,
                content_length,
                bytes_written,
                source
            );
            DownloadError::Http {
                url: url.to_string(),
                source,
            }
        })?;
        file.write_all(&chunk).await.map_err(disk_err)?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await.map_err(disk_err)?;
    drop(file);

    Ok(bytes_written)
}
