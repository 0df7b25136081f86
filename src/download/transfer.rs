//! Resumable byte-range transfers.

use std::io::SeekFrom;
use std::path::Path;

use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_RANGE, COOKIE, RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::fs::existing_len;
use crate::portal::SessionState;

/// Largest slice written to disk at once.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Bytes before the local end re-requested when resuming, to check the tail.
pub const TAIL_CHECK_BYTES: u64 = 4096;

/// Receiver of transfer progress.
pub trait TransferProgress: Send + Sync {
    /// Called once the total is known; `already` bytes are on disk.
    fn begin(&self, total: u64, already: u64);
    fn advance(&self, bytes: u64);
    fn finish(&self);
}

/// Creates a progress receiver per transferred file.
pub trait ProgressFactory: Send + Sync {
    fn track(&self, name: &str) -> Box<dyn TransferProgress>;
}

/// Progress sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl TransferProgress for NoProgress {
    fn begin(&self, _total: u64, _already: u64) {}
    fn advance(&self, _bytes: u64) {}
    fn finish(&self) {}
}

impl ProgressFactory for NoProgress {
    fn track(&self, _name: &str) -> Box<dyn TransferProgress> {
        Box::new(NoProgress)
    }
}

/// What a transfer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The destination was already complete; nothing was written.
    AlreadyComplete,
    /// `bytes` were written to the destination.
    Completed { bytes: u64 },
}

impl TransferOutcome {
    pub fn bytes_written(&self) -> u64 {
        match self {
            TransferOutcome::AlreadyComplete => 0,
            TransferOutcome::Completed { bytes } => *bytes,
        }
    }
}

/// Parsed `Content-Range` header: `bytes <start>-<end>/<total>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: Option<u64>,
    pub total: Option<u64>,
}

/// Parse a `Content-Range` value; `*` parts become `None`.
pub fn parse_content_range(value: &str) -> Option<ContentRange> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (range, total) = rest.split_once('/')?;
    let start = match range.trim() {
        "*" => None,
        r => Some(r.split_once('-')?.0.trim().parse().ok()?),
    };
    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse().ok()?),
    };
    Some(ContentRange { start, total })
}

fn content_range(headers: &HeaderMap) -> Option<ContentRange> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}

/// Declared total size: `Content-Range` total, else `Content-Length`.
fn declared_total(response: &Response) -> Option<u64> {
    content_range(response.headers())
        .and_then(|r| r.total)
        .or_else(|| response.content_length())
}

/// Range-aware downloader sharing the run's HTTP client and session.
#[derive(Debug, Clone)]
pub struct ResumableTransfer {
    client: Client,
    session: SessionState,
}

impl ResumableTransfer {
    pub fn new(client: Client, session: SessionState) -> Self {
        Self { client, session }
    }

    async fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(cookies) = self.session.cookie_header().await {
            request = request.header(COOKIE, cookies);
        }
        request
    }

    /// Total size of the resource at `url`, negotiated like a transfer but
    /// without reading the body. Unknown sizes count as 0.
    pub async fn probe_size(&self, url: &str) -> Result<u64> {
        let response = self.get(url).await.header(RANGE, "bytes=0-0").send().await?;
        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(Error::TransferStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let size = declared_total(&response).unwrap_or(0);
        tracing::debug!("{} is {} bytes", url, size);
        Ok(size)
    }

    /// Download `url` into `destination`, resuming a partial file.
    ///
    /// When resuming, up to `TAIL_CHECK_BYTES` before the local end are
    /// requested again, compared with the file, and rewritten from the
    /// server copy. A server that ignores the range gets the file rewritten
    /// from scratch.
    pub async fn transfer(
        &self,
        url: &str,
        destination: &Path,
        progress: &dyn TransferProgress,
    ) -> Result<TransferOutcome> {
        let local = existing_len(destination).await?;
        let overlap = local.min(TAIL_CHECK_BYTES);
        let start = local - overlap;

        let mut request = self.get(url).await;
        if local > 0 {
            request = request.header(RANGE, format!("bytes={}-", start));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            tracing::debug!("{} already complete (416)", destination.display());
            return Ok(TransferOutcome::AlreadyComplete);
        }
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(Error::TransferStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let range = content_range(response.headers());
        if local > 0 && status == StatusCode::PARTIAL_CONTENT && range.is_none() {
            return Err(Error::Transfer(format!(
                "{} answered 206 without Content-Range",
                url
            )));
        }

        let total = declared_total(&response);
        if local == 0 && total == Some(0) {
            if tokio::fs::try_exists(destination).await? {
                return Ok(TransferOutcome::AlreadyComplete);
            }
            File::create(destination).await?;
            tracing::debug!("{} is empty", url);
            return Ok(TransferOutcome::Completed { bytes: 0 });
        }
        if let Some(total) = total {
            if local >= total {
                tracing::debug!(
                    "{} already complete ({} of {} bytes)",
                    destination.display(),
                    local,
                    total
                );
                return Ok(TransferOutcome::AlreadyComplete);
            }
        }

        let honored = local > 0 && status == StatusCode::PARTIAL_CONTENT;

        let (mut file, offset, tail) = if honored {
            let served_from = range.and_then(|r| r.start);
            if served_from != Some(start) {
                return Err(Error::Transfer(format!(
                    "{} answered range from {:?}, requested {}",
                    url, served_from, start
                )));
            }
            let tail = read_tail(destination, start, overlap).await?;
            let file = OpenOptions::new().append(true).open(destination).await?;
            file.set_len(start).await?;
            (file, start, tail)
        } else {
            if local > 0 {
                tracing::debug!("{} ignored the range request, restarting", url);
            }
            (File::create(destination).await?, 0, Vec::new())
        };

        progress.begin(total.unwrap_or(0), offset);

        let mut written: u64 = 0;
        let mut compared: usize = 0;
        let mut tail_ok = true;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Transfer(format!("Stream error: {}", e)))?;
            for piece in chunk.chunks(CHUNK_SIZE) {
                if compared < tail.len() {
                    let n = piece.len().min(tail.len() - compared);
                    if piece[..n] != tail[compared..compared + n] {
                        tail_ok = false;
                    }
                    compared += n;
                }

                file.write_all(piece).await?;
                written += piece.len() as u64;
                progress.advance(piece.len() as u64);
            }
        }

        file.flush().await?;
        progress.finish();

        if !tail_ok {
            tracing::warn!(
                "Last {} bytes of {} differed from the server copy and were rewritten",
                tail.len(),
                destination.display()
            );
        }

        if let Some(total) = total {
            let size = offset + written;
            if size != total {
                return Err(Error::Transfer(format!(
                    "{} ended at {} of {} bytes",
                    url, size, total
                )));
            }
        }

        Ok(TransferOutcome::Completed { bytes: written })
    }
}

async fn read_tail(path: &Path, start: u64, len: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(start)).await?;
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).await?;
    Ok(buf)
}
