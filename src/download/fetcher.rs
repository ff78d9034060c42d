use super::{CompletionRecord, DownloadSource, DownloadTask, FetchError};
use crate::source::SourceResolver;
use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use reqwest::Client;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Bytes buffered in memory before each write to disk (10 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 5 * (1 << 21);

/// Fetches a single [`DownloadTask`] and reports how long it took
#[async_trait]
pub trait ArtifactFetch: Send + Sync {
    async fn fetch(&self, task: &DownloadTask) -> Result<CompletionRecord, FetchError>;
}

/// Streams HTTP response bodies into the work directory
pub struct HttpFetcher {
    client: Client,
    resolver: Arc<dyn SourceResolver>,
    work_dir: PathBuf,
    chunk_size: usize,
    progress: Option<MultiProgress>,
}

impl HttpFetcher {
    pub fn new(client: Client, resolver: Arc<dyn SourceResolver>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            resolver,
            work_dir: work_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: Some(MultiProgress::new()),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Disable progress bars (quiet mode, tests)
    pub fn without_progress(mut self) -> Self {
        self.progress = None;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn progress_bar(&self, total: Option<u64>, file_name: &str) -> ProgressBar {
        let Some(multi) = &self.progress else {
            return ProgressBar::hidden();
        };

        let bar = match total {
            Some(len) if len > 0 => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::with_template(
                    "{msg:>20} [{bar:40.green}] {bytes}/{total_bytes} ({bytes_per_sec})",
                ) {
                    bar.set_style(style.progress_chars("=> "));
                }
                bar
            }
            _ => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::with_template("{msg:>20} {spinner:.green} {bytes} ({bytes_per_sec})")
                {
                    bar.set_style(style);
                }
                bar.enable_steady_tick(Duration::from_millis(120));
                bar
            }
        };
        bar.set_message(file_name.to_string());
        multi.add(bar)
    }

    async fn stream_to_file(&self, url: &str, path: &Path, file_name: &str) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bar = self.progress_bar(response.content_length(), file_name);
        let io_err = |source: io::Error| FetchError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::create(path).await.map_err(io_err)?;
        let mut buffer = BytesMut::with_capacity(self.chunk_size);
        let mut written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;
            buffer.extend_from_slice(&chunk);

            if buffer.len() >= self.chunk_size {
                file.write_all(&buffer).await.map_err(io_err)?;
                written += buffer.len() as u64;
                bar.inc(buffer.len() as u64);
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            file.write_all(&buffer).await.map_err(io_err)?;
            written += buffer.len() as u64;
            bar.inc(buffer.len() as u64);
        }
        file.flush().await.map_err(io_err)?;
        bar.finish();

        Ok(written)
    }
}

#[async_trait]
impl ArtifactFetch for HttpFetcher {
    async fn fetch(&self, task: &DownloadTask) -> Result<CompletionRecord, FetchError> {
        let url = match &task.source {
            DownloadSource::Url(url) => url.clone(),
            DownloadSource::Asset(asset) => self.resolver.resolve_asset(asset).await?,
        };
        let path = self.work_dir.join(&task.file_name);

        info!(file = %task.file_name, url = %url, "Trying to download");
        let start = Instant::now();

        match self.stream_to_file(&url, &path, &task.file_name).await {
            Ok(bytes) => {
                let elapsed = start.elapsed();
                info!(
                    file = %task.file_name,
                    bytes,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Downloaded"
                );
                Ok(CompletionRecord::new(task.file_name.clone(), elapsed))
            }
            Err(err) => {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => debug!(path = %path.display(), "Removed partial download"),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial download"),
                }
                Err(err)
            }
        }
    }
}
