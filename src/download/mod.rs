//! Concurrent artifact downloads with fastest-first timing reports
//!
//! - [`HttpFetcher`] streams one URL to a file in the work directory
//! - [`DownloadCoordinator`] fans a batch of [`DownloadTask`]s out to
//!   independent tokio tasks and hands back a [`DownloadBatch`]
//! - [`DownloadBatch::report`] drains exactly as many
//!   [`CompletionRecord`]s as tasks were scheduled and prints them in
//!   ascending elapsed-time order

pub mod coordinator;
pub mod error;
pub mod fetcher;

use crate::source::AssetRef;
use std::time::Duration;

pub use coordinator::{CompletionQueue, DownloadBatch, DownloadCoordinator, DownloadReport};
pub use error::FetchError;
pub use fetcher::{ArtifactFetch, HttpFetcher, DEFAULT_CHUNK_SIZE};

/// Where a download task gets its URL from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    Url(String),
    /// Resolved through the fetcher's [`crate::source::SourceResolver`] right before streaming
    Asset(AssetRef),
}

/// One artifact to fetch, consumed exactly once by a fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub source: DownloadSource,
    pub file_name: String,
}

impl DownloadTask {
    pub fn for_asset(asset: &AssetRef) -> Self {
        Self {
            source: DownloadSource::Asset(asset.clone()),
            file_name: asset.file_name(),
        }
    }

    pub fn for_url(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            source: DownloadSource::Url(url.into()),
            file_name: file_name.into(),
        }
    }
}

/// Timing of one finished download
///
/// Ordering is by elapsed time first, so a min-heap of records pops the
/// fastest download first. Ties fall back to the file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompletionRecord {
    pub elapsed: Duration,
    pub file_name: String,
}

impl CompletionRecord {
    pub fn new(file_name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            elapsed,
            file_name: file_name.into(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn report_line(&self) -> String {
        format!(
            "{} downloaded in {:.2} seconds.",
            self.file_name,
            self.elapsed_secs()
        )
    }
}
