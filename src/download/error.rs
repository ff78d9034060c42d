use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or streaming a remote artifact
///
/// None of these are retried. A fetch error is fatal for the target whose
/// pipeline issued the download.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to resolve download URL for {asset}: {message}")]
    Resolve { asset: String, message: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download from {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Download batch ended early: {received} of {expected} workers reported")]
    Incomplete { expected: usize, received: usize },
}
