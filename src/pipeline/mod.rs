//! Per-target build pipeline

pub mod orchestrator;
pub mod state;

use crate::build::BuildError;
use crate::catalog::CatalogError;
use crate::download::FetchError;
use thiserror::Error;

pub use orchestrator::{remove_cache_dir, Orchestrator};
pub use state::{RunSummary, TargetOutcome, TargetState};

/// Anything that aborts a single target
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Support tools unavailable: {0}")]
    SupportUnavailable(String),
}
