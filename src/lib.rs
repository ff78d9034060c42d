//! patchsmith - fetch base apps and build patched variants
//!
//! For every requested target the pipeline looks up the target's rules and
//! pinned version in a remote patch catalog, downloads the base app and the
//! shared support tools concurrently, decides which rules to include, and
//! runs the external builder.
//!
//! # Core Concepts
//!
//! - **Catalog**: a markdown document listing patches per app, parsed into
//!   per-target [`RuleSet`]s with a representative version
//! - **Download coordination**: every artifact is streamed by its own task;
//!   a batch knows how many results to await and reports them fastest first
//! - **Selection**: every rule is included unless the exclusion policy names
//!   it for that target
//! - **Orchestration**: targets run one after another, and a failing target
//!   never stops the next
//!
//! # Example Usage
//!
//! ```ignore
//! use patchsmith::{Orchestrator, RuleCatalog, SelectionEngine, ExclusionPolicy};
//!
//! let catalog = RuleCatalog::load(&client, patchsmith::catalog::DEFAULT_CATALOG_URL).await?;
//! let orchestrator = Orchestrator::new(
//!     catalog,
//!     fetcher,
//!     SelectionEngine::new(ExclusionPolicy::new()),
//!     BuildInvoker::default(),
//!     "apks",
//! );
//! let summary = orchestrator.run(&["reddit".to_string()]).await;
//! println!("{} built", summary.succeeded());
//! ```

pub mod build;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod download;
pub mod pipeline;
pub mod precondition;
pub mod progress;
pub mod selection;
pub mod source;
pub mod util;

pub use build::{BuildError, BuildInvoker, BuildReport, BuildRequest};
pub use catalog::{CatalogError, Rule, RuleCatalog, RuleSet, TargetCategory};
pub use config::{ConfigError, PatchsmithConfig};
pub use download::{
    ArtifactFetch, CompletionRecord, DownloadCoordinator, DownloadTask, FetchError, HttpFetcher,
};
pub use pipeline::{Orchestrator, PipelineError, RunSummary, TargetOutcome, TargetState};
pub use precondition::{check_runtime, PreconditionError};
pub use selection::{ExclusionPolicy, SelectionEngine, SelectionResult};
pub use source::{AssetKind, AssetRef, SourceResolver, SupportTool};
pub use util::{init_logging, LogFormat, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
