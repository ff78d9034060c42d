//! External builder invocation

pub mod invoker;

use crate::selection::SelectionResult;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub use invoker::BuildInvoker;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Builder exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("Failed to launch builder '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Build request is missing the '{0}' support tool")]
    MissingSupportTool(String),

    #[error("I/O error while running builder: {0}")]
    Io(#[from] io::Error),
}

/// Everything needed for one external build invocation
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub target: String,
    pub base_binary_path: PathBuf,
    /// Keyed by support tool name (`cli`, `patches`, `integrations`)
    pub support_tool_paths: BTreeMap<String, PathBuf>,
    pub output_path: PathBuf,
    pub selection: SelectionResult,
}

impl BuildRequest {
    pub fn support_tool(&self, name: &str) -> Result<&PathBuf, BuildError> {
        self.support_tool_paths
            .get(name)
            .ok_or_else(|| BuildError::MissingSupportTool(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildReport {
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
