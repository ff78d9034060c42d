//! Configuration management for patchsmith
//!
//! Settings are loaded from environment variables with sensible defaults.
//! Command-line flags override individual fields after loading.
//!
//! # Environment Variables
//!
//! - `PATCHSMITH_WORK_DIR`: Directory receiving downloads and outputs - default: "apks"
//! - `PATCHSMITH_CACHE_DIR`: Builder cache directory, removed after each run - default: "revanced-cache"
//! - `PATCHSMITH_CATALOG_URL`: Patch catalog document - default: upstream patches README
//! - `PATCHSMITH_TARGETS`: Comma separated targets - default: "youtube-music,twitter,reddit"
//! - `PATCHSMITH_RUNTIME`: Program that runs the builder jar - default: "java"
//! - `PATCHSMITH_CHUNK_SIZE`: Download write buffer in bytes - default: 10485760
//! - `PATCHSMITH_USER_AGENT`: User agent sent with every request - default: "anything"
//! - `PATCHSMITH_EXCLUDE`: Excluded rules as `target:rule,target:rule` - default: none
//! - `PATCHSMITH_LOG_LEVEL`: Logging level - default: "info"
//! - `PATCHSMITH_REQUEST_TIMEOUT`: Per request deadline in seconds, 0 disables - default: "0"
//!
//! # Example
//!
//! ```no_run
//! use patchsmith::PatchsmithConfig;
//!
//! let config = PatchsmithConfig::default();
//! config.validate().expect("Invalid configuration");
//! let policy = config.exclusion_policy().expect("Invalid exclusions");
//! ```

use crate::catalog::{TargetCategory, DEFAULT_CATALOG_URL};
use crate::download::DEFAULT_CHUNK_SIZE;
use crate::selection::ExclusionPolicy;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_WORK_DIR: &str = "apks";
const DEFAULT_CACHE_DIR: &str = "revanced-cache";
const DEFAULT_TARGETS: &str = "youtube-music,twitter,reddit";
const DEFAULT_RUNTIME: &str = "java";
const DEFAULT_USER_AGENT: &str = "anything";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 0;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Main configuration structure for patchsmith
#[derive(Debug, Clone, PartialEq)]
pub struct PatchsmithConfig {
    pub work_dir: PathBuf,

    /// Created by the builder, removed when a run finishes
    pub cache_dir: PathBuf,

    pub catalog_url: String,

    /// Targets processed in order
    pub targets: Vec<String>,

    /// Program used to launch the builder jar
    pub runtime: String,

    pub chunk_size: usize,

    pub user_agent: String,

    /// Raw `target:rule` (or `target=rule`) exclusion entries
    pub exclusions: Vec<String>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Per request deadline in seconds, 0 means none
    pub request_timeout_secs: u64,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for PatchsmithConfig {
    /// Loads configuration from PATCHSMITH_* environment variables, falling
    /// back to defaults for anything missing or unparsable
    fn default() -> Self {
        let work_dir = env::var("PATCHSMITH_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORK_DIR));

        let cache_dir = env::var("PATCHSMITH_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR));

        let catalog_url = env::var("PATCHSMITH_CATALOG_URL")
            .unwrap_or_else(|_| DEFAULT_CATALOG_URL.to_string());

        let targets = split_list(
            &env::var("PATCHSMITH_TARGETS").unwrap_or_else(|_| DEFAULT_TARGETS.to_string()),
        );

        let runtime =
            env::var("PATCHSMITH_RUNTIME").unwrap_or_else(|_| DEFAULT_RUNTIME.to_string());

        let chunk_size = env::var("PATCHSMITH_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        let user_agent =
            env::var("PATCHSMITH_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        let exclusions = env::var("PATCHSMITH_EXCLUDE")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        let log_level = env::var("PATCHSMITH_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let request_timeout_secs = env::var("PATCHSMITH_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            work_dir,
            cache_dir,
            catalog_url,
            targets,
            runtime,
            chunk_size,
            user_agent,
            exclusions,
            log_level,
            request_timeout_secs,
        }
    }
}

/// Splits one `target:rule` or `target=rule` entry
pub fn parse_exclusion(entry: &str) -> Result<(String, String), ConfigError> {
    let parse_error = || ConfigError::ParseError {
        field: "exclusion".to_string(),
        error: format!("'{}' is not of the form target:rule", entry),
    };

    let (target, rule) = entry
        .split_once(|c: char| c == ':' || c == '=')
        .ok_or_else(parse_error)?;
    let (target, rule) = (target.trim(), rule.trim());
    if target.is_empty() || rule.is_empty() {
        return Err(parse_error());
    }
    Ok((target.to_string(), rule.to_string()))
}

impl PatchsmithConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty or unknown target list, a zero
    /// chunk size, an invalid log level or a malformed exclusion entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one target is required".to_string(),
            ));
        }
        for target in &self.targets {
            target
                .parse::<TargetCategory>()
                .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;
        }

        if self.chunk_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "Chunk size must be at least 1 byte".to_string(),
            ));
        }

        if self.runtime.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Runtime program must not be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        self.exclusion_policy().map(|_| ())
    }

    /// Builds the name-keyed exclusion table from the raw entries
    pub fn exclusion_policy(&self) -> Result<ExclusionPolicy, ConfigError> {
        let pairs = self
            .exclusions
            .iter()
            .map(|entry| parse_exclusion(entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExclusionPolicy::from_pairs(pairs))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl fmt::Display for PatchsmithConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patchsmith Configuration:")?;
        writeln!(f, "  Work Dir: {}", self.work_dir.display())?;
        writeln!(f, "  Cache Dir: {}", self.cache_dir.display())?;
        writeln!(f, "  Catalog: {}", self.catalog_url)?;
        writeln!(f, "  Targets: {}", self.targets.join(", "))?;
        writeln!(f, "  Runtime: {}", self.runtime)?;
        writeln!(f, "  Chunk Size: {} bytes", self.chunk_size)?;
        writeln!(f, "  Exclusions: {}", self.exclusions.join(", "))?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
