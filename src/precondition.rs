//! Startup check for the runtime the external builder needs

use std::io;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

const RUNTIME_BANNER: &str = "Runtime Environment";

#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error("'{program}' could not be executed ({source}). Java must be installed")]
    RuntimeMissing {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program} -version' did not report a Java runtime environment")]
    RuntimeUnrecognized { program: String, output: String },
}

fn runtime_banner(output: &str) -> Option<&str> {
    output
        .lines()
        .find(|line| line.contains(RUNTIME_BANNER))
        .map(str::trim)
}

/// Runs `<program> -version` and returns its banner line
///
/// Java prints the version banner on stderr, so both streams are checked.
pub async fn check_runtime(program: &str) -> Result<String, PreconditionError> {
    info!(program, "Checking if java is available");

    let output = Command::new(program)
        .arg("-version")
        .output()
        .await
        .map_err(|source| PreconditionError::RuntimeMissing {
            program: program.to_string(),
            source,
        })?;

    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    debug!(program, output = %combined.trim(), "Runtime version output");

    match runtime_banner(&combined) {
        Some(banner) => Ok(banner.to_string()),
        None => Err(PreconditionError::RuntimeUnrecognized {
            program: program.to_string(),
            output: combined,
        }),
    }
}
