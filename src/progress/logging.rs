//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { targets } => {
                info!(targets = %targets.join(","), "Starting build run");
            }
            ProgressEvent::SupportToolsReady { tools, duration } => {
                info!(
                    tools,
                    duration_ms = duration.as_millis() as u64,
                    "Support tools downloaded"
                );
            }
            ProgressEvent::StateChanged { target, state } => {
                debug!(app = %target, state = %state, "Target state changed");
            }
            ProgressEvent::DownloadComplete { file_name, elapsed } => {
                debug!(
                    file = %file_name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Download complete"
                );
            }
            ProgressEvent::BuildComplete { target, elapsed } => {
                info!(
                    app = %target,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Build complete"
                );
            }
            ProgressEvent::TargetFailed {
                target,
                state,
                error,
            } => {
                warn!(app = %target, state = %state, error = %error, "Target failed");
            }
            ProgressEvent::RunCompleted {
                succeeded,
                failed,
                total_time,
            } => {
                if *failed > 0 {
                    warn!(
                        succeeded,
                        failed,
                        total_time_ms = total_time.as_millis() as u64,
                        "Run complete with failures"
                    );
                } else {
                    info!(
                        succeeded,
                        total_time_ms = total_time.as_millis() as u64,
                        "Run complete"
                    );
                }
            }
        }
    }
}
