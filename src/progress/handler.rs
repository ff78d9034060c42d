//! Progress handler trait and events

use crate::pipeline::TargetState;
use std::time::Duration;

/// Events emitted while an orchestrator run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started for the given targets
    RunStarted { targets: Vec<String> },

    /// Shared support tools are downloaded
    SupportToolsReady { tools: usize, duration: Duration },

    /// A target moved to a new pipeline state
    StateChanged { target: String, state: TargetState },

    /// One artifact finished downloading
    DownloadComplete { file_name: String, elapsed: Duration },

    /// The builder finished successfully for a target
    BuildComplete { target: String, elapsed: Duration },

    /// A target's pipeline aborted
    TargetFailed {
        target: String,
        state: TargetState,
        error: String,
    },

    /// Every target has reached a terminal state
    RunCompleted {
        succeeded: usize,
        failed: usize,
        total_time: Duration,
    },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&ProgressEvent::RunStarted {
            targets: vec!["reddit".to_string()],
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::RunStarted {
            targets: vec!["twitter".to_string()],
        });
        handler.on_progress(&ProgressEvent::StateChanged {
            target: "twitter".to_string(),
            state: TargetState::ResolvingCatalog,
        });
        handler.on_progress(&ProgressEvent::RunCompleted {
            succeeded: 1,
            failed: 0,
            total_time: Duration::from_secs(5),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::StateChanged {
            target: "reddit".to_string(),
            state: TargetState::Building,
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("StateChanged"));
        assert!(debug_str.contains("Building"));
    }
}
