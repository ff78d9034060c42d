use crate::build::BuildReport;
use std::fmt;
use std::time::Duration;

/// Per-target pipeline state
///
/// A target walks `Idle -> ResolvingCatalog -> FetchingSupportArtifacts ->
/// FetchingBaseArtifact -> SelectingRules -> Building -> Done`, or ends in
/// `Failed` from any state. Selection overlaps the base download, so a
/// failure while waiting on that download is attributed to
/// `FetchingBaseArtifact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    Idle,
    ResolvingCatalog,
    FetchingSupportArtifacts,
    FetchingBaseArtifact,
    SelectingRules,
    Building,
    Done,
    Failed,
}

impl TargetState {
    pub fn name(&self) -> &'static str {
        match self {
            TargetState::Idle => "idle",
            TargetState::ResolvingCatalog => "resolving-catalog",
            TargetState::FetchingSupportArtifacts => "fetching-support-artifacts",
            TargetState::FetchingBaseArtifact => "fetching-base-artifact",
            TargetState::SelectingRules => "selecting-rules",
            TargetState::Building => "building",
            TargetState::Done => "done",
            TargetState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TargetState::Done | TargetState::Failed)
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal result for one target
#[derive(Debug, Clone)]
pub enum TargetOutcome {
    Done {
        target: String,
        build: BuildReport,
    },
    /// `state` is where the pipeline was when it aborted
    Failed {
        target: String,
        state: TargetState,
        error: String,
    },
}

impl TargetOutcome {
    pub fn target(&self) -> &str {
        match self {
            TargetOutcome::Done { target, .. } | TargetOutcome::Failed { target, .. } => target,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TargetOutcome::Done { .. })
    }

    pub fn final_state(&self) -> TargetState {
        match self {
            TargetOutcome::Done { .. } => TargetState::Done,
            TargetOutcome::Failed { .. } => TargetState::Failed,
        }
    }
}

/// Outcomes of one orchestrator run, in target order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<TargetOutcome>,
    pub total_time: Duration,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(TargetOutcome::is_success)
    }

    pub fn outcome(&self, target: &str) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target() == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TargetState::Done.is_terminal());
        assert!(TargetState::Failed.is_terminal());
        assert!(!TargetState::Idle.is_terminal());
        assert!(!TargetState::Building.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(
            TargetState::FetchingBaseArtifact.to_string(),
            "fetching-base-artifact"
        );
    }

    #[test]
    fn test_run_summary_counts() {
        let summary = RunSummary {
            outcomes: vec![
                TargetOutcome::Done {
                    target: "reddit".to_string(),
                    build: BuildReport {
                        elapsed: Duration::from_secs(3),
                    },
                },
                TargetOutcome::Failed {
                    target: "twitter".to_string(),
                    state: TargetState::FetchingBaseArtifact,
                    error: "HTTP 404".to_string(),
                },
            ],
            total_time: Duration::from_secs(10),
        };

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.all_succeeded());
        assert_eq!(
            summary.outcome("twitter").map(TargetOutcome::final_state),
            Some(TargetState::Failed)
        );
        assert!(summary.outcome("youtube").is_none());
    }

    #[test]
    fn test_empty_summary_succeeds() {
        assert!(RunSummary::default().all_succeeded());
    }
}
