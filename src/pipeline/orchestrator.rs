use super::state::{RunSummary, TargetOutcome, TargetState};
use super::PipelineError;
use crate::build::{BuildInvoker, BuildReport, BuildRequest};
use crate::catalog::RuleCatalog;
use crate::download::{ArtifactFetch, DownloadCoordinator, DownloadReport, DownloadTask};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::selection::SelectionEngine;
use crate::source::{AssetRef, SupportTool};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Support tool name -> local path, or the message of the fetch that failed
type SupportArtifacts = Result<BTreeMap<String, PathBuf>, String>;

/// Drives every target through catalog lookup, downloads, selection and build
pub struct Orchestrator {
    catalog: RuleCatalog,
    fetcher: Arc<dyn ArtifactFetch>,
    selection: SelectionEngine,
    invoker: BuildInvoker,
    progress: Arc<dyn ProgressHandler>,
    work_dir: PathBuf,
    cache_dir: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(
        catalog: RuleCatalog,
        fetcher: Arc<dyn ArtifactFetch>,
        selection: SelectionEngine,
        invoker: BuildInvoker,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            selection,
            invoker,
            progress: Arc::new(NoOpHandler),
            work_dir: work_dir.into(),
            cache_dir: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Directory the builder leaves behind; removed when a run finishes
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Processes `targets` in order; one target failing never stops the next
    pub async fn run(&self, targets: &[String]) -> RunSummary {
        let start = Instant::now();
        info!(targets = targets.len(), "Starting orchestrator run");
        self.progress.on_progress(&ProgressEvent::RunStarted {
            targets: targets.to_vec(),
        });

        // Fresh per run: no download state survives between runs.
        let coordinator = DownloadCoordinator::new(self.fetcher.clone());
        let support = OnceCell::new();
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            let mut state = TargetState::Idle;
            let outcome = match self
                .run_target(&coordinator, &support, target, &mut state)
                .await
            {
                Ok(build) => {
                    self.transition(target, &mut state, TargetState::Done);
                    println!("{} patched in {:.2} seconds.", target, build.elapsed_secs());
                    self.progress.on_progress(&ProgressEvent::BuildComplete {
                        target: target.clone(),
                        elapsed: build.elapsed,
                    });
                    TargetOutcome::Done {
                        target: target.clone(),
                        build,
                    }
                }
                Err(err) => {
                    error!(app = %target, state = %state, error = %err, "Target failed");
                    println!("{} failed while {}: {}", target, state, err);
                    self.progress.on_progress(&ProgressEvent::TargetFailed {
                        target: target.clone(),
                        state,
                        error: err.to_string(),
                    });
                    TargetOutcome::Failed {
                        target: target.clone(),
                        state,
                        error: err.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        if let Some(cache_dir) = &self.cache_dir {
            remove_cache_dir(cache_dir).await;
        }

        let summary = RunSummary {
            outcomes,
            total_time: start.elapsed(),
        };
        self.progress.on_progress(&ProgressEvent::RunCompleted {
            succeeded: summary.succeeded(),
            failed: summary.failed(),
            total_time: summary.total_time,
        });
        summary
    }

    async fn run_target(
        &self,
        coordinator: &DownloadCoordinator,
        support: &OnceCell<SupportArtifacts>,
        target: &str,
        state: &mut TargetState,
    ) -> Result<BuildReport, PipelineError> {
        self.transition(target, state, TargetState::ResolvingCatalog);
        let rules = self.catalog.rules_for(target)?;
        let version = self.catalog.version_of(target)?;
        info!(app = target, version, patches = rules.len(), "Resolved catalog entry");

        self.transition(target, state, TargetState::FetchingSupportArtifacts);
        let support_paths = support
            .get_or_init(|| self.fetch_support_tools(coordinator))
            .await
            .clone()
            .map_err(PipelineError::SupportUnavailable)?;

        self.transition(target, state, TargetState::FetchingBaseArtifact);
        let asset = AssetRef::base_binary(target, Some(version.to_string()));
        let base_path = self.work_dir.join(asset.file_name());
        let batch = coordinator.fetch_all(vec![DownloadTask::for_asset(&asset)]);

        // Selection only needs the catalog, so it runs while the download streams.
        self.transition(target, state, TargetState::SelectingRules);
        let selection = self.selection.select(rules, target);

        // Rewind quietly so a failed download is attributed to FetchingBaseArtifact
        // while the event stream keeps its forward-only order.
        *state = TargetState::FetchingBaseArtifact;
        let report = batch.report().await?;
        self.emit_downloads(&report);

        self.transition(target, state, TargetState::Building);
        let request = BuildRequest {
            target: target.to_string(),
            base_binary_path: base_path,
            support_tool_paths: support_paths,
            output_path: self.work_dir.join(format!("{}-output.apk", target)),
            selection,
        };
        Ok(self.invoker.run(&request).await?)
    }

    async fn fetch_support_tools(&self, coordinator: &DownloadCoordinator) -> SupportArtifacts {
        let start = Instant::now();
        let tasks = SupportTool::ALL
            .iter()
            .map(|tool| DownloadTask::for_asset(&tool.asset_ref()))
            .collect();

        match coordinator.fetch_all(tasks).report().await {
            Ok(report) => {
                self.emit_downloads(&report);
                self.progress.on_progress(&ProgressEvent::SupportToolsReady {
                    tools: SupportTool::ALL.len(),
                    duration: start.elapsed(),
                });
                Ok(SupportTool::ALL
                    .iter()
                    .map(|tool| (tool.name().to_string(), self.work_dir.join(tool.file_name())))
                    .collect())
            }
            Err(err) => {
                error!(error = %err, "Support tools unavailable, every target will fail");
                Err(err.to_string())
            }
        }
    }

    fn emit_downloads(&self, report: &DownloadReport) {
        for record in &report.records {
            self.progress.on_progress(&ProgressEvent::DownloadComplete {
                file_name: record.file_name.clone(),
                elapsed: record.elapsed,
            });
        }
    }

    fn transition(&self, target: &str, state: &mut TargetState, next: TargetState) {
        *state = next;
        self.progress.on_progress(&ProgressEvent::StateChanged {
            target: target.to_string(),
            state: next,
        });
    }
}

/// Deletes the builder cache directory; a missing directory is not an error
pub async fn remove_cache_dir(cache_dir: &Path) {
    match tokio::fs::remove_dir_all(cache_dir).await {
        Ok(()) => debug!(path = %cache_dir.display(), "Removed builder cache"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %cache_dir.display(), error = %e, "Failed to remove builder cache"),
    }
}
