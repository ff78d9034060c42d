//! Command handlers; each returns the process exit code

use super::commands::{BuildArgs, PatchesArgs};
use crate::build::BuildInvoker;
use crate::catalog::RuleCatalog;
use crate::config::PatchsmithConfig;
use crate::download::HttpFetcher;
use crate::pipeline::{remove_cache_dir, Orchestrator, RunSummary, TargetOutcome};
use crate::precondition::check_runtime;
use crate::progress::LoggingHandler;
use crate::selection::SelectionEngine;
use crate::source::{apkmirror, github, WebResolver};
use crate::util::build_client;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_TARGET_FAILED: i32 = 1;
pub const EXIT_PRECONDITION: i32 = 2;

/// Layers command-line flags over the environment-derived config
pub fn apply_build_args(mut config: PatchsmithConfig, args: &BuildArgs) -> PatchsmithConfig {
    if !args.targets.is_empty() {
        config.targets = args.targets.clone();
    }
    if let Some(work_dir) = &args.work_dir {
        config.work_dir = work_dir.clone();
    }
    if let Some(runtime) = &args.runtime {
        config.runtime = runtime.clone();
    }
    if let Some(url) = &args.catalog_url {
        config.catalog_url = url.clone();
    }
    config.exclusions.extend(args.exclusions.iter().cloned());
    config
}

pub async fn handle_build(args: &BuildArgs, quiet: bool) -> i32 {
    let config = apply_build_args(PatchsmithConfig::default(), args);
    build_with_config(&config, args.skip_runtime_check, quiet).await
}

async fn build_with_config(
    config: &PatchsmithConfig,
    skip_runtime_check: bool,
    quiet: bool,
) -> i32 {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return EXIT_PRECONDITION;
    }

    if skip_runtime_check {
        info!("Skipping runtime check");
    } else {
        match check_runtime(&config.runtime).await {
            Ok(banner) => info!(runtime = %banner, "Runtime available"),
            Err(e) => {
                error!(error = %e, "Runtime check failed");
                eprintln!("Error: {}", e);
                return EXIT_PRECONDITION;
            }
        }
    }

    match run_build(config, quiet).await {
        Ok(summary) => {
            print_summary(&summary);
            if summary.all_succeeded() {
                EXIT_SUCCESS
            } else {
                EXIT_TARGET_FAILED
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            // The orchestrator never ran, so its cache cleanup did not either.
            remove_cache_dir(&config.cache_dir).await;
            EXIT_TARGET_FAILED
        }
    }
}

async fn run_build(config: &PatchsmithConfig, quiet: bool) -> Result<RunSummary> {
    let policy = config.exclusion_policy()?;
    let client = build_client(&config.user_agent, config.request_timeout())
        .context("Failed to create HTTP client")?;

    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.work_dir.display()))?;

    let catalog = RuleCatalog::load(&client, &config.catalog_url)
        .await
        .context("Failed to load patch catalog")?;

    let resolver = Arc::new(WebResolver::new(
        client.clone(),
        apkmirror::DEFAULT_BASE_URL,
        github::DEFAULT_API_BASE,
        github::DEFAULT_ORG,
    ));
    let mut fetcher =
        HttpFetcher::new(client, resolver, &config.work_dir).with_chunk_size(config.chunk_size);
    if quiet {
        fetcher = fetcher.without_progress();
    }

    let orchestrator = Orchestrator::new(
        catalog,
        Arc::new(fetcher),
        SelectionEngine::new(policy),
        BuildInvoker::new(config.runtime.clone()),
        &config.work_dir,
    )
    .with_cache_dir(&config.cache_dir)
    .with_progress(Arc::new(LoggingHandler));

    Ok(orchestrator.run(&config.targets).await)
}

fn print_summary(summary: &RunSummary) {
    println!();
    for outcome in &summary.outcomes {
        match outcome {
            TargetOutcome::Done { target, build } => {
                println!("  ok      {} ({:.2}s)", target, build.elapsed_secs())
            }
            TargetOutcome::Failed {
                target,
                state,
                error,
            } => println!("  failed  {} during {}: {}", target, state, error),
        }
    }
    println!(
        "{} built, {} failed in {:.2}s",
        summary.succeeded(),
        summary.failed(),
        summary.total_time.as_secs_f64()
    );
}

pub async fn handle_patches(args: &PatchesArgs) -> i32 {
    match list_patches(args).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_TARGET_FAILED
        }
    }
}

async fn list_patches(args: &PatchesArgs) -> Result<()> {
    let config = PatchsmithConfig::default();
    let url = args.catalog_url.as_deref().unwrap_or(&config.catalog_url);
    let client = build_client(&config.user_agent, config.request_timeout())
        .context("Failed to create HTTP client")?;

    let catalog = RuleCatalog::load(&client, url)
        .await
        .context("Failed to load patch catalog")?;
    let rules = catalog.rules_for(&args.target)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(rules.rules())?);
        return Ok(());
    }

    match catalog.version_of(&args.target) {
        Ok(version) => println!("{} (version {})", args.target, version),
        Err(_) => println!("{} (no pinned version)", args.target),
    }
    for rule in rules {
        println!("  {:<40} {}", rule.name, rule.description);
    }
    println!("{} patches", rules.len());
    Ok(())
}
