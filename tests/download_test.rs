//! HTTP download integration tests
//!
//! Every test runs against an in-process server; nothing leaves localhost.

mod support;

use patchsmith::download::{ArtifactFetch, DownloadCoordinator, DownloadTask, FetchError, HttpFetcher};
use patchsmith::source::{AssetRef, StaticResolver, SupportTool};
use std::sync::Arc;
use support::{Route, TestServer};
use tempfile::TempDir;

fn fetcher(resolver: StaticResolver, dir: &TempDir) -> HttpFetcher {
    HttpFetcher::new(reqwest::Client::new(), Arc::new(resolver), dir.path())
        .with_chunk_size(7)
        .without_progress()
}

#[tokio::test]
async fn test_fetch_base_binary_with_length() {
    let body = b"base binary bytes spanning several chunks".to_vec();
    let server = TestServer::start(vec![("/reddit.apk", Route::ok(body.clone()))]).await;
    let dir = TempDir::new().unwrap();
    let resolver = StaticResolver::new().with_binary("reddit", server.url("/reddit.apk"));

    let asset = AssetRef::base_binary("reddit", Some("2023.12.0".to_string()));
    let record = fetcher(resolver, &dir)
        .fetch(&DownloadTask::for_asset(&asset))
        .await
        .unwrap();

    assert_eq!(record.file_name, "reddit.apk");
    assert_eq!(std::fs::read(dir.path().join("reddit.apk")).unwrap(), body);
}

#[tokio::test]
async fn test_fetch_without_content_length() {
    let body = b"streamed until the connection closes".to_vec();
    let server = TestServer::start(vec![("/cli.jar", Route::ok_without_length(body.clone()))]).await;
    let dir = TempDir::new().unwrap();
    let resolver = StaticResolver::new().with_tool("cli", server.url("/cli.jar"));

    let task = DownloadTask::for_asset(&SupportTool::Cli.asset_ref());
    fetcher(resolver, &dir).fetch(&task).await.unwrap();

    assert_eq!(std::fs::read(dir.path().join("cli.jar")).unwrap(), body);
}

#[tokio::test]
async fn test_fetch_direct_url() {
    let server = TestServer::start(vec![("/files/custom.bin", Route::ok("custom"))]).await;
    let dir = TempDir::new().unwrap();

    let task = DownloadTask::for_url(server.url("/files/custom.bin"), "custom.bin");
    let record = fetcher(StaticResolver::new(), &dir).fetch(&task).await.unwrap();

    assert_eq!(record.file_name, "custom.bin");
    assert_eq!(std::fs::read_to_string(dir.path().join("custom.bin")).unwrap(), "custom");
}

#[tokio::test]
async fn test_http_error_status() {
    let server = TestServer::start(vec![]).await;
    let dir = TempDir::new().unwrap();
    let resolver = StaticResolver::new().with_binary("twitter", server.url("/missing.apk"));

    let asset = AssetRef::base_binary("twitter", None);
    let err = fetcher(resolver, &dir)
        .fetch(&DownloadTask::for_asset(&asset))
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("Expected Status error, got {:?}", other),
    }
    assert!(!dir.path().join("twitter.apk").exists());
}

#[tokio::test]
async fn test_truncated_body_removes_partial_file() {
    let server = TestServer::start(vec![("/youtube.apk", Route::truncated("only a little", 4096))]).await;
    let dir = TempDir::new().unwrap();
    let resolver = StaticResolver::new().with_binary("youtube", server.url("/youtube.apk"));

    let asset = AssetRef::base_binary("youtube", Some("17.49.37".to_string()));
    let err = fetcher(resolver, &dir)
        .fetch(&DownloadTask::for_asset(&asset))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request { .. }));
    assert!(!dir.path().join("youtube.apk").exists());
}

#[tokio::test]
async fn test_unresolvable_asset() {
    let dir = TempDir::new().unwrap();
    let task = DownloadTask::for_asset(&SupportTool::Patches.asset_ref());

    let err = fetcher(StaticResolver::new(), &dir).fetch(&task).await.unwrap_err();
    assert!(matches!(err, FetchError::Resolve { .. }));
}

#[tokio::test]
async fn test_coordinator_fetches_support_tools_concurrently() {
    let server = TestServer::start(vec![
        ("/cli.jar", Route::ok("cli")),
        ("/patches.jar", Route::ok("patches")),
        ("/integrations.apk", Route::ok("integrations")),
    ])
    .await;
    let dir = TempDir::new().unwrap();
    let resolver = StaticResolver::new()
        .with_tool("cli", server.url("/cli.jar"))
        .with_tool("patches", server.url("/patches.jar"))
        .with_tool("integrations", server.url("/integrations.apk"));

    let coordinator = DownloadCoordinator::new(Arc::new(fetcher(resolver, &dir)));
    let tasks: Vec<DownloadTask> = SupportTool::ALL
        .iter()
        .map(|tool| DownloadTask::for_asset(&tool.asset_ref()))
        .collect();

    let batch = coordinator.fetch_all(tasks);
    assert_eq!(batch.expected(), 3);
    let report = batch.report().await.unwrap();

    let mut names = report.file_names();
    names.sort_unstable();
    assert_eq!(names, vec!["cli.jar", "integrations.apk", "patches.jar"]);
    for window in report.records.windows(2) {
        assert!(window[0].elapsed <= window[1].elapsed);
    }
    assert_eq!(
        std::fs::read_to_string(dir.path().join("integrations.apk")).unwrap(),
        "integrations"
    );
}

#[tokio::test]
async fn test_coordinator_reports_failure_after_draining() {
    let server = TestServer::start(vec![("/cli.jar", Route::ok("cli"))]).await;
    let dir = TempDir::new().unwrap();
    let resolver = StaticResolver::new()
        .with_tool("cli", server.url("/cli.jar"))
        .with_tool("patches", server.url("/gone.jar"));

    let coordinator = DownloadCoordinator::new(Arc::new(fetcher(resolver, &dir)));
    let tasks = vec![
        DownloadTask::for_asset(&SupportTool::Cli.asset_ref()),
        DownloadTask::for_asset(&SupportTool::Patches.asset_ref()),
    ];

    let err = coordinator.fetch_all(tasks).report().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    // The successful worker still finished before report returned.
    assert!(dir.path().join("cli.jar").exists());
}
