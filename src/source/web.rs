use crate::download::FetchError;
use crate::source::apkmirror::ApkMirror;
use crate::source::github::GithubReleases;
use crate::source::SourceResolver;
use async_trait::async_trait;
use reqwest::Client;

/// Production resolver: APKMirror for base binaries, GitHub releases for tools
pub struct WebResolver {
    apkmirror: ApkMirror,
    github: GithubReleases,
}

impl WebResolver {
    pub fn new(
        client: Client,
        apkmirror_base: impl Into<String>,
        github_api_base: impl Into<String>,
        github_org: impl Into<String>,
    ) -> Self {
        Self {
            apkmirror: ApkMirror::new(client.clone(), apkmirror_base),
            github: GithubReleases::new(client, github_api_base, github_org),
        }
    }
}

#[async_trait]
impl SourceResolver for WebResolver {
    async fn resolve(&self, target: &str, version: Option<&str>) -> Result<String, FetchError> {
        self.apkmirror.resolve(target, version).await
    }

    async fn resolve_latest_release(&self, tool: &str) -> Result<String, FetchError> {
        self.github.resolve_latest(tool).await
    }
}
