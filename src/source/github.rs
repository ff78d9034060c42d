//! Latest-release lookup for support tools published on GitHub

use crate::download::FetchError;
use crate::source::SupportTool;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_ORG: &str = "revanced";

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Picks the distributable artifact from a release's asset list
///
/// Releases also carry `-sources.jar` and `-javadoc.jar` archives next to
/// the real artifact; those are never what the builder wants.
pub fn pick_asset<'a>(assets: &'a [ReleaseAsset], extension: &str) -> Option<&'a ReleaseAsset> {
    let suffix = format!(".{}", extension);
    assets.iter().find(|asset| {
        asset.name.ends_with(&suffix)
            && !asset.name.ends_with(&format!("-sources{}", suffix))
            && !asset.name.ends_with(&format!("-javadoc{}", suffix))
    })
}

pub struct GithubReleases {
    client: Client,
    api_base: String,
    org: String,
}

impl GithubReleases {
    pub fn new(client: Client, api_base: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            org: org.into(),
        }
    }

    pub fn latest_release_url(&self, tool: &str) -> String {
        format!(
            "{}/repos/{}/revanced-{}/releases/latest",
            self.api_base, self.org, tool
        )
    }

    pub async fn resolve_latest(&self, tool: &str) -> Result<String, FetchError> {
        let extension = SupportTool::from_name(tool)
            .map(|t| t.extension())
            .unwrap_or("jar");
        let url = self.latest_release_url(tool);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let release: Release = response
            .json()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        debug!(tool, tag = %release.tag_name, assets = release.assets.len(), "Fetched latest release");

        pick_asset(&release.assets, extension)
            .map(|asset| asset.browser_download_url.clone())
            .ok_or_else(|| FetchError::Resolve {
                asset: format!("revanced-{}", tool),
                message: format!(
                    "release {} has no .{} asset",
                    release.tag_name, extension
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset {
            name: name.to_string(),
            browser_download_url: format!("https://example.test/{}", name),
        }
    }

    #[test]
    fn test_pick_asset_skips_sources_and_javadoc() {
        let assets = vec![
            asset("revanced-patches-2.160.0-sources.jar"),
            asset("revanced-patches-2.160.0-javadoc.jar"),
            asset("revanced-patches-2.160.0.jar"),
        ];
        let picked = pick_asset(&assets, "jar").unwrap();
        assert_eq!(picked.name, "revanced-patches-2.160.0.jar");
    }

    #[test]
    fn test_pick_asset_by_extension() {
        let assets = vec![asset("checksums.txt"), asset("app-release-unsigned.apk")];
        assert_eq!(
            pick_asset(&assets, "apk").unwrap().name,
            "app-release-unsigned.apk"
        );
        assert!(pick_asset(&assets, "jar").is_none());
    }

    #[test]
    fn test_release_deserialization_tolerates_missing_fields() {
        let release: Release = serde_json::from_str(r#"{"assets": []}"#).unwrap();
        assert!(release.assets.is_empty());
        assert!(release.tag_name.is_empty());
    }

    #[test]
    fn test_latest_release_url() {
        let releases = GithubReleases::new(Client::new(), "https://api.github.com/", "revanced");
        assert_eq!(
            releases.latest_release_url("cli"),
            "https://api.github.com/repos/revanced/revanced-cli/releases/latest"
        );
    }
}
