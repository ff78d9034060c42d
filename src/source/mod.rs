//! Remote asset identification and download URL resolution
//!
//! The pipeline never scrapes pages itself. It hands an [`AssetRef`] to a
//! [`SourceResolver`] and gets back a direct download URL. Two resolvers ship
//! with the crate:
//!
//! - [`WebResolver`]: the production resolver (APKMirror pages for base
//!   binaries, GitHub releases for support tools)
//! - [`StaticResolver`]: a fixed name-to-URL table for tests and offline mirrors

pub mod apkmirror;
pub mod fixed;
pub mod github;
pub mod web;

use crate::download::FetchError;
use async_trait::async_trait;
use std::fmt;

pub use fixed::StaticResolver;
pub use web::WebResolver;

/// What kind of artifact an [`AssetRef`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// The unpatched application binary for a target
    BaseBinary,
    /// A build tool artifact shared by every target (builder, patches, integrations)
    SupportTool,
}

/// Build tools fetched once per run and handed to the external builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupportTool {
    Cli,
    Patches,
    Integrations,
}

impl SupportTool {
    pub const ALL: [SupportTool; 3] = [
        SupportTool::Cli,
        SupportTool::Patches,
        SupportTool::Integrations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SupportTool::Cli => "cli",
            SupportTool::Patches => "patches",
            SupportTool::Integrations => "integrations",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SupportTool::Cli | SupportTool::Patches => "jar",
            SupportTool::Integrations => "apk",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name(), self.extension())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn asset_ref(&self) -> AssetRef {
        AssetRef {
            target_name: self.name().to_string(),
            kind: AssetKind::SupportTool,
            version: None,
        }
    }
}

impl fmt::Display for SupportTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies a remote asset to fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    pub target_name: String,
    pub kind: AssetKind,
    pub version: Option<String>,
}

impl AssetRef {
    pub fn base_binary(target: impl Into<String>, version: Option<String>) -> Self {
        Self {
            target_name: target.into(),
            kind: AssetKind::BaseBinary,
            version,
        }
    }

    /// Local file name for this asset, unique per (target, kind)
    ///
    /// Every concurrent download writes into the same work directory, so the
    /// name must be derivable before the fetch starts and never collide.
    pub fn file_name(&self) -> String {
        match self.kind {
            AssetKind::BaseBinary => format!("{}.apk", self.target_name),
            AssetKind::SupportTool => match SupportTool::from_name(&self.target_name) {
                Some(tool) => tool.file_name(),
                None => format!("{}.jar", self.target_name),
            },
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.version) {
            (AssetKind::BaseBinary, Some(version)) => write!(f, "{} {}", self.target_name, version),
            (AssetKind::BaseBinary, None) => write!(f, "{} (latest)", self.target_name),
            (AssetKind::SupportTool, _) => write!(f, "revanced-{}", self.target_name),
        }
    }
}

/// Turns a logical asset reference into a direct download URL
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve the base binary of `target`, optionally pinned to `version`
    async fn resolve(&self, target: &str, version: Option<&str>) -> Result<String, FetchError>;

    /// Resolve the newest published artifact of a support tool
    async fn resolve_latest_release(&self, tool: &str) -> Result<String, FetchError>;

    async fn resolve_asset(&self, asset: &AssetRef) -> Result<String, FetchError> {
        match asset.kind {
            AssetKind::BaseBinary => {
                self.resolve(&asset.target_name, asset.version.as_deref())
                    .await
            }
            AssetKind::SupportTool => self.resolve_latest_release(&asset.target_name).await,
        }
    }
}
