//! Patch catalog: the remote document listing every rule per target app
//!
//! The catalog is fetched once per process. [`parser::parse`] is pure, so the
//! same document always yields the same [`RuleCatalog`].

pub mod parser;

use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub use parser::{parse, SECTION_MARKER};

pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/revanced/revanced-patches/main/README.md";

/// Version value meaning "applies to every version of the app"
pub const ANY_VERSION: &str = "all";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No pinned version found in the patches for {target}")]
    NoVersionFound { target: String },

    #[error("Catalog document does not match the expected format: {0}")]
    ParseMismatch(String),

    #[error("Unknown target '{0}'. Valid targets: youtube, youtube-music, twitter, reddit")]
    UnknownTarget(String),

    #[error("Failed to fetch catalog from {url}: {message}")]
    Fetch { url: String, message: String },
}

/// Coarse app categories the catalog sections are bucketed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TargetCategory {
    Youtube,
    YoutubeMusic,
    Twitter,
    Reddit,
}

impl TargetCategory {
    pub const ALL: [TargetCategory; 4] = [
        TargetCategory::Youtube,
        TargetCategory::YoutubeMusic,
        TargetCategory::Twitter,
        TargetCategory::Reddit,
    ];

    /// Keyword table, checked top to bottom. `music` must precede `youtube`
    /// since the music package name contains both.
    const KEYWORDS: [(&'static str, TargetCategory); 4] = [
        ("twitter", TargetCategory::Twitter),
        ("reddit", TargetCategory::Reddit),
        ("music", TargetCategory::YoutubeMusic),
        ("youtube", TargetCategory::Youtube),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TargetCategory::Youtube => "youtube",
            TargetCategory::YoutubeMusic => "youtube-music",
            TargetCategory::Twitter => "twitter",
            TargetCategory::Reddit => "reddit",
        }
    }

    /// Case-insensitive substring match of a section's app name
    pub fn classify(app_name: &str) -> Option<Self> {
        let lowered = app_name.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, category)| *category)
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetCategory {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| CatalogError::UnknownTarget(s.to_string()))
    }
}

/// A named transformation applicable to one app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub name: String,
    pub description: String,
    /// App name as written in the catalog section header
    pub target: String,
    pub version: String,
}

/// Rules for one target, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == name)
    }

    /// Version of the first rule pinned to something other than [`ANY_VERSION`]
    pub fn representative_version(&self) -> Option<&str> {
        self.rules
            .iter()
            .map(|rule| rule.version.as_str())
            .find(|version| *version != ANY_VERSION)
    }

    pub(crate) fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Parsed catalog: one [`RuleSet`] per known category (possibly empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCatalog {
    sets: BTreeMap<TargetCategory, RuleSet>,
}

impl RuleCatalog {
    pub(crate) fn from_sets(mut sets: BTreeMap<TargetCategory, RuleSet>) -> Self {
        for category in TargetCategory::ALL {
            sets.entry(category).or_default();
        }
        Self { sets }
    }

    /// Downloads and parses the catalog document
    pub async fn load(client: &Client, url: &str) -> Result<Self, CatalogError> {
        info!(url, "Fetching all patches");
        let fetch_err = |message: String| CatalogError::Fetch {
            url: url.to_string(),
            message,
        };

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }
        let document = response.text().await.map_err(|e| fetch_err(e.to_string()))?;

        let catalog = parse(&document)?;
        for (category, rules) in catalog.iter() {
            info!(app = %category, patches = rules.len(), "Total patches for target");
        }
        Ok(catalog)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetCategory, &RuleSet)> {
        self.sets.iter().map(|(category, rules)| (*category, rules))
    }

    pub fn rules_for(&self, target: &str) -> Result<&RuleSet, CatalogError> {
        let category: TargetCategory = target.parse()?;
        Ok(&self.sets[&category])
    }

    pub fn version_of(&self, target: &str) -> Result<&str, CatalogError> {
        self.rules_for(target)?
            .representative_version()
            .ok_or_else(|| CatalogError::NoVersionFound {
                target: target.to_string(),
            })
    }
}
