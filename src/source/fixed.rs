use crate::download::FetchError;
use crate::source::SourceResolver;
use async_trait::async_trait;
use std::collections::HashMap;

/// Resolver backed by a fixed name-to-URL table
///
/// Base binaries are looked up by target name, support tools by tool name.
/// Useful for mirrors, air-gapped runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    binaries: HashMap<String, String>,
    tools: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, target: impl Into<String>, url: impl Into<String>) -> Self {
        self.binaries.insert(target.into(), url.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>, url: impl Into<String>) -> Self {
        self.tools.insert(tool.into(), url.into());
        self
    }
}

#[async_trait]
impl SourceResolver for StaticResolver {
    async fn resolve(&self, target: &str, _version: Option<&str>) -> Result<String, FetchError> {
        self.binaries
            .get(target)
            .cloned()
            .ok_or_else(|| FetchError::Resolve {
                asset: target.to_string(),
                message: "no static URL configured".to_string(),
            })
    }

    async fn resolve_latest_release(&self, tool: &str) -> Result<String, FetchError> {
        self.tools
            .get(tool)
            .cloned()
            .ok_or_else(|| FetchError::Resolve {
                asset: format!("revanced-{}", tool),
                message: "no static URL configured".to_string(),
            })
    }
}
