//! # Configuration File
//!
//! Optional `pcc.yaml`. Every key is optional; command-line flags override
//! whatever the file sets.
//!
//! ```yaml
//! tool: tender-digest
//! pack: tender-core
//! posture: enforce
//! registry_revision: 4f2a9c1
//! enforced_tokens:
//!   - system:parse_error
//!   - tender:pack:parse_ok
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use pcc_core::ToolInfo;
use pcc_policy::{EnforcedTokens, Posture};
use serde::Deserialize;

/// Tool name reported when the configuration names none.
pub const DEFAULT_TOOL: &str = "pcc";

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PccConfig {
    /// Tool name written into decisions.
    pub tool: Option<String>,
    /// Rule pack name.
    pub pack: Option<String>,
    /// Default posture.
    pub posture: Option<Posture>,
    /// Registry revision of the rule pack.
    pub registry_revision: Option<String>,
    /// Replaces the built-in enforced token set.
    pub enforced_tokens: Option<Vec<String>>,
}

impl PccConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty file deserializes to null, not a mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("invalid configuration")
    }

    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Tool identity for this process.
    pub fn tool_info(&self) -> ToolInfo {
        ToolInfo::from_env(self.tool.as_deref().unwrap_or(DEFAULT_TOOL))
    }

    /// Enforced tokens: the configured list, or the built-in default.
    pub fn enforced_tokens(&self) -> EnforcedTokens {
        match &self.enforced_tokens {
            Some(tokens) => EnforcedTokens::new(tokens.iter().cloned()),
            None => EnforcedTokens::default(),
        }
    }
}
