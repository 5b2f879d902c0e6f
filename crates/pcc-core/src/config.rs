//! # Tool Identity
//!
//! `ToolInfo` carries the process-wide constants that end up in manifests
//! and decision documents. It is built once at process start and passed by
//! reference; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

/// Version of the decision document layout.
pub const DECISION_SCHEMA_VERSION: &str = "1.0";

/// Version of this crate, used as the default `tool_version`.
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the VCS revision of the running build.
pub const GIT_SHA_ENV: &str = "PCC_GIT_SHA";

/// Revision reported when no VCS revision was supplied.
pub const UNKNOWN_REVISION: &str = "unknown";

/// Immutable identity of the running tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name, e.g. `tender-digest`.
    pub tool: String,
    /// Tool version string.
    pub tool_version: String,
    /// VCS revision the tool was built from.
    pub vcs_revision: String,
    /// Decision document schema version.
    pub schema_version: String,
}

impl ToolInfo {
    /// Build with explicit values and the current decision schema version.
    pub fn new(
        tool: impl Into<String>,
        tool_version: impl Into<String>,
        vcs_revision: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            tool_version: tool_version.into(),
            vcs_revision: vcs_revision.into(),
            schema_version: DECISION_SCHEMA_VERSION.to_string(),
        }
    }

    /// Build from the environment.
    ///
    /// The revision is read from `PCC_GIT_SHA` at runtime, falling back to the
    /// value baked in at compile time, then to `unknown`.
    pub fn from_env(tool: impl Into<String>) -> Self {
        let vcs_revision = std::env::var(GIT_SHA_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| option_env!("PCC_GIT_SHA").map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_REVISION.to_string());
        Self::new(tool, CRATE_VERSION, vcs_revision)
    }
}
