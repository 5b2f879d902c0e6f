//! # Decision Engine
//!
//! Folds a run's checks into one allow/block [`Decision`].
//!
//! ## Policy
//!
//! Under [`Posture::Enforce`], the first failing check (in evaluation order)
//! whose token is in the [`EnforcedTokens`] set blocks with exit code 2.
//! Anything else allows with exit code 0. Under [`Posture::Advice`] checks
//! never block.
//!
//! Blocks can also be issued directly, before any checks exist, for
//! structural failures. Those exit 2 under `enforce` and 1 under `advice`.
//!
//! The verdict is computed over every check; only the first
//! [`MAX_CHECKS`] are carried into the document afterwards.

use std::collections::BTreeSet;

use pcc_core::{AssetId, Check, CorrelationId, PccError, Timestamp, ToolInfo};
use serde::{Deserialize, Serialize};

use crate::posture::{Posture, Verdict};

/// Most checks carried by one decision document.
pub const MAX_CHECKS: usize = 32;

/// Retention window quoted in every reason.
pub const RETENTION_WINDOW: &str = "5m";

/// Token reported by an allow.
pub const ALLOW_TOKEN: &str = "ok";

/// Tokens enforced when no configuration overrides them.
pub const DEFAULT_ENFORCED_TOKENS: [&str; 5] = [
    "system:parse_error",
    "tender:pack:parse_ok",
    "tender:criteria:weights_disclosed",
    "tender:criteria:formula_disclosed",
    "tender:coherence:notice_itt_consistent",
];

/// Check tokens whose failure blocks under `enforce`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnforcedTokens(BTreeSet<String>);

impl EnforcedTokens {
    /// Build from an explicit token list.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// Whether `token` is enforced.
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// Enforced tokens in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of enforced tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is enforced.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for EnforcedTokens {
    fn default() -> Self {
        Self::new(DEFAULT_ENFORCED_TOKENS)
    }
}

/// Everything the engine needs to know about one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRequest {
    /// Asset the run is about.
    pub asset_id: AssetId,
    /// Checks in evaluation order.
    pub checks: Vec<Check>,
    /// Effective posture.
    pub posture: Posture,
    /// Rule pack name, if any.
    pub pack: Option<String>,
    /// Registry revision the pack came from, if any.
    pub registry_revision: Option<String>,
}

impl DecisionRequest {
    /// A request with no checks and no provenance.
    pub fn new(asset_id: AssetId, posture: Posture) -> Self {
        Self {
            asset_id,
            checks: Vec::new(),
            posture,
            pack: None,
            registry_revision: None,
        }
    }

    /// Replace the check list.
    pub fn with_checks(mut self, checks: Vec<Check>) -> Self {
        self.checks = checks;
        self
    }

    /// Record the rule pack name.
    pub fn with_pack(mut self, pack: impl Into<String>) -> Self {
        self.pack = Some(pack.into());
        self
    }

    /// Record the registry revision.
    pub fn with_registry_revision(mut self, revision: impl Into<String>) -> Self {
        self.registry_revision = Some(revision.into());
        self
    }
}

/// The decision document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    tool: String,
    tool_version: String,
    vcs_revision: String,
    schema_version: String,
    asset_id: AssetId,
    token: String,
    decision: Verdict,
    reason: String,
    window: String,
    exit_code: u8,
    posture: Posture,
    correlation_id: CorrelationId,
    ts: Timestamp,
    checks: Vec<Check>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registry_revision: Option<String>,
}

impl Decision {
    /// Allow or block.
    pub fn verdict(&self) -> Verdict {
        self.decision
    }

    /// Process exit code: 0 allow, 1 advisory block, 2 enforced block.
    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// `ok` for an allow, the blocking token otherwise.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Human-readable reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Asset the decision is about.
    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    /// Posture the decision was made under.
    pub fn posture(&self) -> Posture {
        self.posture
    }

    /// Carried checks, at most [`MAX_CHECKS`].
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Unique id of this document.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// When the decision was made.
    pub fn ts(&self) -> Timestamp {
        self.ts
    }

    /// Rule pack name.
    pub fn pack(&self) -> Option<&str> {
        self.pack.as_deref()
    }

    /// Registry revision.
    pub fn registry_revision(&self) -> Option<&str> {
        self.registry_revision.as_deref()
    }

    /// Tool identity fields: `(tool, tool_version, vcs_revision, schema_version)`.
    pub fn tool(&self) -> (&str, &str, &str, &str) {
        (
            &self.tool,
            &self.tool_version,
            &self.vcs_revision,
            &self.schema_version,
        )
    }

    /// `Ok` for an allow, `PccError::Policy` carrying the token for a block.
    pub fn ensure_allowed(&self) -> Result<(), PccError> {
        match self.decision {
            Verdict::Allow => Ok(()),
            Verdict::Block => Err(PccError::Policy {
                token: self.token.clone(),
            }),
        }
    }

    /// Compact single-line JSON, no trailing newline.
    pub fn to_json_line(&self) -> Result<String, PccError> {
        serde_json::to_string(self)
            .map_err(|e| PccError::Serialization(pcc_core::CanonicalizationError::from(e)))
    }
}

/// Builds decisions for one tool.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    tool: ToolInfo,
    enforced: EnforcedTokens,
}

impl DecisionEngine {
    /// Create an engine for `tool` enforcing `enforced`.
    pub fn new(tool: &ToolInfo, enforced: EnforcedTokens) -> Self {
        Self {
            tool: tool.clone(),
            enforced,
        }
    }

    /// The enforced token set.
    pub fn enforced(&self) -> &EnforcedTokens {
        &self.enforced
    }

    /// Apply the posture policy to the request's checks.
    pub fn evaluate(&self, request: DecisionRequest) -> Decision {
        let blocking = match request.posture {
            Posture::Enforce => request
                .checks
                .iter()
                .find(|c| !c.ok && self.enforced.contains(&c.token))
                .map(|c| c.token.clone()),
            Posture::Advice => None,
        };
        match blocking {
            Some(token) => self.block(request, token),
            None => self.build(request, Verdict::Allow, ALLOW_TOKEN.to_string()),
        }
    }

    /// Block on `token` regardless of the checks.
    pub fn block(&self, request: DecisionRequest, token: impl Into<String>) -> Decision {
        self.build(request, Verdict::Block, token.into())
    }

    /// Block because the run could not produce facts.
    ///
    /// A failing check named by the error's system token is placed first in
    /// the carried checks, with the error message as its details.
    pub fn structural_failure(&self, mut request: DecisionRequest, error: &PccError) -> Decision {
        let token = error.system_token().to_string();
        request
            .checks
            .insert(0, Check::fail(token.clone()).with_details(error.to_string()));
        self.block(request, token)
    }

    fn build(&self, request: DecisionRequest, verdict: Verdict, token: String) -> Decision {
        let (exit_code, reason) = match verdict {
            Verdict::Allow => (0, format!("allow because {ALLOW_TOKEN}, window {RETENTION_WINDOW}")),
            Verdict::Block => (
                request.posture.block_exit_code(),
                format!("blocked because {token}, held {RETENTION_WINDOW}"),
            ),
        };

        let mut checks = request.checks;
        if checks.len() > MAX_CHECKS {
            tracing::debug!(total = checks.len(), kept = MAX_CHECKS, "truncating checks");
            checks.truncate(MAX_CHECKS);
        }

        tracing::info!(
            asset_id = %request.asset_id,
            decision = %verdict,
            token = %token,
            posture = %request.posture,
            exit_code,
            "decision made"
        );

        Decision {
            tool: self.tool.tool.clone(),
            tool_version: self.tool.tool_version.clone(),
            vcs_revision: self.tool.vcs_revision.clone(),
            schema_version: self.tool.schema_version.clone(),
            asset_id: request.asset_id,
            token,
            decision: verdict,
            reason,
            window: RETENTION_WINDOW.to_string(),
            exit_code,
            posture: request.posture,
            correlation_id: CorrelationId::new(),
            ts: Timestamp::now(),
            checks,
            pack: request.pack,
            registry_revision: request.registry_revision,
        }
    }
}
