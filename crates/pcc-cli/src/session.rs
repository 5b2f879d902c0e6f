//! # Session
//!
//! State shared by every subcommand for one process: the loaded
//! configuration, the tool identity and the decision engine. Also holds the
//! decision flags common to `run` and `canonicalize`.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use pcc_core::{AssetId, PccError, ToolInfo};
use pcc_policy::{Decision, DecisionEngine, DecisionRequest, Posture};

use crate::config::PccConfig;

/// Decision flags. Each overrides the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Asset id for the decision. Defaults to `tender:pack/<input file stem>`.
    #[arg(long)]
    pub asset_id: Option<String>,

    /// Effective posture: `advice` or `enforce`.
    #[arg(long)]
    pub posture: Option<Posture>,

    /// Rule pack name recorded in the decision.
    #[arg(long)]
    pub pack: Option<String>,

    /// Registry revision recorded in the decision.
    #[arg(long)]
    pub registry_revision: Option<String>,
}

/// Per-process context.
#[derive(Debug, Clone)]
pub struct Session {
    config: PccConfig,
    tool: ToolInfo,
    engine: DecisionEngine,
}

impl Session {
    /// Build tool identity and engine from `config`.
    pub fn new(config: PccConfig) -> Self {
        let tool = config.tool_info();
        let engine = DecisionEngine::new(&tool, config.enforced_tokens());
        Self {
            config,
            tool,
            engine,
        }
    }

    /// Tool identity.
    pub fn tool(&self) -> &ToolInfo {
        &self.tool
    }

    /// Decision engine.
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Build a check-less request from flags, config, and the input path.
    pub fn request(&self, args: &PolicyArgs, source: &Path) -> DecisionRequest {
        let asset_id = match &args.asset_id {
            Some(id) => AssetId::new(id.clone()),
            None => AssetId::from_source_path(source, "pack"),
        };
        let posture = args.posture.or(self.config.posture).unwrap_or_default();
        let mut request = DecisionRequest::new(asset_id, posture);
        if let Some(pack) = args.pack.as_ref().or(self.config.pack.as_ref()) {
            request = request.with_pack(pack.clone());
        }
        if let Some(rev) = args
            .registry_revision
            .as_ref()
            .or(self.config.registry_revision.as_ref())
        {
            request = request.with_registry_revision(rev.clone());
        }
        request
    }

    /// Block `request` on `error` and print the decision.
    pub fn fail(&self, request: DecisionRequest, error: &PccError) -> Result<u8> {
        tracing::error!(token = error.system_token(), "{error}");
        let decision = self.engine.structural_failure(request, error);
        emit(&decision)
    }
}

/// Print the decision JSON to stdout and its reason to stderr.
///
/// Returns the decision's exit code.
pub fn emit(decision: &Decision) -> Result<u8> {
    println!("{}", decision.to_json_line()?);
    eprintln!("{}", decision.reason());
    Ok(decision.exit_code())
}
