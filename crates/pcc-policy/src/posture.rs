//! # Posture and Verdict

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a failed enforced check is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    /// Report only. Failing checks never block.
    #[default]
    Advice,
    /// A failing enforced check blocks with exit code 2.
    Enforce,
}

impl Posture {
    /// The lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advice => "advice",
            Self::Enforce => "enforce",
        }
    }

    /// Exit code carried by a block under this posture.
    pub fn block_exit_code(&self) -> u8 {
        match self {
            Self::Advice => 1,
            Self::Enforce => 2,
        }
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a posture name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown posture `{0}` (expected `advice` or `enforce`)")]
pub struct ParsePostureError(String);

impl FromStr for Posture {
    type Err = ParsePostureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advice" => Ok(Self::Advice),
            "enforce" => Ok(Self::Enforce),
            other => Err(ParsePostureError(other.to_string())),
        }
    }
}

/// The outcome of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Proceed.
    Allow,
    /// Stop.
    Block,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Block => "block",
        })
    }
}
