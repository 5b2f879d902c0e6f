//! # Error Types — Failure Taxonomy
//!
//! Defines the error classes the audit core can surface. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - `Structural` — the input could not be read or parsed before any check ran.
//! - `Serialization` — a record could not be canonicalized; aborts the write.
//! - `Policy` — an enforced check failed under the `enforce` posture.
//! - `Io` — a ledger or manifest destination could not be written.
//!
//! None of these are retried internally. Each class maps to a stable
//! system check token so that a caller always receives a parseable
//! decision document, whatever went wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Check token used for unreadable or unparseable input.
pub const PARSE_ERROR_TOKEN: &str = "system:parse_error";

/// Check token used when a record cannot be canonicalized.
pub const SERIALIZATION_ERROR_TOKEN: &str = "system:serialization_error";

/// Check token used when the ledger or manifest cannot be written.
pub const IO_ERROR_TOKEN: &str = "system:io_error";

/// Top-level error type for the audit core.
#[derive(Error, Debug)]
pub enum PccError {
    /// Input was unreadable or unparseable.
    #[error("structural failure: {0}")]
    Structural(String),

    /// A record could not be canonicalized.
    #[error("serialization error: {0}")]
    Serialization(#[from] CanonicalizationError),

    /// An enforced check failed under the `enforce` posture.
    #[error("policy failure: enforced check {token} failed")]
    Policy {
        /// Token of the first failing enforced check.
        token: String,
    },

    /// A ledger or manifest destination could not be written or read.
    #[error("io failure at {}: {source}", .path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl PccError {
    /// Wrap an IO error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The system check token reported for this failure class.
    pub fn system_token(&self) -> &str {
        match self {
            Self::Structural(_) => PARSE_ERROR_TOKEN,
            Self::Serialization(_) => SERIALIZATION_ERROR_TOKEN,
            Self::Policy { token } => token,
            Self::Io { .. } => IO_ERROR_TOKEN,
        }
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed (unsupported leaf, non-string map key, ...).
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error decoding or validating a digest.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DigestError {
    /// The hex string had the wrong length.
    #[error("expected 64 hex chars, got {0}")]
    BadLength(usize),

    /// The hex string contained a non-hex character.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_tokens_per_class() {
        assert_eq!(
            PccError::Structural("bad zip".into()).system_token(),
            PARSE_ERROR_TOKEN
        );
        let io = PccError::io("/nope", std::io::Error::other("denied"));
        assert_eq!(io.system_token(), IO_ERROR_TOKEN);
        let policy = PccError::Policy {
            token: "tender:pack:parse_ok".into(),
        };
        assert_eq!(policy.system_token(), "tender:pack:parse_ok");
    }

    #[test]
    fn io_display_includes_path() {
        let err = PccError::io("/tmp/proof/root.txt", std::io::Error::other("denied"));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/proof/root.txt"));
        assert!(msg.contains("denied"));
    }
}
