//! # Root Manifest
//!
//! The small text file published next to a ledger. Keys are written in a
//! fixed order, one `key: value` per LF-terminated line:
//!
//! ```text
//! root: <64 lowercase hex>
//! lines: <ledger line count>
//! ts: <YYYY-MM-DDTHH:MM:SSZ>
//! tool_version: <version>
//! git_sha: <vcs revision>
//! ```
//!
//! Verification only ever reads the `root:` line; the rest is provenance.

use std::fmt::Write as _;

use pcc_core::{Digest, PccError, Timestamp};

const ROOT_KEY: &str = "root";
const LINES_KEY: &str = "lines";
const TS_KEY: &str = "ts";
const TOOL_VERSION_KEY: &str = "tool_version";
const REVISION_KEY: &str = "git_sha";

/// Parsed or to-be-written manifest contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Merkle root over the ledger lines.
    pub root: Digest,
    /// Number of ledger lines.
    pub lines: usize,
    /// When the ledger was written.
    pub ts: Timestamp,
    /// Version of the tool that wrote it.
    pub tool_version: String,
    /// VCS revision of the tool that wrote it.
    pub vcs_revision: String,
}

impl Manifest {
    /// Render the manifest text. Always ends in `\n`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(160);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{ROOT_KEY}: {}", self.root.to_hex());
        let _ = writeln!(out, "{LINES_KEY}: {}", self.lines);
        let _ = writeln!(out, "{TS_KEY}: {}", self.ts);
        let _ = writeln!(out, "{TOOL_VERSION_KEY}: {}", self.tool_version);
        let _ = writeln!(out, "{REVISION_KEY}: {}", self.vcs_revision);
        out
    }

    /// Parse manifest text strictly.
    ///
    /// Every key must be present and well-formed. The first occurrence of a
    /// key wins; unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// `PccError::Structural` naming the missing or malformed key.
    pub fn parse(text: &str) -> Result<Self, PccError> {
        let root = required(text, ROOT_KEY)?;
        let root = Digest::from_hex(&root)
            .map_err(|e| PccError::Structural(format!("manifest `{ROOT_KEY}`: {e}")))?;
        let lines = required(text, LINES_KEY)?;
        let lines = lines
            .parse::<usize>()
            .map_err(|e| PccError::Structural(format!("manifest `{LINES_KEY}`: {e}")))?;
        let ts = Timestamp::parse(&required(text, TS_KEY)?)?;
        Ok(Self {
            root,
            lines,
            ts,
            tool_version: required(text, TOOL_VERSION_KEY)?,
            vcs_revision: required(text, REVISION_KEY)?,
        })
    }

    /// The value of the first `root:` line, trimmed, if any.
    ///
    /// Lenient: the value is returned as written, even if it is not valid hex.
    pub fn root_from_text(text: &str) -> Option<String> {
        field(text, ROOT_KEY)
    }
}

fn manifest_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', '\r'])
}

fn field(text: &str, key: &str) -> Option<String> {
    manifest_lines(text).find_map(|line| {
        let (k, v) = line.split_once(':')?;
        (k == key).then(|| v.trim().to_string())
    })
}

fn required(text: &str, key: &str) -> Result<String, PccError> {
    field(text, key).ok_or_else(|| PccError::Structural(format!("manifest missing `{key}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcc_core::sha256;

    fn sample() -> Manifest {
        Manifest {
            root: sha256(b""),
            lines: 0,
            ts: Timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
            tool_version: "0.1.0".to_string(),
            vcs_revision: "abc123".to_string(),
        }
    }

    #[test]
    fn render_fixed_key_order() {
        assert_eq!(
            sample().render(),
            "root: e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n\
             lines: 0\n\
             ts: 2024-01-01T00:00:00Z\n\
             tool_version: 0.1.0\n\
             git_sha: abc123\n"
        );
    }

    #[test]
    fn parse_render_round_trip() {
        let m = sample();
        assert_eq!(Manifest::parse(&m.render()).unwrap(), m);
    }

    #[test]
    fn parse_tolerates_crlf_and_unknown_keys() {
        let text = sample().render().replace('\n', "\r\n") + "extra: 1\r\n";
        assert_eq!(Manifest::parse(&text).unwrap(), sample());
    }

    #[test]
    fn parse_missing_key_is_structural() {
        let text = sample().render().replace("git_sha: abc123\n", "");
        match Manifest::parse(&text) {
            Err(PccError::Structural(msg)) => assert!(msg.contains("git_sha")),
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn parse_bad_root_is_structural() {
        let text = "root: nothex\nlines: 0\nts: 2024-01-01T00:00:00Z\ntool_version: x\ngit_sha: y\n";
        assert!(matches!(Manifest::parse(text), Err(PccError::Structural(_))));
    }

    #[test]
    fn root_from_text_first_occurrence() {
        let text = "note: hi\nroot:  aa \nroot: bb\n";
        assert_eq!(Manifest::root_from_text(text).as_deref(), Some("aa"));
    }

    #[test]
    fn root_from_text_missing() {
        assert_eq!(Manifest::root_from_text("lines: 3\n"), None);
        assert_eq!(Manifest::root_from_text(""), None);
    }

    #[test]
    fn root_key_must_start_the_line() {
        assert_eq!(Manifest::root_from_text("  root: aa\n"), None);
        assert_eq!(Manifest::root_from_text("rooted: aa\n"), None);
    }
}
