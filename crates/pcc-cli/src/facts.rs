//! # JSONL Fact Producer
//!
//! Reads records and checks from newline-delimited JSON files. Blank lines
//! are skipped. Anything unreadable or unparseable is a structural failure
//! naming the file and line, and so is an integer that would only survive
//! as a float.

use std::fs;
use std::path::{Path, PathBuf};

use pcc_core::{lossy_integer, Check, FactProducer, Facts, PccError, Record};
use serde::de::DeserializeOwned;

/// Check appended after every successful load.
pub const INPUT_PARSE_TOKEN: &str = "system:input:parse_ok";

/// Records (and optionally checks) from JSONL files.
#[derive(Debug, Clone)]
pub struct JsonlFacts {
    records: PathBuf,
    checks: Option<PathBuf>,
}

impl JsonlFacts {
    /// Read records from `records` and checks from `checks`, if given.
    pub fn new(records: impl Into<PathBuf>, checks: Option<PathBuf>) -> Self {
        Self {
            records: records.into(),
            checks,
        }
    }
}

impl FactProducer for JsonlFacts {
    fn produce(&self) -> Result<Facts, PccError> {
        let records: Vec<Record> = read_jsonl(&self.records)?;
        let mut checks: Vec<Check> = match &self.checks {
            Some(path) => read_jsonl(path)?,
            None => Vec::new(),
        };
        checks.push(Check::pass(INPUT_PARSE_TOKEN).with_source(self.records.display().to_string()));
        tracing::info!(
            records = records.len(),
            checks = checks.len(),
            source = %self.records.display(),
            "facts loaded"
        );
        Ok(Facts { records, checks })
    }
}

/// Parse every non-blank line of `path` as `T`.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PccError> {
    let text = fs::read_to_string(path)
        .map_err(|e| PccError::Structural(format!("cannot read {}: {e}", path.display())))?;
    parse_jsonl(&text, path)
}

/// Parse every non-blank line of `text`; `origin` names the source in errors.
pub fn parse_jsonl<T: DeserializeOwned>(text: &str, origin: &Path) -> Result<Vec<T>, PccError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let at = || format!("{} line {}", origin.display(), idx + 1);
            if let Some(literal) = lossy_integer(line) {
                return Err(PccError::Structural(format!(
                    "{}: integer {literal} is outside the 64-bit range",
                    at()
                )));
            }
            serde_json::from_str::<T>(line)
                .map_err(|e| PccError::Structural(format!("{}: {e}", at())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_records_and_checks() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records.jsonl");
        let checks = dir.path().join("checks.jsonl");
        fs::write(
            &records,
            "{\"type\":\"summary\",\"docs_total\":3}\n\n{\"type\":\"term\",\"key\":\"k\"}\n",
        )
        .unwrap();
        fs::write(&checks, "{\"token\":\"tender:pack:parse_ok\",\"ok\":true}\n").unwrap();

        let facts = JsonlFacts::new(&records, Some(checks)).produce().unwrap();
        assert_eq!(facts.records.len(), 2);
        assert_eq!(facts.checks.len(), 2);
        assert_eq!(facts.checks[0].token, "tender:pack:parse_ok");
        assert_eq!(facts.checks[1].token, INPUT_PARSE_TOKEN);
        assert!(facts.checks[1].ok);
    }

    #[test]
    fn bad_line_names_file_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records.jsonl");
        fs::write(&records, "{\"type\":\"a\"}\n{oops\n").unwrap();
        match JsonlFacts::new(&records, None).produce() {
            Err(PccError::Structural(msg)) => {
                assert!(msg.contains("records.jsonl line 2"), "{msg}");
            }
            other => panic!("expected structural failure, got {other:?}"),
        }
    }

    #[test]
    fn record_without_type_is_structural() {
        let err = parse_jsonl::<Record>("{\"asset_id\":\"a\"}\n", Path::new("r.jsonl")).unwrap_err();
        assert_eq!(err.system_token(), "system:parse_error");
    }

    #[test]
    fn missing_file_is_structural() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonlFacts::new(dir.path().join("absent.jsonl"), None)
            .produce()
            .unwrap_err();
        assert!(matches!(err, PccError::Structural(_)));
    }

    #[test]
    fn oversized_integer_is_structural() {
        let text = "{\"type\":\"a\"}\n{\"type\":\"term\",\"value\":123456789012345678901234567890}\n";
        match parse_jsonl::<Record>(text, Path::new("records.jsonl")) {
            Err(PccError::Structural(msg)) => {
                assert!(msg.contains("records.jsonl line 2"), "{msg}");
                assert!(msg.contains("123456789012345678901234567890"), "{msg}");
            }
            other => panic!("expected structural failure, got {other:?}"),
        }
    }

    #[test]
    fn u64_max_survives_exactly() {
        let records =
            parse_jsonl::<Record>("{\"type\":\"a\",\"n\":18446744073709551615}\n", Path::new("r"))
                .unwrap();
        assert_eq!(records[0].get("n"), Some(&serde_json::json!(u64::MAX)));
    }
}
