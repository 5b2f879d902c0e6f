//! # Records and Checks — The Collaborator Contract
//!
//! Extraction modules hand the core two kinds of values:
//!
//! - [`Record`]: a schema-free fact. A `type` discriminator plus arbitrary
//!   producer fields, held as a tagged envelope over `serde_json::Value`.
//!   Only the sort-key fields (`asset_id`, `token`/`key`, `ts`, `type`) carry
//!   meaning for the core.
//! - [`Check`]: a named pass/fail assertion with optional detail.
//!
//! Producers implement [`FactProducer`]; the core never interprets any other
//! record field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PccError;
use crate::temporal::Timestamp;

/// A schema-free structured fact.
///
/// Serialized flat: `{"type": ..., <fields>...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

/// The ledger ordering key: `(asset_id, token_or_key, ts, type)`.
pub type SortKey = (String, String, String, String);

impl Record {
    /// Create an empty record with the given `type` discriminator.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a producer field. `type` is routed to the discriminator.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if key == "type" {
            self.kind = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(key, value);
        }
    }

    /// The `type` discriminator.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Look up a producer field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All producer fields, `type` excluded.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Whether the record carries a non-null `ts` field.
    pub fn has_ts(&self) -> bool {
        !matches!(self.fields.get("ts"), None | Some(Value::Null))
    }

    /// Stamp `ts` unless one is already present. Returns whether it stamped.
    pub fn stamp_ts(&mut self, ts: Timestamp) -> bool {
        if self.has_ts() {
            return false;
        }
        self.fields
            .insert("ts".to_string(), Value::String(ts.to_iso8601()));
        true
    }

    /// The ledger ordering key. Missing fields sort as the empty string.
    pub fn sort_key(&self) -> SortKey {
        let token_or_key = match self.fields.get("token") {
            None | Some(Value::Null) => self.field_text("key"),
            Some(v) => value_text(v),
        };
        (
            self.field_text("asset_id"),
            token_or_key,
            self.field_text("ts"),
            self.kind.clone(),
        )
    }

    fn field_text(&self, key: &str) -> String {
        self.fields.get(key).map(value_text).unwrap_or_default()
    }
}

/// Strings compare by content, other non-null values by their compact JSON.
fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A single named pass/fail assertion.
///
/// Absent `details`/`source` serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Stable namespaced identifier, e.g. `tender:pack:parse_ok`.
    pub token: String,
    /// Whether the assertion held.
    pub ok: bool,
    /// Free-text detail.
    #[serde(default)]
    pub details: Option<String>,
    /// Where the evidence came from (file, section, ...).
    #[serde(default)]
    pub source: Option<String>,
}

impl Check {
    /// A passing check.
    pub fn pass(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ok: true,
            details: None,
            source: None,
        }
    }

    /// A failing check.
    pub fn fail(token: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::pass(token)
        }
    }

    /// Attach free-text detail.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach a source reference.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Everything one producer contributed to a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    /// Records destined for the ledger.
    pub records: Vec<Record>,
    /// Checks destined for the decision.
    pub checks: Vec<Check>,
}

impl Facts {
    /// Append another producer's output, preserving order.
    pub fn extend(&mut self, other: Facts) {
        self.records.extend(other.records);
        self.checks.extend(other.checks);
    }
}

/// A source of records and checks (an extractor, a file reader, ...).
pub trait FactProducer {
    /// Produce this source's facts.
    ///
    /// # Errors
    ///
    /// Unreadable or unparseable input is reported as `PccError::Structural`.
    fn produce(&self) -> Result<Facts, PccError>;
}
