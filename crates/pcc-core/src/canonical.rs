//! # Canonical Serialization — Deterministic Ledger Lines
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! that enter the ledger and the Merkle accumulator.
//!
//! ## Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()` (or `from_value()`), which
//! applies the canonical writer:
//!
//! 1. **Sorted keys** — object keys ascend by Unicode code point, recursively.
//! 2. **Tight separators** — `,` between members, `:` between key and value,
//!    no whitespace anywhere.
//! 3. **Unescaped non-ASCII** — only `"`, `\` and control characters are
//!    escaped; everything else is written as raw UTF-8.
//! 4. **One trailing newline** — every canonical document ends in exactly
//!    one `\n`, so canonical outputs concatenate into a JSONL ledger.
//!
//! Structurally equal inputs (same key/value pairs, any insertion order)
//! produce byte-identical output. Ledger reproducibility and record-level
//! diffing both depend on this.
//!
//! ## Failure
//!
//! Values that cannot be represented as JSON (non-string map keys, failing
//! `Serialize` impls) are rejected with `CanonicalizationError`. Nothing is
//! coerced into a different shape.
//!
//! `serde_json` reads an integer literal outside the i64/u64 range as an
//! `f64`, which would surface in the ledger as an exponent float. Readers of
//! raw JSON text call [`lossy_integer`] first and reject such lines.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by the canonical JSON writer.
///
/// # Invariants
///
/// - The only constructors are `CanonicalBytes::new()` and `from_value()`.
/// - Keys are sorted, separators are compact, non-ASCII is raw UTF-8.
/// - The byte sequence ends with exactly one `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as a JSON tree.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(&value)
    }

    /// Construct canonical bytes from an already-built JSON value.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        let mut out = String::new();
        write_canonical(value, &mut out)?;
        out.push('\n');
        Ok(Self(out))
    }

    /// Access the canonical bytes, trailing newline included.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Access the canonical text, trailing newline included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    ///
    /// Never true for a constructed value; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the owned byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Recursively write a JSON value in canonical form.
fn write_canonical(value: &Value, out: &mut String) -> Result<(), CanonicalizationError> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(val, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        // Scalars: serde_json's compact writer already escapes only what JSON
        // requires and leaves non-ASCII untouched.
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

/// First integer literal in `text` that does not fit `i64` or `u64`.
///
/// Scans JSON text outside string literals. Literals with a fraction or an
/// exponent are floats by spelling and are not reported.
pub fn lossy_integer(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' | b'0'..=b'9' => {
                let start = i;
                while i < bytes.len()
                    && matches!(bytes[i], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
                {
                    i += 1;
                }
                let literal = &text[start..i];
                let integral = !literal.contains(['.', 'e', 'E']);
                let has_digits = literal.bytes().any(|b| b.is_ascii_digit());
                if integral
                    && has_digits
                    && literal.parse::<i64>().is_err()
                    && literal.parse::<u64>().is_err()
                {
                    return Some(literal);
                }
            }
            _ => i += 1,
        }
    }
    None
}
