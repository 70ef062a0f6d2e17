//! Record type and its textual projection.
//!
//! A record is an opaque, caller-assigned id plus a dynamic field map.
//! The field map is treated opaquely everywhere except the textual
//! projection, which flattens field *values* into the single string the
//! embedder consumes. Field keys never appear in the projection, and any
//! field whose key starts with [`RESERVED_FIELD_PREFIX`] is skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dynamic record payload: field name to arbitrary JSON value.
pub type FieldMap = serde_json::Map<String, Value>;

/// Fields whose key starts with this prefix carry bookkeeping metadata and
/// are excluded from the textual projection.
pub const RESERVED_FIELD_PREFIX: &str = "_dedupit_";

/// A single input record. Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-assigned identifier, unique and non-empty within a request
    pub id: String,
    /// The actual record data
    pub data: FieldMap,
}

impl Record {
    /// Create a record from an id and a field map.
    pub fn new(id: impl Into<String>, data: FieldMap) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// The string this record is embedded as. See [`projection_text`].
    pub fn projection_text(&self) -> String {
        projection_text(&self.data)
    }
}

/// Flatten a field map into the embedding input string.
///
/// Field values are rendered in the map's iteration order (sorted by key,
/// which is deterministic), separated by single spaces. Reserved fields
/// are skipped. Null values contribute an empty token, so two adjacent
/// nulls collapse into consecutive separators rather than disappearing.
pub fn projection_text(data: &FieldMap) -> String {
    let mut out = String::new();
    let mut first = true;
    for (key, value) in data {
        if key.starts_with(RESERVED_FIELD_PREFIX) {
            continue;
        }
        if !first {
            out.push(' ');
        }
        first = false;
        render_value(value, &mut out);
    }
    out
}

/// Render a single field value for the projection.
///
/// Scalars render bare (no JSON quoting); nested arrays and objects render
/// as compact JSON.
fn render_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            use std::fmt::Write;
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => out.push_str(s),
        nested => {
            use std::fmt::Write;
            let _ = write!(out, "{}", nested);
        }
    }
}
