use crate::cast::binder::{ColumnSchema, TableSchema};
use crate::cast::types::{ColumnType, Datum, Row};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// A matched value whose text could not be converted to the column's
/// declared type. Fatal to the record; the caller decides whether to
/// skip the record or abort the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot coerce value '{value}' to {target} for column '{column}'")]
pub struct CoercionError {
    pub column: String,
    pub target: &'static str,
    pub value: String,
}

/// Extracts one schema-typed row per JSON document
///
/// The schema is immutable and shared; clone the `Arc` to give each
/// worker its own extractor over the same binding. Extraction is a
/// pure function of `(schema, document)`: identical inputs always
/// yield identical rows.
///
/// Failure policy, per record:
/// - malformed JSON, or a top-level value that is not an object, drops
///   the whole record (`Ok(None)`) - never a partial row;
/// - a column whose path does not resolve, or resolves to JSON null,
///   gets `Datum::Null` while the rest of the row is populated;
/// - a matched value that cannot be coerced to the declared type
///   escalates as `CoercionError`.
pub struct RowExtractor {
    schema: Arc<TableSchema>,
}

impl RowExtractor {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        RowExtractor { schema }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Parse one raw JSON document and extract a fresh row from it.
    pub fn extract(&self, raw: &str) -> Result<Option<Row>, CoercionError> {
        match serde_json::from_str::<Value>(raw) {
            Ok(doc) => self.extract_value(doc),
            Err(_) => Ok(None),
        }
    }

    /// Extract a fresh row from an already-parsed document.
    pub fn extract_value(&self, doc: Value) -> Result<Option<Row>, CoercionError> {
        if !doc.is_object() {
            return Ok(None);
        }
        let doc = normalize_keys(doc);
        let mut row = Row::filled_null(self.schema.width());
        self.fill_row(&doc, &mut row)?;
        Ok(Some(row))
    }

    /// Buffer-reuse fast path: overwrite a caller-owned row in place.
    ///
    /// Returns `false` when the record is dropped; the buffer is then
    /// all-null. The buffer is resized to the schema width on every
    /// call, so any `Row` may be passed in. Callers must copy the row
    /// before the next call if they need to retain it.
    pub fn extract_into(&self, raw: &str, row: &mut Row) -> Result<bool, CoercionError> {
        row.reset(self.schema.width());
        let doc = match serde_json::from_str::<Value>(raw) {
            Ok(doc) if doc.is_object() => normalize_keys(doc),
            _ => return Ok(false),
        };
        self.fill_row(&doc, row)?;
        Ok(true)
    }

    fn fill_row(&self, doc: &Value, row: &mut Row) -> Result<(), CoercionError> {
        for (index, column) in self.schema.columns().iter().enumerate() {
            let datum = match column.path().eval(doc) {
                None | Some(Value::Null) => Datum::Null,
                Some(value) => coerce(column, value)?,
            };
            row.set(index, datum);
        }
        Ok(())
    }
}

/// Fold every object key to lowercase, recursively. Column-name
/// matching in the host is case-insensitive, so document keys are
/// normalized once here instead of during path evaluation. Keys that
/// collide after folding keep the last value.
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut normalized = Map::new();
            for (key, nested) in map {
                normalized.insert(key.to_ascii_lowercase(), normalize_keys(nested));
            }
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert a matched value to its textual form, then parse that text
/// as the declared type. Strings pass through unquoted; numbers and
/// booleans use their JSON text; objects and arrays use compact JSON.
fn coerce(column: &ColumnSchema, value: &Value) -> Result<Datum, CoercionError> {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let datum = match column.column_type() {
        ColumnType::Double => Datum::Double(parse_numeric(column, &text)?),
        ColumnType::BigInt => Datum::BigInt(parse_numeric(column, &text)?),
        ColumnType::Int => Datum::Int(parse_numeric(column, &text)?),
        ColumnType::TinyInt => Datum::TinyInt(parse_numeric(column, &text)?),
        ColumnType::Float => Datum::Float(parse_numeric(column, &text)?),
        // lenient parse: anything but a case-insensitive "true" is false
        ColumnType::Boolean => Datum::Boolean(text.eq_ignore_ascii_case("true")),
        ColumnType::String => Datum::String(text),
    };

    Ok(datum)
}

fn parse_numeric<T: FromStr>(column: &ColumnSchema, text: &str) -> Result<T, CoercionError> {
    text.parse::<T>().map_err(|_| CoercionError {
        column: column.name().to_string(),
        target: column.column_type().name(),
        value: text.to_string(),
    })
}
