use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Target scalar type declared for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Boolean,
    TinyInt,
    Int,
    BigInt,
    Float,
    Double,
}

impl ColumnType {
    /// Resolve a declared type name, case-insensitively.
    ///
    /// Unrecognized names fall back to `String`; the default arm is
    /// deliberate, not an error.
    pub fn from_name(name: &str) -> ColumnType {
        match name.trim().to_ascii_lowercase().as_str() {
            "boolean" => ColumnType::Boolean,
            "tinyint" => ColumnType::TinyInt,
            "int" => ColumnType::Int,
            "bigint" => ColumnType::BigInt,
            "float" => ColumnType::Float,
            "double" => ColumnType::Double,
            "string" => ColumnType::String,
            _ => ColumnType::String,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::TinyInt => "tinyint",
            ColumnType::Int => "int",
            ColumnType::BigInt => "bigint",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
        }
    }
}

/// One typed cell of an extracted row
///
/// Serializes untagged, so a row renders as plain JSON scalars and
/// nulls rather than enum wrappers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    Null,
    Boolean(bool),
    TinyInt(i8),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }
}

/// An ordered row of schema-typed values - one per table column
///
/// `RowExtractor::extract` returns a fresh `Row` per record. The
/// `extract_into` fast path overwrites a caller-owned `Row` instead;
/// callers on that path must copy a row before the next extraction if
/// they need to retain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: Vec<Datum>,
}

impl Row {
    /// A row of the given width with every slot null.
    pub fn filled_null(width: usize) -> Row {
        Row {
            values: vec![Datum::Null; width],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Datum> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    pub(crate) fn set(&mut self, index: usize, value: Datum) {
        self.values[index] = value;
    }

    pub(crate) fn reset(&mut self, width: usize) {
        self.values.clear();
        self.values.resize(width, Datum::Null);
    }
}

/// Declarative table definition in the host's configuration convention:
/// comma-separated column names and type names (parallel lists), plus
/// one path expression per column keyed by column name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Comma-separated column names, e.g. "request_id,keywords"
    pub columns: String,

    /// Comma-separated declared type names, e.g. "string,int"
    pub types: String,

    /// Path expression per column, keyed by column name
    /// (matched case-insensitively)
    pub paths: HashMap<String, String>,
}

impl TableConfig {
    pub fn column_names(&self) -> Vec<String> {
        split_list(&self.columns)
    }

    pub fn type_names(&self) -> Vec<String> {
        split_list(&self.types)
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_name_resolution_is_case_insensitive() {
        assert_eq!(ColumnType::from_name("BIGINT"), ColumnType::BigInt);
        assert_eq!(ColumnType::from_name("Double"), ColumnType::Double);
        assert_eq!(ColumnType::from_name(" boolean "), ColumnType::Boolean);
    }

    #[test]
    fn test_unknown_type_name_falls_back_to_string() {
        assert_eq!(ColumnType::from_name("varchar"), ColumnType::String);
        assert_eq!(ColumnType::from_name(""), ColumnType::String);
    }

    #[test]
    fn test_datum_serializes_untagged() {
        assert_eq!(serde_json::to_value(Datum::Null).unwrap(), json!(null));
        assert_eq!(serde_json::to_value(Datum::Int(7)).unwrap(), json!(7));
        assert_eq!(
            serde_json::to_value(Datum::Double(3.14)).unwrap(),
            json!(3.14)
        );
        assert_eq!(
            serde_json::to_value(Datum::String("x".to_string())).unwrap(),
            json!("x")
        );
    }

    #[test]
    fn test_row_serializes_as_plain_array() {
        let mut row = Row::filled_null(2);
        row.set(0, Datum::String("a1".to_string()));
        assert_eq!(serde_json::to_value(&row).unwrap(), json!(["a1", null]));
    }

    #[test]
    fn test_config_lists_split_and_trim() {
        let config: TableConfig = serde_json::from_value(json!({
            "columns": "request_id, keywords",
            "types": "string , int",
            "paths": {"request_id": "$.id", "keywords": "$.kw"}
        }))
        .unwrap();

        assert_eq!(config.column_names(), vec!["request_id", "keywords"]);
        assert_eq!(config.type_names(), vec!["string", "int"]);
    }
}
