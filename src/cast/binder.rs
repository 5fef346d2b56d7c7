use crate::cast::types::{ColumnType, TableConfig};
use crate::path::{CompiledPath, PathError};
use std::collections::HashMap;
use thiserror::Error;

/// A table definition the binder refused to turn into a usable schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("table definition must include a path for every column; missing path for column '{column}'")]
    MissingPath { column: String },

    #[error("failed to compile path expression for column '{column}'")]
    InvalidPath {
        column: String,
        #[source]
        source: PathError,
    },

    #[error("all paths must point to exactly one item; the following path is ambiguous: {path}")]
    AmbiguousPath { path: String },
}

/// One column binding: name, declared type and compiled path.
/// Immutable once the schema is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    name: String,
    column_type: ColumnType,
    path: CompiledPath,
}

impl ColumnSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn path(&self) -> &CompiledPath {
        &self.path
    }
}

/// An ordered, immutable set of column bindings
///
/// Built once at setup time and read-only afterwards, so a single
/// schema can be shared across extractor instances (wrap it in an
/// `Arc` to hand one copy to each worker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Bind each declared column to a compiled path and a declared type.
    ///
    /// `column_names` and `column_type_names` are parallel lists;
    /// unequal lengths are a caller bug and panic rather than
    /// returning an error. Path lookup and type-name resolution are
    /// both case-insensitive; unrecognized type names fall back to
    /// `string`.
    ///
    /// Binding fails if any column is missing a path, any path fails
    /// to compile, or any path could match more than one node. A
    /// column can hold only one scalar; silently picking the first
    /// match would hide data-modeling errors.
    pub fn bind(
        column_names: &[String],
        column_type_names: &[String],
        path_config: &HashMap<String, String>,
    ) -> Result<TableSchema, BindError> {
        assert_eq!(
            column_names.len(),
            column_type_names.len(),
            "column names and column types must be parallel lists"
        );

        let mut columns = Vec::with_capacity(column_names.len());

        for (name, type_name) in column_names.iter().zip(column_type_names) {
            let raw_path = path_config
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, path)| path.as_str())
                .ok_or_else(|| BindError::MissingPath {
                    column: name.clone(),
                })?;

            let path =
                CompiledPath::compile(raw_path).map_err(|source| BindError::InvalidPath {
                    column: name.clone(),
                    source,
                })?;

            if !path.is_definite() {
                return Err(BindError::AmbiguousPath {
                    path: path.raw().to_string(),
                });
            }

            columns.push(ColumnSchema {
                name: name.clone(),
                column_type: ColumnType::from_name(type_name),
                path,
            });
        }

        Ok(TableSchema { columns })
    }

    /// Bind from a declarative `TableConfig`.
    pub fn bind_config(config: &TableConfig) -> Result<TableSchema, BindError> {
        TableSchema::bind(
            &config.column_names(),
            &config.type_names(),
            &config.paths,
        )
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Number of columns, and therefore the width of every row.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn paths(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bind_is_deterministic() {
        let columns = names(&["id", "score"]);
        let types = names(&["string", "double"]);
        let config = paths(&[("id", "$.id"), ("score", "$.score")]);

        let first = TableSchema::bind(&columns, &types, &config).unwrap();
        let second = TableSchema::bind(&columns, &types, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.width(), 2);
        assert_eq!(first.columns()[1].column_type(), ColumnType::Double);
    }

    #[test]
    fn test_path_lookup_is_case_insensitive() {
        let schema = TableSchema::bind(
            &names(&["field1"]),
            &names(&["string"]),
            &paths(&[("Field1", "$.field1")]),
        )
        .unwrap();

        assert_eq!(schema.columns()[0].name(), "field1");
        assert_eq!(schema.columns()[0].path().raw(), "$.field1");
    }

    #[test]
    fn test_missing_path_names_the_column() {
        let err = TableSchema::bind(
            &names(&["id", "score"]),
            &names(&["string", "double"]),
            &paths(&[("id", "$.id")]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            BindError::MissingPath {
                column: "score".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_path_is_rejected() {
        let err = TableSchema::bind(
            &names(&["id"]),
            &names(&["string"]),
            &paths(&[("id", "id.no.root")]),
        )
        .unwrap_err();

        assert!(matches!(err, BindError::InvalidPath { ref column, .. } if column == "id"));
    }

    #[test]
    fn test_ambiguous_paths_are_rejected() {
        for expr in ["$.items[*].id", "$..id", "$.items[?(@.id)]", "$.a[0:2]"] {
            let err = TableSchema::bind(
                &names(&["id"]),
                &names(&["string"]),
                &paths(&[("id", expr)]),
            )
            .unwrap_err();

            assert!(
                matches!(err, BindError::AmbiguousPath { .. }),
                "{} should be ambiguous",
                expr
            );
        }
    }

    #[test]
    fn test_unrecognized_type_defaults_to_string() {
        let schema = TableSchema::bind(
            &names(&["id"]),
            &names(&["varchar(64)"]),
            &paths(&[("id", "$.id")]),
        )
        .unwrap();

        assert_eq!(schema.columns()[0].column_type(), ColumnType::String);
    }

    #[test]
    #[should_panic(expected = "parallel lists")]
    fn test_mismatched_list_lengths_panic() {
        let _ = TableSchema::bind(
            &names(&["id", "score"]),
            &names(&["string"]),
            &paths(&[("id", "$.id")]),
        );
    }

    #[test]
    fn test_bind_config_splits_the_host_lists() {
        let config = TableConfig {
            columns: "request_id, keywords".to_string(),
            types: "string, string".to_string(),
            paths: paths(&[
                ("request_id", "$.search_result.requestid"),
                ("keywords", "$['param.keywords']"),
            ]),
        };

        let schema = TableSchema::bind_config(&config).unwrap();
        assert_eq!(schema.width(), 2);
        assert_eq!(schema.columns()[0].name(), "request_id");
    }
}
