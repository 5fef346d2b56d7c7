use crate::cast::binder::TableSchema;
use crate::cast::types::Row;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::Write;
use std::sync::Arc;

/// Writes rows as JSON Lines, one object per row keyed by column name
pub struct RowWriter<W: Write> {
    schema: Arc<TableSchema>,
    writer: W,
}

impl<W: Write> RowWriter<W> {
    pub fn new(schema: Arc<TableSchema>, writer: W) -> Self {
        RowWriter { schema, writer }
    }

    /// Write one row. Nulls are emitted explicitly so every line has
    /// the full column set in schema order.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        let mut record = Map::new();
        for (column, datum) in self.schema.columns().iter().zip(row.values()) {
            let value = serde_json::to_value(datum).context("Failed to serialize row value")?;
            record.insert(column.name().to_string(), value);
        }

        let json = serde_json::to_string(&Value::Object(record))
            .context("Failed to serialize row")?;
        writeln!(self.writer, "{}", json).context("Failed to write row")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::extractor::RowExtractor;
    use serde_json::json;
    use std::collections::HashMap;

    fn schema() -> Arc<TableSchema> {
        let names = vec!["id".to_string(), "count".to_string()];
        let types = vec!["string".to_string(), "int".to_string()];
        let paths: HashMap<String, String> = [
            ("id".to_string(), "$.id".to_string()),
            ("count".to_string(), "$.count".to_string()),
        ]
        .into_iter()
        .collect();

        Arc::new(TableSchema::bind(&names, &types, &paths).unwrap())
    }

    #[test]
    fn test_rows_write_as_jsonl_objects() {
        let schema = schema();
        let extractor = RowExtractor::new(schema.clone());

        let mut buffer = Vec::new();
        let mut writer = RowWriter::new(schema, &mut buffer);

        let row = extractor
            .extract(r#"{"id":"a1","count":3}"#)
            .unwrap()
            .unwrap();
        writer.write_row(&row).unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let parsed: Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed, json!({"id": "a1", "count": 3}));
    }

    #[test]
    fn test_nulls_are_explicit() {
        let schema = schema();
        let extractor = RowExtractor::new(schema.clone());

        let mut buffer = Vec::new();
        let mut writer = RowWriter::new(schema, &mut buffer);

        let row = extractor.extract(r#"{"id":"a1"}"#).unwrap().unwrap();
        writer.write_row(&row).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let parsed: Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed, json!({"id": "a1", "count": null}));
    }
}
