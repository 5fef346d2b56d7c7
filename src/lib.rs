//! # Ingot - JSON Field Extraction Toolkit
//!
//! A library for casting semi-structured JSON records into fixed-schema
//! rows of typed scalar values, driven by per-column path expressions.
//!
//! ## Modules
//!
//! - **cast**: bind a table schema and extract typed rows per record
//! - **path**: the JSONPath subset used to address column values
//!
//! ## Quick Start
//!
//! ### Binding and extraction
//!
//! ```rust
//! use ingot::{RowExtractor, TableSchema};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let columns = vec!["id".to_string(), "score".to_string()];
//! let types = vec!["string".to_string(), "double".to_string()];
//! let mut paths = HashMap::new();
//! paths.insert("id".to_string(), "$.id".to_string());
//! paths.insert("score".to_string(), "$.result.score".to_string());
//!
//! let schema = Arc::new(TableSchema::bind(&columns, &types, &paths)?);
//! let extractor = RowExtractor::new(schema);
//!
//! let row = extractor
//!     .extract(r#"{"id":"a1","result":{"score":"3.14"}}"#)?
//!     .expect("record parses");
//!
//! // row = ["a1", 3.14] - the string source coerced to a double
//! # Ok(())
//! # }
//! ```
//!
//! ### Streaming records
//!
//! ```rust
//! use ingot::{cast_json, RowWriter, TableConfig, TableSchema};
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config: TableConfig = serde_json::from_str(
//!     r#"{"columns":"id,count","types":"string,int","paths":{"id":"$.id","count":"$.n"}}"#,
//! )?;
//! let schema = Arc::new(TableSchema::bind_config(&config)?);
//!
//! let input = "{\"id\":\"a\",\"n\":1}\nnot json\n{\"id\":\"b\"}\n";
//! let mut output = Vec::new();
//! let mut writer = RowWriter::new(schema.clone(), &mut output);
//!
//! let rows = cast_json(input.as_bytes(), schema, &mut writer)?;
//! assert_eq!(rows, 2); // the malformed line is dropped, not fatal
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;

pub mod cast;
pub mod path;

// Re-export commonly used types for convenience
pub use cast::{
    BindError, CoercionError, ColumnSchema, ColumnType, Datum, Row, RowExtractor, RowWriter,
    TableConfig, TableSchema,
};
pub use path::{CompiledPath, PathError, Segment};

/// Main entry point: cast a stream of line-delimited JSON records into
/// rows and write them out. Unparseable records are dropped per the
/// whole-record-null policy; coercion failures abort with context.
/// Returns the number of rows written.
pub fn cast_json<R: BufRead, W: Write>(
    reader: R,
    schema: Arc<TableSchema>,
    writer: &mut RowWriter<W>,
) -> Result<u64> {
    let extractor = RowExtractor::new(schema);
    let mut rows = 0u64;

    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row = extractor
            .extract(line)
            .context("Failed to coerce record")?;

        if let Some(row) = row {
            writer.write_row(&row)?;
            rows += 1;
        }
    }

    Ok(rows)
}
