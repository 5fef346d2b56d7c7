//! JSON casting - pour semi-structured records into fixed-schema rows
//!
//! Two cooperating pieces, built once per table and reused across a
//! stream of records:
//!
//! - the binder (`TableSchema::bind`) resolves every declared column
//!   to a compiled, definite path and a declared type at setup time,
//!   failing fast on missing, invalid or ambiguous paths;
//! - the extractor (`RowExtractor`) turns one JSON document into one
//!   ordered row of typed values, nulling out columns whose paths do
//!   not resolve and dropping records that do not parse.

pub mod binder;
pub mod extractor;
pub mod types;
pub mod writer;

pub use binder::{BindError, ColumnSchema, TableSchema};
pub use extractor::{CoercionError, RowExtractor};
pub use types::{ColumnType, Datum, Row, TableConfig};
pub use writer::RowWriter;
