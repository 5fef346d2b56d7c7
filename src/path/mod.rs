//! JSONPath-subset expressions for addressing a single scalar leaf
//!
//! Expressions are compiled once at bind time and evaluated per record.
//! Only definite paths (plain key and index navigation) can be bound to
//! a column; wildcard, recursive-descent, union, slice and filter forms
//! are recognized by the compiler solely so the binder can reject them.

pub mod compile;
pub mod eval;

pub use compile::{CompiledPath, PathError, Segment};
