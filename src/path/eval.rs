use crate::path::compile::{CompiledPath, Segment};
use serde_json::Value;

impl CompiledPath {
    /// Walk the document from the root, returning the single node this
    /// path addresses, or `None` if any step misses.
    ///
    /// Document object keys are expected to be lowercase already (the
    /// extractor normalizes them at parse time). Indefinite segments
    /// never resolve; the binder rejects such paths before they reach
    /// evaluation.
    pub fn eval<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut node = doc;
        for segment in self.segments() {
            node = match segment {
                Segment::Key(key) => node.as_object()?.get(key)?,
                Segment::Index(index) => node.as_array()?.get(*index)?,
                _ => return None,
            };
        }
        Some(node)
    }
}
