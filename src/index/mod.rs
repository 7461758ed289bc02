pub mod line_store;
pub mod value_node;
pub mod field_index;

use crate::core::stats::IndexStats;
use crate::core::types::{Field, Line};

/// Field-key → value → lines index.
/// Single writer: callers serialize `index` against `find`/`stats`.
pub trait Indexer: Send {
    /// Indexes every field of one ingested line spanning
    /// `[base_offset, base_offset + line_length)` in the raw buffer.
    fn index(&mut self, fields: &[Field<'_>], base_offset: usize, line_length: usize);

    /// Lines matching every `key=value` of `fields` (AND).
    fn find(&self, fields: &[Field<'_>]) -> Vec<Line>;

    fn stats(&self) -> IndexStats;

    fn key_count(&self) -> usize;
}
