use crate::core::types::{Field, Line};
use crate::index::field_index::FieldIndex;
use crate::index::line_store::{LineStore, binary_search_by_start};

/// Multi-field AND query over a `FieldIndex`.
/// Read-only: lookups never create keys or values.
pub struct QueryEngine<'a> {
    index: &'a FieldIndex,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a FieldIndex) -> Self {
        QueryEngine { index }
    }

    /// Lines matching every queried `key=value` pair.
    ///
    /// Any unknown key or value short-circuits to an empty result. With a
    /// single field the candidate list is returned as is, in ingestion order.
    pub fn find(&self, fields: &[Field<'_>]) -> Vec<Line> {
        let Some(candidates) = self.candidates(fields) else {
            return Vec::new();
        };

        match candidates.as_slice() {
            [] => Vec::new(),
            [only] => only.as_slice().to_vec(),
            _ => intersect(&candidates),
        }
    }

    /// Candidate line list per field, `None` when one of them cannot match.
    fn candidates(&self, fields: &[Field<'_>]) -> Option<Vec<&'a LineStore>> {
        let mut candidates = Vec::with_capacity(fields.len());
        for field in fields {
            let lines = self.index.lookup(field.key(), field.value())?;
            if lines.is_empty() {
                return None;
            }
            candidates.push(lines);
        }
        Some(candidates)
    }
}

/// Intersects sorted candidate lists by start offset.
///
/// The smallest list drives (first one on ties) and fixes the result order.
/// Every other list keeps a cursor over its unconsumed window; the cursor
/// only moves past a line once that line is an exact start offset match.
pub fn intersect(candidates: &[&LineStore]) -> Vec<Line> {
    let Some((driver_pos, driver)) = candidates.iter()
        .enumerate()
        .min_by_key(|(_, lines)| lines.len())
    else {
        return Vec::new();
    };

    let mut cursors = vec![0usize; candidates.len()];
    let mut result = Vec::with_capacity(driver.len());

    'lines: for line in driver.iter() {
        for (pos, lines) in candidates.iter().enumerate() {
            if pos == driver_pos {
                continue;
            }
            let window = &lines.as_slice()[cursors[pos]..];
            match binary_search_by_start(window, line.start_offset) {
                (found, Some(matched)) if matched.start_offset == line.start_offset => {
                    cursors[pos] += found + 1;
                }
                _ => continue 'lines,
            }
        }
        result.push(*line);
    }

    result
}
