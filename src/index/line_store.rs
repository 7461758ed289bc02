use std::ops::Index;
use crate::core::types::Line;

/// Append-only list of lines, sorted by start offset.
/// Note: lines arrive in buffer order, so pushing keeps the list sorted
pub struct LineStore {
    pub lines: Vec<Line>,
}

impl LineStore {
    pub fn new() -> Self {
        LineStore { lines: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        LineStore {
            lines: Vec::with_capacity(capacity),
        }
    }

    /// Appends a line. Callers must push in increasing start offset order.
    pub fn push(&mut self, line: Line) {
        debug_assert!(
            self.lines.last().is_none_or(|last| last.start_offset < line.start_offset),
            "line store must stay sorted by start offset"
        );
        self.lines.push(line);
    }

    pub fn last(&self) -> Option<&Line> {
        self.lines.last()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn as_slice(&self) -> &[Line] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    /// Last `n` lines in buffer order
    pub fn tail(&self, n: usize) -> &[Line] {
        let start = self.lines.len().saturating_sub(n);
        &self.lines[start..]
    }

    /// Binary search by start offset.
    /// Returns the index of the matching line, or the index at which a line
    /// starting at `offset` would be inserted, plus the line when it matched.
    pub fn binary_search_by_start(&self, offset: usize) -> (usize, Option<&Line>) {
        binary_search_by_start(&self.lines, offset)
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for LineStore {
    type Output = Line;

    fn index(&self, index: usize) -> &Line {
        &self.lines[index]
    }
}

impl From<Vec<Line>> for LineStore {
    fn from(lines: Vec<Line>) -> Self {
        LineStore { lines }
    }
}

impl<'a> IntoIterator for &'a LineStore {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Slice form of [`LineStore::binary_search_by_start`], used on the
/// partially consumed windows of the intersection query.
pub fn binary_search_by_start(lines: &[Line], offset: usize) -> (usize, Option<&Line>) {
    match lines.binary_search_by_key(&offset, |line| line.start_offset) {
        Ok(pos) => (pos, Some(&lines[pos])),
        Err(pos) => (pos, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(starts: &[usize]) -> LineStore {
        LineStore::from(starts.iter().map(|&s| Line::new(s, s + 1)).collect::<Vec<_>>())
    }

    #[test]
    fn empty_store_reports_insertion_at_zero() {
        let lines = store(&[]);
        assert_eq!(lines.binary_search_by_start(1), (0, None));
    }

    #[test]
    fn single_line_found_and_not_found() {
        let lines = store(&[2]);
        assert_eq!(lines.binary_search_by_start(2), (0, Some(&Line::new(2, 3))));
        assert_eq!(lines.binary_search_by_start(1), (0, None));
        assert_eq!(lines.binary_search_by_start(3), (1, None));
    }

    #[test]
    fn finds_first_middle_and_last() {
        let lines = store(&[1, 2, 3]);
        assert_eq!(lines.binary_search_by_start(1).0, 0);
        assert_eq!(lines.binary_search_by_start(2).0, 1);
        assert_eq!(lines.binary_search_by_start(3), (2, Some(&Line::new(3, 4))));
    }

    #[test]
    fn missing_offsets_resolve_to_insertion_points() {
        let lines = store(&[10, 20, 30]);
        assert_eq!(lines.binary_search_by_start(5), (0, None));
        assert_eq!(lines.binary_search_by_start(15), (1, None));
        assert_eq!(lines.binary_search_by_start(25), (2, None));
        assert_eq!(lines.binary_search_by_start(35), (3, None));
    }

    #[test]
    fn tail_is_clamped() {
        let lines = store(&[1, 2, 3]);
        assert_eq!(lines.tail(2).len(), 2);
        assert_eq!(lines.tail(2)[0].start_offset, 2);
        assert_eq!(lines.tail(10).len(), 3);
    }
}
