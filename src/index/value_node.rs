use crate::core::types::Line;
use crate::index::line_store::LineStore;

/// One distinct value of a field key and every line it occurred on.
///
/// Example:
///   L1: level=error msg=hello
///   L2: level=error msg=failed
///   leaf: { value: "error", lines: [L1, L2] }
pub struct Leaf {
    pub value: Vec<u8>,    // Owned copy, the parsed line buffer gets reused
    pub lines: LineStore,  // Ingestion order, sorted by start offset
}

impl Leaf {
    pub fn new(value: &[u8], lines_capacity: usize) -> Self {
        Leaf {
            value: value.to_vec(),
            lines: LineStore::with_capacity(lines_capacity),
        }
    }

    /// Records `line` unless it is already the last one recorded
    /// (a line repeating the same key=value pair).
    pub fn add_line(&mut self, line: Line) {
        if self.lines.last().is_some_and(|last| last.start_offset == line.start_offset) {
            return;
        }
        self.lines.push(line);
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Sorted values of a single field key.
///
/// A flat sorted array: O(log n) lookups, O(n) inserts of new values.
/// Log fields are read-heavy with a low number of distinct values per key.
pub struct ValueNode {
    pub values: Vec<Leaf>,  // Sorted by value, no duplicates
    pub count: usize,       // Cached values.len()
    pub lines_capacity: usize,
}

impl ValueNode {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(values_capacity: usize, lines_capacity: usize) -> Self {
        ValueNode {
            values: Vec::with_capacity(values_capacity),
            count: 0,
            lines_capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Binary search by byte-lexicographic value.
    /// Returns the matching position and leaf, or the insertion position and `None`.
    pub fn binary_search(&self, value: &[u8]) -> (usize, Option<&Leaf>) {
        binary_search_leaves(&self.values, value)
    }

    /// Lookup-only variant, never inserts.
    pub fn get(&self, value: &[u8]) -> Option<&Leaf> {
        self.binary_search(value).1
    }

    /// Returns the leaf for `value`, inserting an empty one at its sorted
    /// position when the value has not been seen yet.
    pub fn find_or_create(&mut self, value: &[u8]) -> &mut Leaf {
        let (pos, found) = self.binary_search(value);
        if found.is_some() {
            return &mut self.values[pos];
        }
        self.insert_at(pos, value)
    }

    fn insert_at(&mut self, pos: usize, value: &[u8]) -> &mut Leaf {
        let leaf = Leaf::new(value, self.lines_capacity);
        if pos == self.count {
            self.values.push(leaf);
        } else {
            // Shifts the tail one slot to the right
            self.values.insert(pos, leaf);
        }
        self.count += 1;
        &mut self.values[pos]
    }

    /// Total lines across every value
    pub fn line_count(&self) -> usize {
        self.values.iter().map(Leaf::line_count).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Leaf> {
        self.values.iter()
    }
}

impl Default for ValueNode {
    fn default() -> Self {
        Self::new()
    }
}

pub fn binary_search_leaves<'a>(leaves: &'a [Leaf], value: &[u8]) -> (usize, Option<&'a Leaf>) {
    match leaves.binary_search_by(|leaf| leaf.value.as_slice().cmp(value)) {
        Ok(pos) => (pos, Some(&leaves[pos])),
        Err(pos) => (pos, None),
    }
}
