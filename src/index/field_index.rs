use std::collections::HashMap;
use tracing::debug;
use crate::core::config::Config;
use crate::core::stats::{IndexStats, KeyStats};
use crate::core::types::{Field, Line};
use crate::index::Indexer;
use crate::index::line_store::LineStore;
use crate::index::value_node::ValueNode;
use crate::query::engine::QueryEngine;

/// Field index: maps field keys to their sorted values.
///
/// Keys are few and looked up on every line, so they live in a hash map
/// pointing at their node; the values under a key are binary searched
/// inside the `ValueNode`.
pub struct FieldIndex {
    pub key_map: HashMap<Vec<u8>, usize>, // Key -> index in nodes
    pub nodes: Vec<ValueNode>,
    pub values_capacity: usize,           // Capacity hint for new value nodes
    pub lines_capacity: usize,            // Capacity hint for new leaves
}

impl FieldIndex {
    pub fn new() -> Self {
        FieldIndex {
            key_map: HashMap::new(),
            nodes: Vec::new(),
            values_capacity: 0,
            lines_capacity: 0,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        FieldIndex {
            key_map: HashMap::with_capacity(config.key_capacity),
            nodes: Vec::with_capacity(config.key_capacity),
            values_capacity: config.values_capacity,
            lines_capacity: config.lines_per_value_capacity,
        }
    }

    pub fn node(&self, key: &[u8]) -> Option<&ValueNode> {
        self.key_map.get(key).map(|&slot| &self.nodes[slot])
    }

    /// Lines recorded for `key=value`, without creating anything.
    pub fn lookup(&self, key: &[u8], value: &[u8]) -> Option<&LineStore> {
        self.node(key)?.get(value).map(|leaf| &leaf.lines)
    }

    /// Iterates keys with their nodes, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &ValueNode)> {
        self.key_map.iter().map(|(key, &slot)| (key.as_slice(), &self.nodes[slot]))
    }

    fn node_mut(&mut self, key: &[u8]) -> &mut ValueNode {
        let slot = match self.key_map.get(key) {
            Some(&slot) => slot,
            None => {
                debug!(key = %String::from_utf8_lossy(key), "new field key");
                let slot = self.nodes.len();
                self.nodes.push(ValueNode::with_capacity(self.values_capacity, self.lines_capacity));
                self.key_map.insert(key.to_vec(), slot);
                slot
            }
        };
        &mut self.nodes[slot]
    }
}

impl Default for FieldIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl Indexer for FieldIndex {
    fn index(&mut self, fields: &[Field<'_>], base_offset: usize, line_length: usize) {
        let line = Line::new(base_offset, base_offset + line_length);
        for field in fields {
            self.node_mut(field.key())
                .find_or_create(field.value())
                .add_line(line);
        }
    }

    fn find(&self, fields: &[Field<'_>]) -> Vec<Line> {
        QueryEngine::new(self).find(fields)
    }

    fn stats(&self) -> IndexStats {
        let mut keys: Vec<(&[u8], usize, usize)> = self.iter()
            .map(|(key, node)| (key, node.line_count(), node.len()))
            .collect();

        // Raw bytes break ties, lossy names of distinct keys may collide
        keys.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        IndexStats {
            total_keys: self.key_map.len(),
            keys: keys.into_iter()
                .map(|(key, line_count, distinct_value_count)| KeyStats {
                    key: String::from_utf8_lossy(key).into_owned(),
                    line_count,
                    distinct_value_count,
                })
                .collect(),
        }
    }

    fn key_count(&self) -> usize {
        self.key_map.len()
    }
}
