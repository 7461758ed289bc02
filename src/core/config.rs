use crate::parse::strategy::ParseStrategy;

#[derive(Debug, Clone)]
pub struct Config {
    // Ingestion
    pub max_line_size: usize,               // Longer lines are truncated
    pub buffer_capacity: usize,             // Initial raw buffer size in bytes
    pub line_store_capacity: usize,         // Initial global line store size
    pub max_consecutive_read_errors: usize, // Read loop gives up after this many
    pub format: Option<ParseStrategy>,      // None = detect from the first line

    // Index capacity hints
    pub key_capacity: usize,
    pub values_capacity: usize,
    pub lines_per_value_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_line_size: 1_000_000,          // 1MB per line
            buffer_capacity: 1_000_000,        // 1MB raw text up front
            line_store_capacity: 100_000,
            max_consecutive_read_errors: 16,
            format: None,

            key_capacity: 1_000,               // 1k distinct field keys
            values_capacity: 10_000,           // distinct values per key
            lines_per_value_capacity: 100,
        }
    }
}
