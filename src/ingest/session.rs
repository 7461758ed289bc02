use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::info;
use crate::core::config::Config;
use crate::core::stats::{IndexStats, SessionStats, StatsReport};
use crate::core::types::{Field, Line};
use crate::index::Indexer;
use crate::index::field_index::FieldIndex;
use crate::index::line_store::LineStore;
use crate::ingest::buffer::RawBuffer;
use crate::parse::strategy::ParseStrategy;

/// Session shared between the ingestion task and the presentation layer.
/// Indexing and queries take the same lock, so they never overlap.
pub type SharedSession = Arc<Mutex<Session>>;

/// Everything ingested from one child process: raw text, line history,
/// field index and the parse strategy picked from the first line.
pub struct Session {
    pub buffer: RawBuffer,
    pub lines: LineStore,
    pub index: Box<dyn Indexer>,
    pub strategy: Option<ParseStrategy>,
    pub last_fields: Vec<Field<'static>>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_indexer(config, Box::new(FieldIndex::with_config(config)))
    }

    pub fn with_indexer(config: &Config, index: Box<dyn Indexer>) -> Self {
        Session {
            buffer: RawBuffer::with_capacity(config.buffer_capacity),
            lines: LineStore::with_capacity(config.line_store_capacity),
            index,
            strategy: config.format,
            last_fields: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Parses, indexes and stores one line (trailing newline included).
    pub fn ingest(&mut self, text: &[u8]) -> Line {
        // Every line occupies at least one byte, start offsets stay unique
        let text: &[u8] = if text.is_empty() { b"\n" } else { text };

        let strategy = match self.strategy {
            Some(strategy) => strategy,
            None => {
                let strategy = ParseStrategy::detect(text);
                info!(strategy = %strategy, "parse strategy selected");
                self.strategy = Some(strategy);
                strategy
            }
        };

        let fields = strategy.parse(text);
        self.index.index(&fields, self.buffer.len(), text.len());
        self.last_fields = fields.into_iter().map(Field::into_owned).collect();

        let line = self.buffer.append(text);
        self.lines.push(line);
        line
    }

    pub fn find(&self, fields: &[Field<'_>]) -> Vec<Line> {
        if fields.is_empty() {
            return Vec::new();
        }
        self.index.find(fields)
    }

    /// Raw text of `line`, as ingested.
    pub fn resolve(&self, line: &Line) -> Option<&[u8]> {
        self.buffer.slice(line)
    }

    /// Last `n` ingested lines, oldest first
    pub fn tail(&self, n: usize) -> &[Line] {
        self.lines.tail(n)
    }

    pub fn last_fields(&self) -> &[Field<'static>] {
        &self.last_fields
    }

    pub fn strategy(&self) -> Option<ParseStrategy> {
        self.strategy
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    pub fn session_stats(&self) -> SessionStats {
        SessionStats {
            buffer_size: self.buffer.len(),
            buffer_capacity: self.buffer.capacity(),
            line_count: self.lines.len(),
            total_keys: self.index.key_count(),
            started_at: self.started_at,
        }
    }

    pub fn report(&self) -> StatsReport {
        StatsReport {
            session: self.session_stats(),
            format: self.strategy.map(|strategy| strategy.name().to_string()),
            index: self.stats(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
