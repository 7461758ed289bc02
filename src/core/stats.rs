use std::fmt;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-key index statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    pub key: String,
    pub line_count: usize,           // Lines across every value of the key
    pub distinct_value_count: usize,
}

/// Diagnostic snapshot of the field index.
/// `keys` is sorted by line count (descending), then key name (ascending).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_keys: usize,
    pub keys: Vec<KeyStats>,
}

impl IndexStats {
    pub fn get(&self, key: &str) -> Option<&KeyStats> {
        self.keys.iter().find(|k| k.key == key)
    }
}

impl fmt::Display for KeyStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.key)?;
        writeln!(f, "{{Lines:{} Values:{}}}", self.line_count, self.distinct_value_count)
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Keys: {}", self.total_keys)?;
        writeln!(f)?;
        for key in &self.keys {
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

/// Raw buffer and line counters of an ingestion session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub buffer_size: usize,
    pub buffer_capacity: usize,
    pub line_count: usize,
    pub total_keys: usize,
    pub started_at: DateTime<Utc>,
}

impl SessionStats {
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Buffer Size: {}/{}",
            byte_count_si(self.buffer_size as u64),
            byte_count_si(self.buffer_capacity as u64)
        )?;
        writeln!(f, "Line Count: {}", self.line_count)?;
        write!(f, "Uptime: {}", format_uptime(self.uptime_secs()))
    }
}

/// Everything `:stats` reports, as one serializable snapshot
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub session: SessionStats,
    pub format: Option<String>,
    pub index: IndexStats,
}

/// `42s`, `3m05s`, `2h00m07s`
pub fn format_uptime(secs: i64) -> String {
    let secs = secs.max(0);
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Formats a byte count with SI (power of 1000) units, e.g. `1.5 MB`.
pub fn byte_count_si(bytes: u64) -> String {
    const UNIT: u64 = 1000;
    const PREFIXES: [char; 6] = ['k', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_si_byte_counts() {
        assert_eq!(byte_count_si(0), "0 B");
        assert_eq!(byte_count_si(999), "999 B");
        assert_eq!(byte_count_si(1000), "1.0 kB");
        assert_eq!(byte_count_si(1_500_000), "1.5 MB");
        assert_eq!(byte_count_si(2_000_000_000), "2.0 GB");
    }

    #[test]
    fn renders_index_stats() {
        let stats = IndexStats {
            total_keys: 1,
            keys: vec![KeyStats {
                key: "level".to_string(),
                line_count: 3,
                distinct_value_count: 2,
            }],
        };
        assert_eq!(stats.to_string(), "Keys: 1\n\nlevel\n{Lines:3 Values:2}\n");
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(185), "3m05s");
        assert_eq!(format_uptime(7207), "2h00m07s");
        assert_eq!(format_uptime(-3), "0s");
    }

    #[test]
    fn session_stats_render_uptime_since_start() {
        let stats = SessionStats {
            buffer_size: 1_500,
            buffer_capacity: 1_000_000,
            line_count: 12,
            total_keys: 3,
            started_at: Utc::now() - chrono::Duration::seconds(125),
        };

        assert!(stats.uptime_secs() >= 125);
        let text = stats.to_string();
        assert!(text.starts_with("Buffer Size: 1.5 kB/1.0 MB\nLine Count: 12\nUptime: 2m"), "{}", text);
    }
}
