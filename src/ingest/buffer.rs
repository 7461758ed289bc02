use bytes::BytesMut;
use crate::core::types::Line;

/// Append-only store of the raw ingested text.
/// Lines handed out by `append` stay valid for the whole session.
pub struct RawBuffer {
    pub data: BytesMut,
}

impl RawBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        RawBuffer {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Appends `bytes` and returns the range they now occupy.
    pub fn append(&mut self, bytes: &[u8]) -> Line {
        let start = self.data.len();
        self.data.extend_from_slice(bytes);
        Line::new(start, self.data.len())
    }

    /// Text of `line`, or `None` if it does not belong to this buffer.
    pub fn slice(&self, line: &Line) -> Option<&[u8]> {
        self.data.get(line.start_offset..line.end_offset)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
}

impl Default for RawBuffer {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
