use std::borrow::Cow;
use std::fmt;

/// Byte range of one ingested line inside the raw buffer.
/// Lines are references into the buffer, the text itself is never copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line {
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Line {
    pub fn new(start_offset: usize, end_offset: usize) -> Self {
        Line { start_offset, end_offset }
    }

    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.end_offset == self.start_offset
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{i:{}}}", self.start_offset)
    }
}

/// A parsed `key=value` (or `{"key": "value"}`) pair.
///
/// The text parser borrows both halves from the line it was given, the JSON
/// parser owns the decoded value. Fields are transient: the index copies what
/// it keeps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field<'a> {
    pub key: Cow<'a, [u8]>,
    pub value: Cow<'a, [u8]>,
}

impl<'a> Field<'a> {
    pub fn new(key: impl Into<Cow<'a, [u8]>>, value: impl Into<Cow<'a, [u8]>>) -> Self {
        Field {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_owned(self) -> Field<'static> {
        Field {
            key: Cow::Owned(self.key.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

impl<'a> From<(&'a str, &'a str)> for Field<'a> {
    fn from((key, value): (&'a str, &'a str)) -> Self {
        Field::new(key.as_bytes(), value.as_bytes())
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{'{}':'{}'}}",
            String::from_utf8_lossy(&self.key),
            String::from_utf8_lossy(&self.value)
        )
    }
}
