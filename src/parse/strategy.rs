use std::fmt;
use serde_json::Value;
use crate::core::types::Field;

/// How ingested lines are split into fields.
///
/// Chosen once per session from the first line and kept for every
/// following line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// `{"level": "error", "code": 500}`
    Json,
    /// `level=error code=500 msg="connection reset"`
    Text,
}

impl ParseStrategy {
    /// A line starting with `{` selects JSON, anything else text.
    pub fn detect(first_line: &[u8]) -> Self {
        match first_line.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => ParseStrategy::Json,
            _ => ParseStrategy::Text,
        }
    }

    pub fn parse<'a>(&self, line: &'a [u8]) -> Vec<Field<'a>> {
        match self {
            ParseStrategy::Json => parse_json(line),
            ParseStrategy::Text => parse_text(line),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParseStrategy::Json => "json",
            ParseStrategy::Text => "text",
        }
    }
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-level members of a JSON object, in line order. Strings index their
/// decoded text, every other value its compact JSON form. Anything but an
/// object yields no fields.
fn parse_json(line: &[u8]) -> Vec<Field<'static>> {
    let Ok(Value::Object(members)) = serde_json::from_slice::<Value>(line) else {
        return Vec::new();
    };

    members.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text.into_bytes(),
                other => other.to_string().into_bytes(),
            };
            Field::new(key.into_bytes(), value)
        })
        .collect()
}

/// logfmt-style `key=value` tokens separated by whitespace.
/// Tokens without `=` or with an empty key are skipped.
fn parse_text(line: &[u8]) -> Vec<Field<'_>> {
    let mut fields = Vec::new();
    let len = line.len();
    let mut i = 0;

    while i < len {
        if line[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let key_start = i;
        while i < len && line[i] != b'=' && !line[i].is_ascii_whitespace() {
            i += 1;
        }
        if i == len || line[i] != b'=' {
            continue;
        }
        let key = &line[key_start..i];
        i += 1;

        let value = match quoted_len(&line[i..]) {
            Some(quoted) => {
                let value = &line[i + 1..i + 1 + quoted];
                i += quoted + 2;
                value
            }
            None => {
                let value_start = i;
                while i < len && !line[i].is_ascii_whitespace() {
                    i += 1;
                }
                &line[value_start..i]
            }
        };

        if !key.is_empty() {
            fields.push(Field::new(key, value));
        }
    }

    fields
}

/// Length of the quoted text when `rest` starts with a terminated `"..."`.
fn quoted_len(rest: &[u8]) -> Option<usize> {
    if rest.first() != Some(&b'"') {
        return None;
    }
    rest[1..].iter().position(|&b| b == b'"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(fields: &[Field<'_>]) -> Vec<(String, String)> {
        fields.iter()
            .map(|f| {
                (
                    String::from_utf8_lossy(f.key()).into_owned(),
                    String::from_utf8_lossy(f.value()).into_owned(),
                )
            })
            .collect()
    }

    fn expected(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn detects_strategy_from_first_byte() {
        assert_eq!(ParseStrategy::detect(b"{\"a\":1}\n"), ParseStrategy::Json);
        assert_eq!(ParseStrategy::detect(b"  {\"a\":1}"), ParseStrategy::Json);
        assert_eq!(ParseStrategy::detect(b"level=info\n"), ParseStrategy::Text);
        assert_eq!(ParseStrategy::detect(b""), ParseStrategy::Text);
    }

    #[test]
    fn text_includes_last_field_of_the_line() {
        let fields = ParseStrategy::Text.parse(b"level=info msg=a\n");
        assert_eq!(pairs(&fields), expected(&[("level", "info"), ("msg", "a")]));

        let fields = ParseStrategy::Text.parse(b"level=info msg=a");
        assert_eq!(pairs(&fields), expected(&[("level", "info"), ("msg", "a")]));
    }

    #[test]
    fn text_handles_quotes_and_bare_words() {
        let fields = ParseStrategy::Text.parse(b"ts=1 starting msg=\"hello world\" =x empty= \n");
        assert_eq!(
            pairs(&fields),
            expected(&[("ts", "1"), ("msg", "hello world"), ("empty", "")])
        );
    }

    #[test]
    fn text_keeps_unterminated_quote_as_plain_value() {
        let fields = ParseStrategy::Text.parse(b"msg=\"oops rest=1");
        assert_eq!(pairs(&fields), expected(&[("msg", "\"oops"), ("rest", "1")]));
    }

    #[test]
    fn text_fields_borrow_the_line() {
        let line = b"level=warn".to_vec();
        let fields = ParseStrategy::Text.parse(&line);
        assert!(matches!(fields[0].value, std::borrow::Cow::Borrowed(_)));
    }

    #[test]
    fn json_indexes_strings_and_scalars() {
        let line = br#"{"level":"error","code":500,"ok":false,"tags":["a"],"none":null}"#;
        let mut fields = pairs(&ParseStrategy::Json.parse(line));
        fields.sort();
        assert_eq!(
            fields,
            expected(&[
                ("code", "500"),
                ("level", "error"),
                ("none", "null"),
                ("ok", "false"),
                ("tags", "[\"a\"]"),
            ])
        );
    }

    #[test]
    fn json_members_keep_line_order() {
        let fields = ParseStrategy::Json.parse(br#"{"ts":"12:00","level":"warn","code":503}"#);
        assert_eq!(
            pairs(&fields),
            expected(&[("ts", "12:00"), ("level", "warn"), ("code", "503")])
        );
    }

    #[test]
    fn json_ignores_non_objects_and_garbage() {
        assert!(ParseStrategy::Json.parse(b"[1,2]\n").is_empty());
        assert!(ParseStrategy::Json.parse(b"not json\n").is_empty());
        assert!(ParseStrategy::Json.parse(b"{\"a\":").is_empty());
    }
}
