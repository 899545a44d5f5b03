//! Metadata header handling.
//!
//! A file may open with a header block delimited by lines consisting solely
//! of `---`. The header holds `key: value` lines; values are plain or quoted
//! strings, numbers, booleans, `null` or inline `[a, b]` lists. Lines
//! starting with `#` are comments.

use serde_json::{Map, Number, Value};
use thiserror::Error;

const DELIMITER: &str = "---";

/// A header that cannot be split off or does not validate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("header opened on line 1 is never closed")]
    Unclosed,
    #[error("line {line}: expected 'key: value', found {text:?}")]
    MalformedLine { line: u32, text: String },
    #[error("header is missing the string field '{0}'")]
    MissingDiscriminator(String),
    #[error("file has no '---' header")]
    Missing,
}

/// A file cut into its header and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceParts<'a> {
    /// The header as a JSON object, if the file has one.
    pub header: Option<Value>,
    pub body: &'a str,
    /// Lines before the body.
    pub body_line_offset: u32,
    /// Bytes before the body.
    pub body_byte_offset: u32,
}

/// Split `text` into header and body.
///
/// Without an opening delimiter on the first line the whole text is the body.
pub fn split_header(text: &str) -> Result<SourceParts<'_>, HeaderError> {
    let mut lines = text.split_inclusive('\n');
    let opens = lines.next().map_or(false, |first| is_delimiter(first));
    if !opens {
        return Ok(SourceParts {
            header: None,
            body: text,
            body_line_offset: 0,
            body_byte_offset: 0,
        });
    }

    let mut consumed = text.split_inclusive('\n').next().map_or(0, str::len);
    let mut header_lines = Vec::new();
    let mut closed = false;
    for line in lines {
        consumed += line.len();
        if is_delimiter(line) {
            closed = true;
            break;
        }
        header_lines.push(line);
    }
    if !closed {
        return Err(HeaderError::Unclosed);
    }

    let header = parse_header(&header_lines)?;
    Ok(SourceParts {
        header: Some(header),
        body: &text[consumed..],
        body_line_offset: header_lines.len() as u32 + 2,
        body_byte_offset: consumed as u32,
    })
}

/// Require a string `discriminator` field in a header object.
pub fn validate_header(header: &Value, discriminator: &str) -> Result<(), HeaderError> {
    match header.get(discriminator) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(HeaderError::MissingDiscriminator(discriminator.to_string())),
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

fn parse_header(lines: &[&str]) -> Result<Value, HeaderError> {
    let mut map = Map::new();
    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = match line.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => (key.trim(), value.trim()),
            _ => {
                return Err(HeaderError::MalformedLine {
                    // Line 1 is the opening delimiter.
                    line: i as u32 + 2,
                    text: line.to_string(),
                })
            }
        };
        map.insert(key.to_string(), parse_scalar(strip_comment(value)));
    }
    Ok(Value::Object(map))
}

/// Drop a trailing ` # comment` from an unquoted value.
fn strip_comment(value: &str) -> &str {
    if value.starts_with(['"', '\'']) {
        return value;
    }
    match value.find(" #") {
        Some(at) => value[..at].trim_end(),
        None => value,
    }
}

fn parse_scalar(value: &str) -> Value {
    match value {
        "" | "null" | "~" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Some(inner) = unquote(value) {
        return Value::String(inner.to_string());
    }
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(parse_scalar)
            .collect();
        return Value::Array(items);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = value.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(value.to_string())
}

fn unquote(value: &str) -> Option<&str> {
    ['"', '\''].iter().find_map(|&quote| {
        value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_scalar("42"), Value::from(42));
        assert_eq!(parse_scalar("1.5"), Value::from(1.5));
        assert_eq!(parse_scalar("'page'"), Value::from("page"));
        assert_eq!(parse_scalar("~"), Value::Null);
        assert_eq!(parse_scalar("[a, 2]"), serde_json::json!(["a", 2]));
        assert_eq!(parse_scalar("[]"), serde_json::json!([]));
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("page # main"), "page");
        assert_eq!(strip_comment("\"a # b\""), "\"a # b\"");
    }

    #[test]
    fn test_delimiter_allows_crlf() {
        assert!(is_delimiter("---\r\n"));
        assert!(!is_delimiter("----\n"));
        assert!(!is_delimiter(" ---\n"));
    }
}
