//! URI segment encoding and URL joining helpers.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

/// Characters left intact inside a path segment.
///
/// Matches `encodeURIComponent` plus the sub-delimiters the framework keeps
/// readable in segments: `@ : $ , ; & = +`.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'@')
    .remove(b':')
    .remove(b'$')
    .remove(b',')
    .remove(b';')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+');

/// Percent-encodes a value for use as a URL path segment.
///
/// ## Examples
///
/// ```rust
/// use declarest::template::encode_uri_segment;
///
/// assert_eq!(encode_uri_segment("a b/c"), "a%20b%2Fc");
/// assert_eq!(encode_uri_segment("user@host:1"), "user@host:1");
/// ```
pub fn encode_uri_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT_ENCODE_SET).to_string()
}

/// Renders a parameter value as the text substituted into a URL.
///
/// Strings are used verbatim, arrays are joined with `,`, objects become
/// compact JSON and other scalars use their JSON text.
pub fn value_to_segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_to_segment)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Joins two URL parts with exactly one `/` between them.
///
/// An empty side yields the other side unchanged.
///
/// ## Examples
///
/// ```rust
/// use declarest::template::concat_url;
///
/// assert_eq!(concat_url("/", "users/:id"), "/users/:id");
/// assert_eq!(concat_url("https://api.example.com/v1/", "/users"), "https://api.example.com/v1/users");
/// assert_eq!(concat_url("/users/:id", ""), "/users/:id");
/// ```
pub fn concat_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    if base.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode_uri_segment("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(encode_uri_segment("50%"), "50%25");
    }

    #[test]
    fn test_encode_keeps_segment_safe_characters() {
        assert_eq!(encode_uri_segment("a,b;c=d&e+f$g"), "a,b;c=d&e+f$g");
        assert_eq!(encode_uri_segment("it's-(ok)_~!*."), "it's-(ok)_~!*.");
    }

    #[test]
    fn test_encode_unicode() {
        assert_eq!(encode_uri_segment("café"), "caf%C3%A9");
    }

    #[test]
    fn test_value_to_segment() {
        assert_eq!(value_to_segment(&json!("abc")), "abc");
        assert_eq!(value_to_segment(&json!(42)), "42");
        assert_eq!(value_to_segment(&json!(true)), "true");
        assert_eq!(value_to_segment(&json!([1, "b"])), "1,b");
        assert_eq!(value_to_segment(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_concat_url() {
        assert_eq!(concat_url("/", "things/:id"), "/things/:id");
        assert_eq!(concat_url("/api/", "/things"), "/api/things");
        assert_eq!(concat_url("", "things"), "things");
        assert_eq!(concat_url("/api", ""), "/api");
    }
}
