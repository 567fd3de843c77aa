//! Dotted-path lookup (`a.b.c`) into request payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::PathError;

/// Name that may never be used as a path or parameter key.
pub const RESERVED_NAME: &str = "hasOwnProperty";

static DOTTED_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\.[a-zA-Z_$@][0-9a-zA-Z_$@]*)+$").expect("Invalid regex")
});

/// Returns `true` if `path` is a syntactically valid dotted path.
///
/// Each segment starts with a letter, `_`, `$` or `@` and continues with
/// alphanumerics, `_`, `$` or `@`.
pub fn is_valid_dotted_path(path: &str) -> bool {
    !path.is_empty() && path != RESERVED_NAME && DOTTED_PATH.is_match(&format!(".{path}"))
}

/// Looks up a dotted path in `root`.
///
/// `Ok(None)` means the value is absent: either a segment is missing, or
/// traversal hit `null` or a non-object before the last segment. An explicit
/// `null` at the final segment is returned as `Some(Value::Null)`.
///
/// ## Errors
///
/// Returns [`PathError::InvalidDottedPath`] if the path is syntactically
/// invalid or uses the reserved name.
///
/// ## Examples
///
/// ```rust
/// use declarest::template::lookup_dotted_path;
/// use serde_json::json;
///
/// let data = json!({"a": {"b": 2}});
/// assert_eq!(lookup_dotted_path(Some(&data), "a.b").unwrap(), Some(&json!(2)));
/// assert_eq!(lookup_dotted_path(Some(&data), "a.c").unwrap(), None);
/// assert!(lookup_dotted_path(Some(&data), "hasOwnProperty").is_err());
/// ```
pub fn lookup_dotted_path<'a>(
    root: Option<&'a Value>,
    path: &str,
) -> Result<Option<&'a Value>, PathError> {
    if !is_valid_dotted_path(path) {
        return Err(PathError::invalid_path(path));
    }

    let mut current = root;
    for key in path.split('.') {
        let Some(value) = current else {
            break;
        };
        current = match value {
            Value::Object(map) => map.get(key),
            _ => None,
        };
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_paths() {
        assert!(is_valid_dotted_path("id"));
        assert!(is_valid_dotted_path("a.b.c"));
        assert!(is_valid_dotted_path("$ref._id"));
        assert!(is_valid_dotted_path("@type.v2"));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(!is_valid_dotted_path(""));
        assert!(!is_valid_dotted_path("hasOwnProperty"));
        assert!(!is_valid_dotted_path("a..b"));
        assert!(!is_valid_dotted_path("a."));
        assert!(!is_valid_dotted_path("1st"));
        assert!(!is_valid_dotted_path("a.0"));
        assert!(!is_valid_dotted_path("a-b"));
    }

    #[test]
    fn test_lookup_nested() {
        let data = json!({"a": {"b": 2}});
        assert_eq!(lookup_dotted_path(Some(&data), "a.b").unwrap(), Some(&json!(2)));
        assert_eq!(lookup_dotted_path(Some(&data), "a").unwrap(), Some(&json!({"b": 2})));
    }

    #[test]
    fn test_lookup_missing_segment() {
        let data = json!({"a": {"b": 2}});
        assert_eq!(lookup_dotted_path(Some(&data), "a.c").unwrap(), None);
        assert_eq!(lookup_dotted_path(Some(&data), "x.y.z").unwrap(), None);
    }

    #[test]
    fn test_lookup_without_root() {
        assert_eq!(lookup_dotted_path(None, "id").unwrap(), None);
    }

    #[test]
    fn test_lookup_through_null() {
        let data = json!({"a": null});
        assert_eq!(lookup_dotted_path(Some(&data), "a").unwrap(), Some(&Value::Null));
        assert_eq!(lookup_dotted_path(Some(&data), "a.b").unwrap(), None);
    }

    #[test]
    fn test_lookup_through_scalar() {
        let data = json!({"a": "text"});
        assert_eq!(lookup_dotted_path(Some(&data), "a.length").unwrap(), None);
    }

    #[test]
    fn test_lookup_reserved_name_fails() {
        let data = json!({});
        let err = lookup_dotted_path(Some(&data), "hasOwnProperty").unwrap_err();
        assert_eq!(err, PathError::invalid_path("hasOwnProperty"));
    }

    #[test]
    fn test_lookup_invalid_syntax_fails() {
        let data = json!({"a": 1});
        assert!(lookup_dotted_path(Some(&data), "").is_err());
        assert!(lookup_dotted_path(Some(&data), "a..b").is_err());
    }
}
