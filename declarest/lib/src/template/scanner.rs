//! Detection of live `:name` placeholders in URL templates.

use std::collections::BTreeSet;

use regex::Regex;

use super::dotted_path::RESERVED_NAME;
use crate::error::PathError;

/// Matches a single ASCII non-word character.
pub(crate) const NON_WORD: &str = "[^0-9A-Za-z_]";

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns the placeholder names in `url` that are substitution points.
///
/// The template is split on non-word characters; a token qualifies when it
/// is not purely numeric and occurs somewhere as `:token` that is not
/// escaped with a backslash and is followed by a non-word character or the
/// end of the template. Plain-text occurrences never qualify on their own.
///
/// ## Errors
///
/// Returns [`PathError::ReservedName`] if any token is `hasOwnProperty`.
///
/// ## Examples
///
/// ```rust
/// use declarest::template::find_url_params;
///
/// let params = find_url_params(r"/users/:id/at/10\:30").unwrap();
/// assert!(params.contains("id"));
/// assert!(!params.contains("users"));
/// assert!(!params.contains("30"));
/// ```
pub fn find_url_params(url: &str) -> Result<BTreeSet<String>, PathError> {
    let mut params = BTreeSet::new();

    for token in url.split(|c: char| !is_word_char(c)) {
        if token == RESERVED_NAME {
            return Err(PathError::ReservedName {
                name: token.to_string(),
            });
        }

        if token.is_empty() || token.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }

        if params.contains(token) {
            continue;
        }

        if is_live_placeholder(url, token) {
            params.insert(token.to_string());
        }
    }

    Ok(params)
}

fn is_live_placeholder(url: &str, token: &str) -> bool {
    let pattern = format!(r"(^|[^\\]):{}({NON_WORD}|$)", regex::escape(token));
    Regex::new(&pattern).is_ok_and(|re| re.is_match(url))
}
