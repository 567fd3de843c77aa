//! Placeholder substitution and URL clean-up.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::encode::{encode_uri_segment, value_to_segment};
use super::scanner::is_word_char;

/// Produces the final URL from a template and combined parameters.
///
/// The template is walked once, left to right. Escaped `\:` sequences become
/// literal colons. Each `:name` listed in `url_params` is either replaced by
/// its URI-encoded value or, when the value is absent or `null`, dropped
/// (along with its leading `/` when another `/` follows). Substituted values
/// are never scanned again. Finally the URL is passed through
/// [`clean_up_url`].
///
/// ## Examples
///
/// ```rust
/// use declarest::template::{find_url_params, parse_url};
/// use serde_json::json;
///
/// let template = "/things/:id";
/// let url_params = find_url_params(template).unwrap();
///
/// let params = json!({"id": "5"});
/// assert_eq!(parse_url(template, params.as_object().unwrap(), &url_params, true), "/things/5");
///
/// let empty = serde_json::Map::new();
/// assert_eq!(parse_url(template, &empty, &url_params, true), "/things");
/// assert_eq!(parse_url(template, &empty, &url_params, false), "/things/");
/// ```
pub fn parse_url(
    template: &str,
    params: &Map<String, Value>,
    url_params: &BTreeSet<String>,
    strip_trailing_slashes: bool,
) -> String {
    let mut url = String::with_capacity(template.len());
    let mut pos = 0;

    while let Some(ch) = template[pos..].chars().next() {
        let rest = &template[pos..];

        if rest.starts_with("\\:") {
            url.push(':');
            pos += 2;
            continue;
        }

        if let Some(name) = placeholder_at(rest, url_params) {
            let end = pos + 1 + name.len();
            let value = params.get(name).filter(|value| !value.is_null());
            match value {
                Some(value) => url.push_str(&encode_uri_segment(&value_to_segment(value))),
                None => {
                    if template[end..].starts_with('/') && template[..pos].ends_with('/') {
                        url.pop();
                    }
                }
            }
            pos = end;
            continue;
        }

        url.push(ch);
        pos += ch.len_utf8();
    }

    clean_up_url(&url, strip_trailing_slashes)
}

/// Returns the placeholder name when `rest` opens with `:name` and `name`
/// (the whole run of word characters) is a known URL param.
fn placeholder_at<'a>(rest: &'a str, url_params: &BTreeSet<String>) -> Option<&'a str> {
    let after = rest.strip_prefix(':')?;
    let len = after.chars().take_while(|c| is_word_char(*c)).count();
    let name = &after[..len];
    (len > 0 && url_params.contains(name)).then_some(name)
}

/// Normalizes a substituted URL.
///
/// Strips trailing slashes when requested (an empty result becomes `/`),
/// collapses the first `/.` that precedes a final extension (`/.json` at the
/// end or before `?`) into `.`, and unescapes the first `/\.` into `/.`.
///
/// ## Examples
///
/// ```rust
/// use declarest::template::clean_up_url;
///
/// assert_eq!(clean_up_url("/things///", true), "/things");
/// assert_eq!(clean_up_url("///", true), "/");
/// assert_eq!(clean_up_url("/things/.json?x=1", false), "/things.json?x=1");
/// assert_eq!(clean_up_url(r"/things/\.hidden", false), "/things/.hidden");
/// ```
pub fn clean_up_url(url: &str, strip_trailing_slashes: bool) -> String {
    let mut url = url.to_string();

    if strip_trailing_slashes {
        let trimmed = url.trim_end_matches('/');
        url = if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        };
    }

    if let Some(pos) = find_collapsible_dot(&url) {
        url.replace_range(pos..pos + 2, ".");
    }

    if let Some(pos) = url.find("/\\.") {
        url.replace_range(pos..pos + 3, "/.");
    }

    url
}

/// Finds the first `/.` followed by word characters and then the end of the
/// URL or a `?`.
fn find_collapsible_dot(url: &str) -> Option<usize> {
    url.match_indices("/.").map(|(pos, _)| pos).find(|&pos| {
        let after = &url[pos + 2..];
        let word_len = after.bytes().take_while(|b| is_word_char(char::from(*b))).count();
        word_len > 0 && {
            let rest = &after[word_len..];
            rest.is_empty() || rest.starts_with('?')
        }
    })
}
