//! URL templating: dotted-path lookup, parameter combination, placeholder
//! scanning and substitution.
//!
//! A URL template is a string with literal segments and `:name`
//! placeholders. `\:` escapes a literal colon. Rendering a template is a
//! pure, single-pass transformation:
//!
//! 1. [`combine_params`] resolves declared parameter templates against the
//!    request payload and overlays caller parameters.
//! 2. [`find_url_params`] determines which placeholders are live.
//! 3. [`parse_url`] substitutes or removes each live placeholder and cleans
//!    up the result.
//!
//! ## Example
//!
//! ```rust
//! use declarest::template::{combine_params, find_url_params, param_set, parse_url};
//! use serde_json::json;
//!
//! let template = "/users/:id/posts";
//! let declared = param_set([("id", "@id")]);
//! let data = json!({"id": 42});
//!
//! let params = combine_params(&declared, None, Some(&data)).unwrap();
//! let url_params = find_url_params(template).unwrap();
//! assert_eq!(parse_url(template, &params, &url_params, true), "/users/42/posts");
//! ```

mod dotted_path;
mod encode;
mod params;
mod parser;
mod scanner;

pub use dotted_path::{RESERVED_NAME, is_valid_dotted_path, lookup_dotted_path};
pub use encode::{concat_url, encode_uri_segment, value_to_segment};
pub use params::{PATH_PREFIX, ParamFn, ParamSet, ParamValue, combine_params, param_set};
pub use parser::{clean_up_url, parse_url};
pub use scanner::find_url_params;
