//! Query-string parameter extraction

use url::form_urlencoded;

/// First value of `name` in a raw query string, percent- and `+`-decoded.
///
/// Later repetitions of the same parameter are ignored.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
