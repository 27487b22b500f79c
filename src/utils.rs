//! Shared helpers for the scraping modules.

use regex::Regex;
use url::Url;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to `https:...`; otherwise joins with `base_url`.
#[must_use]
pub(crate) fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize_url_joins_root_relative() {
        let base = Url::parse("https://investegate.co.uk/AdvancedSearch.aspx").unwrap();
        assert_eq!(
            absolutize_url("/Article.aspx/ABC/20090515_0700/", &base).as_deref(),
            Some("https://investegate.co.uk/Article.aspx/ABC/20090515_0700/")
        );
    }

    #[test]
    fn test_absolutize_url_keeps_absolute_and_protocol_relative() {
        let base = Url::parse("https://investegate.co.uk/AdvancedSearch.aspx").unwrap();
        assert_eq!(
            absolutize_url("http://other.example/x/", &base).as_deref(),
            Some("http://other.example/x/")
        );
        assert_eq!(
            absolutize_url("//cdn.example/x/", &base).as_deref(),
            Some("https://cdn.example/x/")
        );
    }
}
