use crate::{UrlError, UrlResult};
use url::{ParseError, Url};

/// Parses a URL, tolerating a missing scheme
///
/// Links found in the wild are not always absolute. Inputs such as
/// `example.com/page` or `//example.com/page` fail a strict parse with
/// `RelativeUrlWithoutBase`; those are retried with an `http:` scheme so the
/// host can still be read. Anything else that fails to parse is an error.
///
/// # Examples
///
/// ```
/// use sumi_selector::url::parse_lenient;
///
/// let url = parse_lenient("example.com/news").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
/// ```
pub fn parse_lenient(url_str: &str) -> UrlResult<Url> {
    match Url::parse(url_str) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let prefixed = if url_str.starts_with("//") {
                format!("http:{}", url_str)
            } else {
                format!("http://{}", url_str)
            };
            Url::parse(&prefixed).map_err(|e| UrlError::Parse(e.to_string()))
        }
        Err(e) => Err(UrlError::Parse(e.to_string())),
    }
}

/// Extracts the lowercase domain from a URL string
///
/// Returns `None` when the input cannot be parsed or has no host
/// (`mailto:`, `javascript:` and similar).
///
/// # Examples
///
/// ```
/// use sumi_selector::url::extract_domain;
///
/// assert_eq!(extract_domain("https://EXAMPLE.COM/path"), Some("example.com".to_string()));
/// assert_eq!(extract_domain("https://sub.example.com/"), Some("sub.example.com".to_string()));
/// assert_eq!(extract_domain("mailto:someone@example.com"), None);
/// ```
pub fn extract_domain(url_str: &str) -> Option<String> {
    let url = parse_lenient(url_str).ok()?;
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns true if both URLs resolve to the same domain
///
/// Unparsable input on either side never matches.
pub fn same_domain(a: &str, b: &str) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(da), Some(db)) => da == db,
        _ => false,
    }
}
