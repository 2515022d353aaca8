/// Checks if a domain ends with a configured suffix key
///
/// This is a plain string suffix test, not a label-aware one:
/// "example.com" matches "example.com", "news.example.com" and also
/// "badexample.com". Exclusion tables are written with that in mind.
///
/// # Examples
///
/// ```
/// use sumi_selector::url::matches_suffix;
///
/// assert!(matches_suffix("example.com", "example.com"));
/// assert!(matches_suffix("example.com", "news.example.com"));
/// assert!(!matches_suffix("example.com", "example.org"));
/// ```
pub fn matches_suffix(suffix: &str, domain: &str) -> bool {
    domain.ends_with(suffix)
}
