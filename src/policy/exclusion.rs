use crate::config::Config;
use crate::url::{extract_domain, matches_suffix};
use indexmap::IndexMap;

/// Per-domain path exclusion rules
///
/// Built once at startup from the `[same-domain-selector.exclude]` table and
/// shared read-only by every worker. Rules are kept in file order: the first
/// suffix that the URL's domain ends with decides which fragment list applies,
/// even if a longer suffix further down would also match.
#[derive(Debug, Clone, Default)]
pub struct ExclusionPolicy {
    rules: IndexMap<String, Vec<String>>,
}

impl ExclusionPolicy {
    /// Creates a policy from an ordered suffix -> fragments table
    ///
    /// Suffixes are lowercased to match extracted domains. If two keys
    /// collapse to the same suffix, the first one keeps its position and
    /// fragments.
    pub fn new(rules: IndexMap<String, Vec<String>>) -> Self {
        let mut lowered = IndexMap::with_capacity(rules.len());
        for (suffix, fragments) in rules {
            lowered.entry(suffix.to_lowercase()).or_insert(fragments);
        }
        Self { rules: lowered }
    }

    /// A policy that never excludes anything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Builds the policy from configuration
    ///
    /// A missing `[same-domain-selector]` section, or a section without an
    /// `exclude` table, yields a policy that excludes nothing.
    pub fn from_config(config: &Config) -> Self {
        config
            .selector
            .as_ref()
            .and_then(|s| s.exclude.clone())
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Number of registered domain suffixes
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates rules in the order they are consulted
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the first rule whose suffix the URL's domain ends with
    pub fn matched_rule(&self, url: &str) -> Option<(&str, &[String])> {
        let domain = extract_domain(url)?;
        self.rules()
            .find(|(suffix, _)| matches_suffix(suffix, &domain))
    }

    /// Returns true if the URL is blocked for its domain
    ///
    /// The URL is split on `/` and blocked when any piece is exactly one of the
    /// matched rule's fragments. `admin` blocks `/admin/users` but not
    /// `/administrator`.
    pub fn is_excluded(&self, url: &str) -> bool {
        let Some((_, fragments)) = self.matched_rule(url) else {
            return false;
        };

        if fragments.is_empty() {
            return false;
        }

        url.split('/')
            .any(|segment| fragments.iter().any(|f| f == segment))
    }
}
