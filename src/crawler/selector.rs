//! Same-domain link selection
//!
//! Turns a stored document into frontier submissions: extract anchors, keep
//! the ones on the source page's domain, drop policy-blocked ones, and queue
//! the rest. Duplicate submissions are normal (most pages link to URLs that
//! are already known) and never surface as errors.

use crate::crawler::parser::{extract_links, parse_document};
use crate::policy::ExclusionPolicy;
use crate::storage::{Frontier, StorageError};
use crate::url::same_domain;
use crate::Result;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;

/// A link discovered on a page: `url` was found on `source_url`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlEdge {
    pub url: String,
    pub source_url: String,
}

impl CrawlEdge {
    pub fn new(url: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_url: source_url.into(),
        }
    }
}

/// Extracts, filters, and queues same-domain links
pub struct SelectionPipeline {
    policy: ExclusionPolicy,
    frontier: Arc<dyn Frontier>,
}

impl SelectionPipeline {
    pub fn new(policy: ExclusionPolicy, frontier: Arc<dyn Frontier>) -> Self {
        Self { policy, frontier }
    }

    /// Parses raw markup and runs [`select`](Self::select) on it
    pub fn select_markup(&self, markup: &str, source_url: &str) -> Result<HashSet<CrawlEdge>> {
        let document = parse_document(markup);
        self.select(&document, source_url)
    }

    /// Queues every accepted link on `document` and returns the newly queued edges
    ///
    /// Links on another domain and links blocked by the exclusion policy are
    /// skipped. A [`StorageError::DuplicateUrl`] from the frontier is
    /// swallowed; any other frontier error aborts the pass and is returned.
    pub fn select(&self, document: &Html, source_url: &str) -> Result<HashSet<CrawlEdge>> {
        let links = extract_links(document, source_url);
        let mut results = HashSet::new();

        for link in &links {
            if !same_domain(link, source_url) {
                tracing::trace!("Skipping off-domain link {} on {}", link, source_url);
                continue;
            }

            if self.policy.is_excluded(link) {
                if let Some((suffix, _)) = self.policy.matched_rule(link) {
                    tracing::debug!("Excluded {} (rule '{}') on {}", link, suffix, source_url);
                }
                continue;
            }

            match self.frontier.add(link, source_url) {
                Ok(()) => {
                    results.insert(CrawlEdge::new(link.as_str(), source_url));
                }
                Err(StorageError::DuplicateUrl(_)) => {
                    tracing::trace!("Already known: {}", link);
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::debug!(
            "Queued {} of {} links from {}",
            results.len(),
            links.len(),
            source_url
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SqliteStorage, StorageResult, UrlState};
    use crate::SelectorError;
    use indexmap::IndexMap;

    const SOURCE: &str = "http://x.com/page";

    fn pipeline_with(policy: ExclusionPolicy) -> (Arc<SqliteStorage>, SelectionPipeline) {
        let storage = Arc::new(SqliteStorage::new_in_memory().unwrap());
        let pipeline = SelectionPipeline::new(policy, storage.clone());
        (storage, pipeline)
    }

    fn admin_policy() -> ExclusionPolicy {
        let mut rules = IndexMap::new();
        rules.insert(
            "x.com".to_string(),
            vec!["admin".to_string(), "login".to_string()],
        );
        ExclusionPolicy::new(rules)
    }

    struct FailingFrontier;

    impl Frontier for FailingFrontier {
        fn add(&self, _url: &str, _source_url: &str) -> StorageResult<()> {
            Err(StorageError::Database("disk full".to_string()))
        }

        fn next_unprocessed(&self, _max_depth: i64) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn mark_processed(&self, _url: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_selects_same_domain_links() {
        let (storage, pipeline) = pipeline_with(ExclusionPolicy::allow_all());
        let html = r#"
            <a href="/news">News</a>
            <a href="http://x.com/about">About</a>
            <a href="http://other.com/">Other</a>
        "#;

        let edges = pipeline.select_markup(html, SOURCE).unwrap();

        let expected: HashSet<CrawlEdge> = [
            CrawlEdge::new("http://x.com/page/news", SOURCE),
            CrawlEdge::new("http://x.com/about", SOURCE),
        ]
        .into_iter()
        .collect();
        assert_eq!(edges, expected);

        assert!(storage.get_url("http://other.com/").unwrap().is_none());
        let queued = storage.get_url("http://x.com/about").unwrap().unwrap();
        assert_eq!(queued.state, UrlState::Queued);
        assert_eq!(queued.source_url.as_deref(), Some(SOURCE));
    }

    #[test]
    fn test_duplicate_on_same_page_is_silent() {
        let (_storage, pipeline) = pipeline_with(ExclusionPolicy::allow_all());
        let html = r#"<a href="/a">1</a><a href="/a">2</a>"#;

        let edges = pipeline.select_markup(html, SOURCE).unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_duplicate_across_passes_is_silent() {
        let (_storage, pipeline) = pipeline_with(ExclusionPolicy::allow_all());
        let html = r#"<a href="http://x.com/a">1</a>"#;

        assert_eq!(pipeline.select_markup(html, SOURCE).unwrap().len(), 1);
        assert!(pipeline
            .select_markup(html, "http://x.com/elsewhere")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_excluded_links_not_queued() {
        let (storage, pipeline) = pipeline_with(admin_policy());
        let html = r#"
            <a href="http://x.com/admin/users">Admin</a>
            <a href="http://x.com/administrator">Not blocked</a>
            <a href="http://x.com/login">Login</a>
        "#;

        let edges = pipeline.select_markup(html, SOURCE).unwrap();

        assert_eq!(edges.len(), 1);
        assert!(edges.contains(&CrawlEdge::new("http://x.com/administrator", SOURCE)));
        assert!(storage.get_url("http://x.com/admin/users").unwrap().is_none());
    }

    #[test]
    fn test_root_relative_with_excluded_segment() {
        let (_storage, pipeline) = pipeline_with(admin_policy());
        let edges = pipeline
            .select_markup(r#"<a href="/admin">Admin</a>"#, SOURCE)
            .unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn test_malformed_links_are_dropped() {
        let (_storage, pipeline) = pipeline_with(ExclusionPolicy::allow_all());
        let html = r#"
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:someone@x.com">Mail</a>
            <a href="http://[::1">Broken</a>
            <a href="/ok">Ok</a>
        "#;

        let edges = pipeline.select_markup(html, SOURCE).unwrap();
        assert_eq!(edges.len(), 1);
        assert!(edges.contains(&CrawlEdge::new("http://x.com/page/ok", SOURCE)));
    }

    #[test]
    fn test_other_frontier_errors_propagate() {
        let pipeline = SelectionPipeline::new(ExclusionPolicy::allow_all(), Arc::new(FailingFrontier));

        let result = pipeline.select_markup(r#"<a href="/a">A</a>"#, SOURCE);
        assert!(matches!(
            result,
            Err(SelectorError::Storage(StorageError::Database(_)))
        ));
    }

    #[test]
    fn test_no_frontier_call_for_rejected_links() {
        // Every link is rejected before reaching the failing frontier
        let pipeline = SelectionPipeline::new(admin_policy(), Arc::new(FailingFrontier));
        let html = r#"<a href="http://other.com/">Other</a><a href="/admin">Admin</a>"#;

        assert!(pipeline.select_markup(html, SOURCE).unwrap().is_empty());
    }
}
