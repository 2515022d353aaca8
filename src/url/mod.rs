//! URL handling module for Sumi-Selector
//!
//! Domain extraction, same-domain comparison, and the suffix test used by
//! the exclusion policy.

mod domain;
mod matcher;

pub use domain::{extract_domain, parse_lenient, same_domain};
pub use matcher::matches_suffix;
