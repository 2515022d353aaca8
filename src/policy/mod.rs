//! Link acceptance policies
//!
//! Policies are immutable objects built once from configuration and handed
//! to the selection pipeline; nothing here reads configuration on the hot path.

mod exclusion;

pub use exclusion::ExclusionPolicy;
