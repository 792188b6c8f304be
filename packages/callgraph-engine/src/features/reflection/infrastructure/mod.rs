//! Reflection resolver infrastructure

pub mod lookup;
pub mod resolver;
pub mod selector;
pub mod synthesis;

pub use lookup::{LookupRequest, MemberLookup, Relaxed};
pub use resolver::{fallback_targets, is_resolving_key, site_state, FallbackTarget, ReflectiveSite, SiteState};
pub use selector::ReflectionContextSelector;
pub use synthesis::{candidate_members, synthesize, Synthesized};
