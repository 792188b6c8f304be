//! Reflection resolution
//!
//! Reflective API methods are recognized by signature. A reflective call is
//! dispatched like any other call, except that `ReflectionContextSelector`
//! gives the API node a context keyed on the reflective fact reaching it and
//! the node then runs a synthetic body instead of the library body. Facts
//! that cannot be reduced to constants are handled at quiescence, depending
//! on `ReflectionOptions`.

pub mod domain;
pub mod infrastructure;

pub use domain::{ReflectionOptions, ReflectiveOp};
pub use infrastructure::{
    candidate_members, fallback_targets, site_state, synthesize, FallbackTarget, LookupRequest, MemberLookup,
    ReflectionContextSelector, ReflectiveSite, SiteState, Synthesized,
};
