//! Index engine implementations
//!
//! Production deployments plug their own [`IndexEngine`](crate::traits::IndexEngine);
//! the reference engine keeps the orchestration layers testable end to end.

#[cfg(feature = "reference")]
mod reference;

#[cfg(feature = "reference")]
pub use reference::ReferenceEngine;
