//! Runtime plumbing shared across Campus services: tracing setup and
//! serialization helpers. Keep framework-free domain logic out of here.

pub mod serde;
pub mod tracing;
