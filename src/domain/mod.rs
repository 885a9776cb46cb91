//! Domain layer types and invariants.

pub mod format;
pub mod objects;
pub mod path;
pub mod policy;
pub mod query;
pub mod types;
