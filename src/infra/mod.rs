//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod git;
pub mod http;
pub mod telemetry;
