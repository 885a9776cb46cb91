//! Content pipeline: reference and path resolution, classification, and rendering.

pub mod classify;
pub mod content;
pub mod error;
pub mod listing;
pub mod render;
pub mod resolve;
pub mod store;
