//! gitpage: serve markdown, HTML, and plain text straight from a git object store.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
