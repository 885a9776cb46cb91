//! Object store trait describing the read-only repository adapter.

use bytes::Bytes;
use thiserror::Error;

use crate::domain::objects::{ObjectId, Snapshot, TreeEntry};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reference `{reference}` does not name a commit")]
    UnknownReference { reference: String },
    #[error("object `{id}` is missing from the store")]
    MissingObject { id: ObjectId },
    #[error("object `{id}` is a {actual}, expected a {expected}")]
    UnexpectedKind {
        id: ObjectId,
        expected: &'static str,
        actual: String,
    },
    #[error("object store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Read-only, content-addressed view of a repository.
///
/// Implementations must tolerate concurrent readers; nothing is ever written.
pub trait ObjectStore: Send + Sync {
    /// Resolve a reference token (branch, tag, hash, relative expression) to a commit.
    fn resolve(&self, reference: &str) -> Result<Snapshot, StoreError>;

    /// Entries of the tree `id`, in store order.
    fn tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>, StoreError>;

    /// Raw content of the blob `id`.
    fn blob(&self, id: &ObjectId) -> Result<Bytes, StoreError>;
}
