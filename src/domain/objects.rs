//! Read-only views of the content-addressed object store.

use std::fmt;

use chrono::{DateTime, FixedOffset};

/// Store-specific object identifier, usually a hex object hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a tree entry as recorded by its file mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Blob,
    Link,
    Tree,
    Submodule,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Link => "link",
            EntryKind::Tree => "tree",
            EntryKind::Submodule => "submodule",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub id: ObjectId,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, id: ObjectId, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            id,
            kind,
        }
    }
}

/// Immutable handle on one commit of the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub commit: ObjectId,
    pub root: ObjectId,
    pub author: String,
    pub committed_at: DateTime<FixedOffset>,
}

impl Snapshot {
    /// Reference string that addresses exactly this snapshot.
    pub fn canonical_ref(&self) -> &str {
        self.commit.as_str()
    }
}
