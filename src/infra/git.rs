//! Object store backed by a local git repository, read through gitoxide.

use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use gix::objs::tree::EntryKind as GitEntryKind;
use tracing::debug;

use crate::application::store::{ObjectStore, StoreError};
use crate::domain::objects::{EntryKind, ObjectId, Snapshot, TreeEntry};
use crate::infra::error::InfraError;

/// Repository opened once and localised per call.
pub struct GitObjectStore {
    repo: gix::ThreadSafeRepository,
}

impl GitObjectStore {
    pub fn open(path: &Path) -> Result<Self, InfraError> {
        let repo = gix::ThreadSafeRepository::open(path)
            .map_err(|err| InfraError::repository(path.display().to_string(), err.to_string()))?;
        debug!(
            target = "gitpage::infra::git",
            path = %path.display(),
            "repository opened"
        );
        Ok(Self { repo })
    }

    fn find(&self, id: &ObjectId) -> Result<(gix::Repository, gix::ObjectId), StoreError> {
        let oid = parse_id(id)?;
        Ok((self.repo.to_thread_local(), oid))
    }
}

impl ObjectStore for GitObjectStore {
    fn resolve(&self, reference: &str) -> Result<Snapshot, StoreError> {
        let repo = self.repo.to_thread_local();
        let unknown = || StoreError::UnknownReference {
            reference: reference.to_string(),
        };

        let commit = repo
            .rev_parse_single(reference)
            .map_err(|_| unknown())?
            .object()
            .map_err(StoreError::backend)?
            .peel_to_commit()
            .map_err(|_| unknown())?;

        let root = commit.tree_id().map_err(StoreError::backend)?;
        let author = commit.author().map_err(StoreError::backend)?.name.to_string();
        let time = commit
            .committer()
            .map_err(StoreError::backend)?
            .time()
            .map_err(StoreError::backend)?;

        Ok(Snapshot {
            commit: ObjectId::new(commit.id.to_string()),
            root: ObjectId::new(root.to_string()),
            author,
            committed_at: commit_time(time.seconds, time.offset)?,
        })
    }

    fn tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>, StoreError> {
        let (repo, oid) = self.find(id)?;
        let object = find_object(&repo, oid, id)?;
        if object.kind != gix::object::Kind::Tree {
            return Err(StoreError::UnexpectedKind {
                id: id.clone(),
                expected: "tree",
                actual: object.kind.to_string(),
            });
        }

        let tree = object.try_into_tree().map_err(StoreError::backend)?;
        let decoded = tree.decode().map_err(StoreError::backend)?;
        Ok(decoded
            .entries
            .iter()
            .map(|entry| {
                TreeEntry::new(
                    entry.filename.to_string(),
                    ObjectId::new(entry.oid.to_string()),
                    entry_kind(entry.mode.kind()),
                )
            })
            .collect())
    }

    fn blob(&self, id: &ObjectId) -> Result<Bytes, StoreError> {
        let (repo, oid) = self.find(id)?;
        let object = find_object(&repo, oid, id)?;
        if object.kind != gix::object::Kind::Blob {
            return Err(StoreError::UnexpectedKind {
                id: id.clone(),
                expected: "blob",
                actual: object.kind.to_string(),
            });
        }
        Ok(Bytes::from(object.detach().data))
    }
}

fn parse_id(id: &ObjectId) -> Result<gix::ObjectId, StoreError> {
    gix::ObjectId::from_hex(id.as_str().as_bytes()).map_err(|_| StoreError::MissingObject {
        id: id.clone(),
    })
}

fn find_object<'repo>(
    repo: &'repo gix::Repository,
    oid: gix::ObjectId,
    id: &ObjectId,
) -> Result<gix::Object<'repo>, StoreError> {
    repo.find_object(oid).map_err(|err| {
        if repo.has_object(oid) {
            StoreError::backend(err)
        } else {
            StoreError::MissingObject { id: id.clone() }
        }
    })
}

fn entry_kind(kind: GitEntryKind) -> EntryKind {
    match kind {
        GitEntryKind::Tree => EntryKind::Tree,
        GitEntryKind::Blob | GitEntryKind::BlobExecutable => EntryKind::Blob,
        GitEntryKind::Link => EntryKind::Link,
        GitEntryKind::Commit => EntryKind::Submodule,
    }
}

fn commit_time(seconds: i64, offset: i32) -> Result<DateTime<FixedOffset>, StoreError> {
    let zone = FixedOffset::east_opt(offset)
        .ok_or_else(|| StoreError::Backend(format!("invalid utc offset {offset}")))?;
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(&zone))
        .ok_or_else(|| StoreError::Backend(format!("invalid commit time {seconds}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_time_keeps_the_offset() {
        let time = commit_time(1_700_000_000, -5 * 3600).unwrap();
        assert_eq!(time.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn git_modes_map_to_entry_kinds() {
        assert_eq!(entry_kind(GitEntryKind::BlobExecutable), EntryKind::Blob);
        assert_eq!(entry_kind(GitEntryKind::Commit), EntryKind::Submodule);
        assert_eq!(entry_kind(GitEntryKind::Link), EntryKind::Link);
    }

    #[test]
    fn malformed_ids_are_missing_objects() {
        let err = parse_id(&ObjectId::new("not-a-hash")).unwrap_err();
        assert!(matches!(err, StoreError::MissingObject { .. }));
    }
}
