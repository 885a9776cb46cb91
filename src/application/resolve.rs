//! Reference and path resolution over an immutable snapshot.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{
    application::{
        error::ContentError,
        store::{ObjectStore, StoreError},
    },
    domain::{
        objects::{EntryKind, ObjectId, Snapshot},
        path::SitePath,
        types::SymlinkMode,
    },
};

/// Longest reference token accepted from clients (a full SHA-1 minus one).
pub const MAX_REFERENCE_LEN: usize = 39;

/// Upper bound on link hops when following symbolic links inside a snapshot.
pub const MAX_SYMLINK_HOPS: usize = 16;

pub struct ReferenceResolver<'a> {
    store: &'a dyn ObjectStore,
    default_reference: &'a str,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn ObjectStore, default_reference: &'a str) -> Self {
        Self {
            store,
            default_reference,
        }
    }

    /// Resolve a client-supplied token, or the configured default when absent.
    pub fn resolve(&self, token: Option<&str>) -> Result<Snapshot, ContentError> {
        let reference = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(truncate_reference)
            .unwrap_or(self.default_reference);

        self.store.resolve(reference).map_err(|err| match err {
            StoreError::UnknownReference { .. } => {
                debug!(
                    target = "gitpage::resolve",
                    reference,
                    "reference did not resolve"
                );
                ContentError::UnknownReference {
                    reference: reference.to_string(),
                }
            }
            other => ContentError::Store(other),
        })
    }
}

fn truncate_reference(token: &str) -> &str {
    match token.char_indices().nth(MAX_REFERENCE_LEN) {
        Some((end, _)) => &token[..end],
        None => token,
    }
}

/// The object a path ended on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Tree(ObjectId),
    Blob(ObjectId),
    Unsupported(EntryKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path of the object after any followed links.
    pub path: SitePath,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Object(ResolvedPath),
    /// Send the client to this location instead.
    Redirect(String),
}

enum Step {
    Found(Node),
    Link {
        link: SitePath,
        id: ObjectId,
        remaining: SitePath,
    },
}

pub struct PathResolver<'a> {
    store: &'a dyn ObjectStore,
    mode: SymlinkMode,
}

impl<'a> PathResolver<'a> {
    pub fn new(store: &'a dyn ObjectStore, mode: SymlinkMode) -> Self {
        Self { store, mode }
    }

    /// Walk `requested` inside `snapshot`, honouring symbolic links per the configured mode.
    pub fn resolve(
        &self,
        snapshot: &Snapshot,
        requested: &SitePath,
    ) -> Result<Resolution, ContentError> {
        let mut current = requested.clone();
        let mut visited = HashSet::from([current.clone()]);
        let mut followed: Option<(SitePath, String)> = None;

        loop {
            let step = match self.walk(snapshot, &current) {
                Ok(step) => step,
                Err(err @ ContentError::NotFound { .. }) => {
                    return Err(match followed {
                        Some((link, target)) => ContentError::SymlinkTargetMissing {
                            path: link.to_string(),
                            target,
                        },
                        None => err,
                    });
                }
                Err(err) => return Err(err),
            };

            let (link, id, remaining) = match step {
                Step::Found(node) => {
                    return Ok(Resolution::Object(ResolvedPath {
                        path: current,
                        node,
                    }));
                }
                Step::Link {
                    link,
                    id,
                    remaining,
                } => (link, id, remaining),
            };

            let target = self.read_link_target(&link, &id)?;

            if is_absolute_url(&target) {
                return Ok(Resolution::Redirect(append_url(&target, &remaining)));
            }

            match self.mode {
                SymlinkMode::Redirect => {
                    let location = SitePath::normalize_absolute(&target).join_path(&remaining);
                    return Ok(Resolution::Redirect(location.to_url_path()));
                }
                SymlinkMode::Follow => {
                    let next = link
                        .resolve_sibling(&target)
                        .ok_or_else(|| ContentError::SymlinkTargetMissing {
                            path: link.to_string(),
                            target: target.clone(),
                        })?
                        .join_path(&remaining);

                    if visited.len() > MAX_SYMLINK_HOPS || !visited.insert(next.clone()) {
                        warn!(
                            target = "gitpage::resolve",
                            link = %link,
                            requested = %requested,
                            "symbolic link cycle detected"
                        );
                        return Err(ContentError::SymlinkLoop {
                            path: link.to_string(),
                        });
                    }

                    followed = Some((link, target));
                    current = next;
                }
            }
        }
    }

    /// Exact-name walk without link handling; only a plain blob resolves.
    pub fn find_blob(&self, snapshot: &Snapshot, path: &SitePath) -> Result<ObjectId, ContentError> {
        match self.walk(snapshot, path)? {
            Step::Found(Node::Blob(id)) => Ok(id),
            _ => Err(ContentError::not_found(path)),
        }
    }

    fn walk(&self, snapshot: &Snapshot, path: &SitePath) -> Result<Step, ContentError> {
        let segments = path.segments();
        let mut tree = snapshot.root.clone();

        for (index, segment) in segments.iter().enumerate() {
            let entry = self
                .store
                .tree(&tree)?
                .into_iter()
                .find(|entry| entry.name == *segment)
                .ok_or_else(|| ContentError::not_found(path))?;
            let is_last = index + 1 == segments.len();

            match (entry.kind, is_last) {
                (EntryKind::Tree, false) => tree = entry.id,
                (EntryKind::Tree, true) => return Ok(Step::Found(Node::Tree(entry.id))),
                (EntryKind::Blob, true) => return Ok(Step::Found(Node::Blob(entry.id))),
                (EntryKind::Link, _) => {
                    return Ok(Step::Link {
                        link: SitePath::from_segments(segments[..=index].iter().cloned()),
                        id: entry.id,
                        remaining: SitePath::from_segments(segments[index + 1..].iter().cloned()),
                    });
                }
                (kind @ EntryKind::Submodule, true) => {
                    return Ok(Step::Found(Node::Unsupported(kind)));
                }
                (EntryKind::Blob | EntryKind::Submodule, false) => {
                    return Err(ContentError::not_found(path));
                }
            }
        }

        Ok(Step::Found(Node::Tree(tree)))
    }

    fn read_link_target(&self, link: &SitePath, id: &ObjectId) -> Result<String, ContentError> {
        let unreadable = || ContentError::SymlinkTargetUnreadable {
            path: link.to_string(),
        };

        let bytes = self.store.blob(id)?;
        let target = std::str::from_utf8(&bytes).map_err(|_| unreadable())?.trim();
        if target.is_empty() {
            return Err(unreadable());
        }
        Ok(target.to_string())
    }
}

fn is_absolute_url(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

fn append_url(target: &str, remaining: &SitePath) -> String {
    if remaining.is_root() {
        target.to_string()
    } else {
        format!("{}/{remaining}", target.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_tokens_are_truncated_to_39_chars() {
        let long = "a".repeat(60);
        assert_eq!(truncate_reference(&long).len(), MAX_REFERENCE_LEN);
        assert_eq!(truncate_reference("HEAD~2"), "HEAD~2");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let token = "é".repeat(45);
        let truncated = truncate_reference(&token);
        assert_eq!(truncated.chars().count(), MAX_REFERENCE_LEN);
    }

    #[test]
    fn url_targets_keep_remaining_segments() {
        assert_eq!(
            append_url("https://example.com/x", &SitePath::root()),
            "https://example.com/x"
        );
        assert_eq!(
            append_url("https://example.com/x/", &SitePath::parse("y/z")),
            "https://example.com/x/y/z"
        );
        assert!(is_absolute_url("http://example.com"));
        assert!(!is_absolute_url("other/file"));
    }
}
