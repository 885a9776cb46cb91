#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use bytes::Bytes;
use chrono::{FixedOffset, TimeZone};
use gitpage::{
    application::{
        content::{ContentOptions, ContentService},
        render::ComrakRenderService,
        store::{ObjectStore, StoreError},
    },
    domain::objects::{EntryKind, ObjectId, Snapshot, TreeEntry},
};

pub const AUTHOR: &str = "Ada Lovelace";

/// Directory tree described in store order.
#[derive(Debug, Clone, Default)]
pub struct SiteTree {
    entries: Vec<(String, SiteNode)>,
}

#[derive(Debug, Clone)]
enum SiteNode {
    Dir(SiteTree),
    File(Bytes),
    Link(Bytes),
    Submodule,
}

impl SiteTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, content: impl Into<Bytes>) -> Self {
        self.insert(path, SiteNode::File(content.into()));
        self
    }

    pub fn link(mut self, path: &str, target: impl Into<Bytes>) -> Self {
        self.insert(path, SiteNode::Link(target.into()));
        self
    }

    pub fn submodule(mut self, path: &str) -> Self {
        self.insert(path, SiteNode::Submodule);
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.insert(path, SiteNode::Dir(SiteTree::default()));
        self
    }

    fn insert(&mut self, path: &str, node: SiteNode) {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(name) = segments.pop() else {
            return;
        };

        let mut tree = self;
        for segment in segments {
            let index = match tree.entries.iter().position(|(n, _)| n == segment) {
                Some(index) => index,
                None => {
                    tree.entries
                        .push((segment.to_string(), SiteNode::Dir(SiteTree::default())));
                    tree.entries.len() - 1
                }
            };
            tree = match &mut tree.entries[index].1 {
                SiteNode::Dir(child) => child,
                _ => panic!("`{segment}` is not a directory"),
            };
        }
        tree.entries.retain(|(n, _)| n != name);
        tree.entries.push((name.to_string(), node));
    }
}

/// In-memory object store with named references.
#[derive(Default)]
pub struct MemoryStore {
    refs: HashMap<String, Snapshot>,
    trees: HashMap<ObjectId, Vec<TreeEntry>>,
    blobs: HashMap<ObjectId, Bytes>,
    next_id: AtomicUsize,
    pub tree_reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `site` as a commit reachable through every name in `refs` and its own id.
    pub fn commit(&mut self, refs: &[&str], site: &SiteTree) -> Snapshot {
        let root = self.store_tree(site);
        let commit = ObjectId::new(format!("{:040x}", self.allocate() + 0xc0ffee));
        let committed_at = FixedOffset::east_opt(3600)
            .and_then(|offset| offset.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).single())
            .expect("valid timestamp");
        let snapshot = Snapshot {
            commit: commit.clone(),
            root,
            author: AUTHOR.to_string(),
            committed_at,
        };
        self.refs
            .insert(commit.as_str().to_string(), snapshot.clone());
        for name in refs {
            self.refs.insert((*name).to_string(), snapshot.clone());
        }
        snapshot
    }

    fn allocate(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn store_tree(&mut self, tree: &SiteTree) -> ObjectId {
        let mut entries = Vec::new();
        for (name, node) in &tree.entries {
            let entry = match node {
                SiteNode::Dir(child) => {
                    TreeEntry::new(name.clone(), self.store_tree(child), EntryKind::Tree)
                }
                SiteNode::File(bytes) => {
                    TreeEntry::new(name.clone(), self.store_blob(bytes), EntryKind::Blob)
                }
                SiteNode::Link(bytes) => {
                    TreeEntry::new(name.clone(), self.store_blob(bytes), EntryKind::Link)
                }
                SiteNode::Submodule => TreeEntry::new(
                    name.clone(),
                    ObjectId::new(format!("submodule-{}", self.allocate())),
                    EntryKind::Submodule,
                ),
            };
            entries.push(entry);
        }
        let id = ObjectId::new(format!("tree-{}", self.allocate()));
        self.trees.insert(id.clone(), entries);
        id
    }

    fn store_blob(&mut self, bytes: &Bytes) -> ObjectId {
        let id = ObjectId::new(format!("blob-{}", self.allocate()));
        self.blobs.insert(id.clone(), bytes.clone());
        id
    }
}

impl ObjectStore for MemoryStore {
    fn resolve(&self, reference: &str) -> Result<Snapshot, StoreError> {
        self.refs
            .get(reference)
            .cloned()
            .ok_or_else(|| StoreError::UnknownReference {
                reference: reference.to_string(),
            })
    }

    fn tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>, StoreError> {
        self.tree_reads.fetch_add(1, Ordering::Relaxed);
        self.trees
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::MissingObject { id: id.clone() })
    }

    fn blob(&self, id: &ObjectId) -> Result<Bytes, StoreError> {
        self.blobs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::MissingObject { id: id.clone() })
    }
}

/// A small site used across tests.
pub fn sample_site() -> SiteTree {
    SiteTree::new()
        .file("zeta", "# Zeta\n")
        .file("about/me", "# About me\n\nHello & welcome.\n")
        .file("about/team/alice", "Alice\n")
        .file("static/logo.png", Bytes::from_static(b"\x89PNG\r\n\x1a\n"))
        .file("static/readme", "raw *markdown*\n")
        .file("private/secret", "top secret\n")
        .file("drafts/wip", "# WIP\n")
        .file("_layout/page.html", "<html><main>$content</main><footer>${footer}</footer>$title</html>")
        .file("_layout/index.html", "<html class=\"home\">$content</html>")
        .file("notes.bin", Bytes::from_static(&[0xff, 0xfe, 0x00, 0x01]))
        .link("a/b/link", "../other/doc")
        .link("go", "https://example.com/landing")
        .link("shortcut", "about")
        .file("other/doc", "# Other\n")
        .submodule("vendor")
}

pub fn service(store: MemoryStore, options: ContentOptions) -> ContentService {
    ContentService::new(
        Arc::new(store),
        Arc::new(ComrakRenderService::default()),
        options,
    )
}
