//! Static path-prefix policy applied to resolved paths and listings.

use super::path::SitePath;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPolicy {
    denied: Vec<SitePath>,
    hidden: Vec<SitePath>,
    direct: Vec<SitePath>,
}

impl PathPolicy {
    pub fn new(denied: Vec<SitePath>, hidden: Vec<SitePath>, direct: Vec<SitePath>) -> Self {
        Self {
            denied: without_root(denied),
            hidden: without_root(hidden),
            direct: without_root(direct),
        }
    }

    /// Paths that are never served, listed or not.
    pub fn is_denied(&self, path: &SitePath) -> bool {
        matches_any(&self.denied, path)
    }

    /// Paths that stay fetchable but are left out of directory listings.
    pub fn is_hidden(&self, path: &SitePath) -> bool {
        matches_any(&self.hidden, path)
    }

    /// Paths whose blobs are delivered as raw bytes whatever the requested format.
    pub fn is_direct(&self, path: &SitePath) -> bool {
        matches_any(&self.direct, path)
    }

    /// Whether a child entry may appear in its parent's listing.
    pub fn is_listed(&self, path: &SitePath) -> bool {
        !self.is_hidden(path) && !self.is_denied(path)
    }
}

// An empty prefix would match every path.
fn without_root(prefixes: Vec<SitePath>) -> Vec<SitePath> {
    prefixes
        .into_iter()
        .filter(|prefix| !prefix.is_root())
        .collect()
}

fn matches_any(prefixes: &[SitePath], path: &SitePath) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}
