//! Markdown directory listings.

use crate::domain::{
    objects::{EntryKind, TreeEntry},
    path::SitePath,
    policy::PathPolicy,
};

/// Build one bullet per listable child of `directory`, sorted by child name.
///
/// Trees link with a trailing slash, blobs and links without. Hidden, denied,
/// and submodule entries are left out. `with_heading` prefixes an
/// `# Index of` line for deployments without a directory template.
pub fn build_listing(
    directory: &SitePath,
    entries: &[TreeEntry],
    policy: &PathPolicy,
    with_heading: bool,
) -> String {
    let mut visible: Vec<(&str, String)> = entries
        .iter()
        .filter_map(|entry| {
            let path = directory.join(&entry.name);
            if !policy.is_listed(&path) {
                return None;
            }
            let target = path.to_link_target();
            let line = match entry.kind {
                EntryKind::Tree => format!("* [/{path}/]({target}/)"),
                EntryKind::Blob | EntryKind::Link => format!("* [/{path}]({target})"),
                EntryKind::Submodule => return None,
            };
            Some((entry.name.as_str(), line))
        })
        .collect();
    visible.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));

    let mut listing = String::new();
    if with_heading {
        listing.push_str(&format!("# Index of {}\n\n", directory.to_url_path()));
    }
    for (_, line) in visible {
        listing.push_str(&line);
        listing.push('\n');
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::objects::ObjectId;

    fn entry(name: &str, kind: EntryKind) -> TreeEntry {
        TreeEntry::new(name, ObjectId::new(name), kind)
    }

    #[test]
    fn listing_is_sorted_independent_of_store_order() {
        let entries = [
            entry("zeta", EntryKind::Blob),
            entry("about", EntryKind::Tree),
            entry("Index", EntryKind::Blob),
            entry("link", EntryKind::Link),
        ];
        let listing = build_listing(&SitePath::root(), &entries, &PathPolicy::default(), false);
        assert_eq!(
            listing,
            "* [/Index](/Index)\n* [/about/](/about/)\n* [/link](/link)\n* [/zeta](/zeta)\n"
        );
    }

    #[test]
    fn nested_listing_uses_full_paths_and_heading() {
        let entries = [entry("me", EntryKind::Blob), entry("team", EntryKind::Tree)];
        let listing = build_listing(
            &SitePath::parse("about"),
            &entries,
            &PathPolicy::default(),
            true,
        );
        assert_eq!(
            listing,
            "# Index of /about\n\n* [/about/me](/about/me)\n* [/about/team/](/about/team/)\n"
        );
    }

    #[test]
    fn hidden_denied_and_submodules_are_omitted() {
        let policy = PathPolicy::new(
            vec![SitePath::parse("private")],
            vec![SitePath::parse("drafts")],
            Vec::new(),
        );
        let entries = [
            entry("drafts", EntryKind::Tree),
            entry("private", EntryKind::Tree),
            entry("vendor", EntryKind::Submodule),
            entry("posts", EntryKind::Tree),
        ];
        let listing = build_listing(&SitePath::root(), &entries, &policy, false);
        assert_eq!(listing, "* [/posts/](/posts/)\n");
    }

    #[test]
    fn link_destinations_are_escaped() {
        let entries = [
            entry("draft (old).md", EntryKind::Blob),
            entry("my notes", EntryKind::Tree),
        ];
        let listing = build_listing(&SitePath::root(), &entries, &PathPolicy::default(), false);
        assert_eq!(
            listing,
            "* [/draft (old).md](/draft%20%28old%29.md)\n* [/my notes/](/my%20notes/)\n"
        );
    }
}
