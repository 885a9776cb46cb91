//! Slash-separated site paths addressing objects inside a snapshot.

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Bytes escaped when a path becomes a markdown link destination.
const LINK_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?');

/// A normalised site path: segments without empties, root is the empty sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SitePath {
    segments: Vec<String>,
}

impl SitePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Split on `/` and drop empty segments. `.` and `..` are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|segment: &String| !segment.is_empty())
                .collect(),
        }
    }

    /// Interpret `target` as a site-absolute path, collapsing `.` and `..`.
    /// Parent references above the root are clamped at the root.
    pub fn normalize_absolute(target: &str) -> Self {
        let mut segments: Vec<String> = Vec::new();
        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other.to_string()),
            }
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> SitePath {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    pub fn join(&self, name: &str) -> SitePath {
        let mut joined = self.clone();
        joined.segments.extend(SitePath::parse(name).segments);
        joined
    }

    pub fn join_path(&self, other: &SitePath) -> SitePath {
        let mut joined = self.clone();
        joined.segments.extend(other.segments.iter().cloned());
        joined
    }

    /// Segment-wise prefix test: `private` covers `private/x` but not `privateer`.
    pub fn starts_with(&self, prefix: &SitePath) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(lhs, rhs)| lhs == rhs)
    }

    /// Resolve `target` relative to the directory containing this path.
    /// Returns `None` when the result would climb above the root.
    pub fn resolve_sibling(&self, target: &str) -> Option<SitePath> {
        let mut segments = if target.starts_with('/') {
            Vec::new()
        } else {
            self.parent().segments
        };

        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop()?;
                }
                other => segments.push(other.to_string()),
            }
        }

        Some(Self { segments })
    }

    /// Site-absolute URL path, e.g. `/about/me`, or `/` for the root.
    pub fn to_url_path(&self) -> String {
        format!("/{self}")
    }

    /// Percent-encoded URL path, safe inside a markdown link destination.
    pub fn to_link_target(&self) -> String {
        utf8_percent_encode(&self.to_url_path(), LINK_UNSAFE).to_string()
    }
}

impl fmt::Display for SitePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
