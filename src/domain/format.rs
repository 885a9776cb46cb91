//! Output formats and their selection from query parameters.

use std::{fmt, str::FromStr};

use super::query::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Html,
    Markdown,
    Plain,
    RawBinary,
}

/// Query keys recognised as format switches, in precedence order.
pub const FORMAT_KEYS: [(&str, OutputFormat); 5] = [
    ("html", OutputFormat::Html),
    ("ascii", OutputFormat::Plain),
    ("plain", OutputFormat::Plain),
    ("markdown", OutputFormat::Markdown),
    ("md", OutputFormat::Markdown),
];

impl OutputFormat {
    /// Pick the first table entry present in `query`, else `default`.
    pub fn select(query: &QueryParams, default: OutputFormat) -> OutputFormat {
        FORMAT_KEYS
            .iter()
            .find(|(key, _)| query.contains_key(key))
            .map(|(_, format)| *format)
            .unwrap_or(default)
    }

    /// Content type for textual formats; raw blobs carry their own MIME type.
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            OutputFormat::Html => Some("text/html; charset=utf-8"),
            OutputFormat::Markdown => Some("text/markdown; charset=utf-8"),
            OutputFormat::Plain => Some("text/plain; charset=utf-8"),
            OutputFormat::RawBinary => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Plain => "plain",
            OutputFormat::RawBinary => "raw",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown output format `{}`", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        FORMAT_KEYS
            .iter()
            .find(|(key, _)| *key == normalized)
            .map(|(_, format)| *format)
            .ok_or_else(|| UnknownFormat(value.to_string()))
    }
}
