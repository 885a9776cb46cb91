use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::application::error::ContentError;
use crate::domain::{format::OutputFormat, objects::Snapshot, path::SitePath};

/// What kind of document is being rendered; drives template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Listing of the root tree.
    Root,
    /// Listing of any other tree.
    Directory,
    /// A text blob.
    Document,
}

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Markdown source: blob text or a generated listing.
    pub markdown: &'a str,
    pub format: OutputFormat,
    pub kind: DocumentKind,
    /// Site path that was resolved; feeds the breadcrumb.
    pub path: &'a SitePath,
    pub snapshot: &'a Snapshot,
}

/// Rendered body together with the content type it must be served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("markdown conversion failed: {message}")]
    Markdown { message: String },
    #[error("document processing failed: {message}")]
    Document { message: String },
    #[error("timestamp formatting failed for pattern `{pattern}`")]
    Timestamp { pattern: String },
    #[error("format `{format}` is not rendered from markdown")]
    Unsupported { format: OutputFormat },
}

/// Markdown to HTML conversion. Implementations must be pure.
pub trait RenderService: Send + Sync {
    fn render_html(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Template lookup within the snapshot being served.
pub trait TemplateSource {
    /// Load the template text called `name`; failures surface as
    /// [`ContentError::TemplateUnavailable`].
    fn load(&self, name: &str) -> Result<String, ContentError>;
}

/// Optional comrak extensions selectable by name in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkdownExtension {
    Table,
    Strikethrough,
    Autolink,
    Tasklist,
    Footnotes,
    Superscript,
    DescriptionLists,
}

impl MarkdownExtension {
    pub const ALL: [MarkdownExtension; 7] = [
        MarkdownExtension::Table,
        MarkdownExtension::Strikethrough,
        MarkdownExtension::Autolink,
        MarkdownExtension::Tasklist,
        MarkdownExtension::Footnotes,
        MarkdownExtension::Superscript,
        MarkdownExtension::DescriptionLists,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MarkdownExtension::Table => "table",
            MarkdownExtension::Strikethrough => "strikethrough",
            MarkdownExtension::Autolink => "autolink",
            MarkdownExtension::Tasklist => "tasklist",
            MarkdownExtension::Footnotes => "footnotes",
            MarkdownExtension::Superscript => "superscript",
            MarkdownExtension::DescriptionLists => "description_lists",
        }
    }
}

impl fmt::Display for MarkdownExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown markdown extension `{0}`")]
pub struct UnknownExtension(pub String);

impl FromStr for MarkdownExtension {
    type Err = UnknownExtension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|ext| ext.as_str() == needle)
            .ok_or_else(|| UnknownExtension(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_names_parse_loosely() {
        assert_eq!(
            "Description-Lists".parse::<MarkdownExtension>(),
            Ok(MarkdownExtension::DescriptionLists)
        );
        assert_eq!("table".parse(), Ok(MarkdownExtension::Table));
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let err = "toc".parse::<MarkdownExtension>().unwrap_err();
        assert_eq!(err.to_string(), "unknown markdown extension `toc`");
    }
}
