//! Text versus binary classification of resolved blobs.

use bytes::Bytes;

use crate::domain::path::SitePath;

/// Fallback MIME type for names without a known extension.
pub const TEXT_MIME: &str = "text/plain";

/// MIME types that enter the markdown pipeline.
const TEXT_CLASS: [&str; 3] = [TEXT_MIME, "text/markdown", "text/x-markdown"];

/// MIME type guessed from the file name; unknown or missing extensions read as text.
pub fn detect_mime(path: &SitePath) -> &'static str {
    path.file_name()
        .and_then(|name| mime_guess::from_path(name).first_raw())
        .unwrap_or(TEXT_MIME)
}

pub fn is_text(mime: &str) -> bool {
    TEXT_CLASS.contains(&mime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobContent {
    /// UTF-8 text headed for the rendering pipeline.
    Text(String),
    /// Bytes delivered as-is under their detected MIME type.
    Binary { mime: &'static str, bytes: Bytes },
}

/// Decide how a blob at `path` is delivered. `direct` forces raw delivery.
pub fn classify_blob(path: &SitePath, bytes: Bytes, direct: bool) -> BlobContent {
    let mime = detect_mime(path);
    if direct || !is_text(mime) {
        return BlobContent::Binary { mime, bytes };
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => BlobContent::Text(text),
        Err(_) => BlobContent::Binary { mime, bytes },
    }
}
