//! Markdown footer appended to every rendered document.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};

use crate::application::render::types::RenderError;
use crate::domain::{objects::Snapshot, path::SitePath};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// `true` when `pattern` only contains strftime directives chrono understands.
pub fn is_valid_date_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// `/` followed by a link per ancestor segment and the terminal segment as text.
pub fn breadcrumb(path: &SitePath) -> String {
    let mut crumb = String::from("/");
    let segments = path.segments();
    let Some((last, ancestors)) = segments.split_last() else {
        return crumb;
    };

    for (index, segment) in ancestors.iter().enumerate() {
        let target = SitePath::from_segments(segments[..=index].to_vec());
        let _ = write!(crumb, "[{segment}]({})/", target.to_link_target());
    }
    crumb.push_str(last);
    crumb
}

pub fn build_footer(
    path: &SitePath,
    snapshot: &Snapshot,
    date_format: &str,
) -> Result<String, RenderError> {
    let mut timestamp = String::new();
    write!(timestamp, "{}", snapshot.committed_at.format(date_format)).map_err(|_| {
        RenderError::Timestamp {
            pattern: date_format.to_string(),
        }
    })?;

    let commit = snapshot.canonical_ref();
    Ok(format!(
        "\n---\n[Home](/) - {} - Last modified {timestamp} by {} - Reference [{commit}](?ref={commit})\n",
        breadcrumb(path),
        snapshot.author,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone};

    use super::*;
    use crate::domain::objects::ObjectId;

    fn snapshot() -> Snapshot {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let committed_at: DateTime<FixedOffset> =
            offset.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        Snapshot {
            commit: ObjectId::new("0123456789abcdef0123456789abcdef01234567"),
            root: ObjectId::new("tree"),
            author: "Ada".to_string(),
            committed_at,
        }
    }

    #[test]
    fn breadcrumb_links_ancestors_only() {
        assert_eq!(breadcrumb(&SitePath::root()), "/");
        assert_eq!(breadcrumb(&SitePath::parse("about")), "/about");
        assert_eq!(
            breadcrumb(&SitePath::parse("a/b/c")),
            "/[a](/a)/[b](/a/b)/c"
        );
        assert_eq!(
            breadcrumb(&SitePath::parse("my notes/(draft)/x")),
            "/[my notes](/my%20notes)/[(draft)](/my%20notes/%28draft%29)/x"
        );
    }

    #[test]
    fn footer_carries_commit_metadata() {
        let footer = build_footer(&SitePath::parse("about/me"), &snapshot(), "%Y-%m-%d %H:%M %z")
            .unwrap();
        assert_eq!(
            footer,
            "\n---\n[Home](/) - /[about](/about)/me - Last modified 2024-03-01 12:30 +0200 by Ada - \
             Reference [0123456789abcdef0123456789abcdef01234567](?ref=0123456789abcdef0123456789abcdef01234567)\n"
        );
    }

    #[test]
    fn date_formats_are_validated() {
        assert!(is_valid_date_format(DEFAULT_DATE_FORMAT));
        assert!(is_valid_date_format("%d.%m.%Y"));
        assert!(!is_valid_date_format("%Q"));
    }
}
