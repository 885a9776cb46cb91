//! Small configuration-facing enumerations shared across layers.

use std::str::FromStr;

/// Redirect status used when a symbolic link sends the client elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectStatus {
    #[default]
    Permanent,
    Found,
    Temporary,
}

impl RedirectStatus {
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::Permanent => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::Temporary => 307,
        }
    }

    /// Parse a configured value; `None` means the value is not recognised.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "301" | "permanent" | "moved_permanently" => Some(RedirectStatus::Permanent),
            "302" | "found" => Some(RedirectStatus::Found),
            "307" | "temporary" | "temporary_redirect" => Some(RedirectStatus::Temporary),
            _ => None,
        }
    }
}

/// How symbolic-link blobs are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkMode {
    /// Answer with a redirect to the site-absolute target.
    #[default]
    Redirect,
    /// Resolve the target next to the link and keep walking the snapshot.
    Follow,
}

impl FromStr for SymlinkMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redirect" => Ok(SymlinkMode::Redirect),
            "follow" => Ok(SymlinkMode::Follow),
            other => Err(format!("expected `redirect` or `follow`, got `{other}`")),
        }
    }
}
