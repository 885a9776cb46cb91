//! Template selection and safe placeholder substitution.

use crate::application::render::types::DocumentKind;

/// Template file names, relative to the template directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNames {
    pub root: String,
    pub directory: String,
    pub page: String,
}

impl Default for TemplateNames {
    fn default() -> Self {
        Self {
            root: "index.html".to_string(),
            directory: "directory.html".to_string(),
            page: "page.html".to_string(),
        }
    }
}

impl TemplateNames {
    pub fn for_kind(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Root => &self.root,
            DocumentKind::Directory => &self.directory,
            DocumentKind::Document => &self.page,
        }
    }
}

/// Substitute `$name` and `${name}` with the matching value.
///
/// `$$` collapses to `$`. Placeholders without a value and malformed ones are
/// copied through untouched.
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let lookup = |name: &str| {
        values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    };

    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(index) = rest.find('$') {
        output.push_str(&rest[..index]);
        let after = &rest[index + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            output.push('$');
            rest = tail;
            continue;
        }

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(close) = braced.find('}') {
                let name = &braced[..close];
                if is_identifier(name) {
                    if let Some(value) = lookup(name) {
                        output.push_str(value);
                        rest = &braced[close + 1..];
                        continue;
                    }
                }
            }
            output.push('$');
            rest = after;
            continue;
        }

        let len = identifier_len(after);
        match lookup(&after[..len]) {
            Some(value) if len > 0 => {
                output.push_str(value);
                rest = &after[len..];
            }
            _ => {
                output.push('$');
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}

fn identifier_len(text: &str) -> usize {
    let mut len = 0;
    for (index, ch) in text.char_indices() {
        let allowed = ch == '_' || ch.is_ascii_alphabetic() || (index > 0 && ch.is_ascii_digit());
        if !allowed {
            break;
        }
        len = index + ch.len_utf8();
    }
    len
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_len(name) == name.len()
}
