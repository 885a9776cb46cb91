//! HTML to bare text conversion for the plain output format.

use std::{cell::RefCell, rc::Rc};

use lol_html::{RewriteStrSettings, doc_text, rewrite_str};

use crate::application::render::types::RenderError;

/// Drop every tag from `html`, keeping text nodes with entities decoded.
pub fn strip_markup(html: &str) -> Result<String, RenderError> {
    let collected = Rc::new(RefCell::new(String::with_capacity(html.len())));

    rewrite_str(
        html,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!({
                let collected = Rc::clone(&collected);
                move |chunk| {
                    collected.borrow_mut().push_str(chunk.as_str());
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })?;

    let text = collected.borrow();
    Ok(html_escape::decode_html_entities(text.as_str()).into_owned())
}
