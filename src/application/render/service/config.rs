use comrak::options::Options;

use crate::application::render::types::MarkdownExtension;

pub(crate) fn options_for(extensions: &[MarkdownExtension]) -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options, extensions);
    options
}

fn configure_extensions(options: &mut Options<'static>, extensions: &[MarkdownExtension]) {
    let ext = &mut options.extension;
    for extension in extensions {
        match extension {
            MarkdownExtension::Table => ext.table = true,
            MarkdownExtension::Strikethrough => ext.strikethrough = true,
            MarkdownExtension::Autolink => ext.autolink = true,
            MarkdownExtension::Tasklist => ext.tasklist = true,
            MarkdownExtension::Footnotes => ext.footnotes = true,
            MarkdownExtension::Superscript => ext.superscript = true,
            MarkdownExtension::DescriptionLists => ext.description_lists = true,
        }
    }

    // Repository content is authored by the site owner; raw HTML passes through.
    let render = &mut options.render;
    render.r#unsafe = true;
}
