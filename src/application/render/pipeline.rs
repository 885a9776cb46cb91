use std::sync::Arc;

use tracing::warn;

use crate::application::render::{
    footer::{DEFAULT_DATE_FORMAT, build_footer},
    plain::strip_markup,
    template::{TemplateNames, substitute},
    types::{RenderError, RenderOutput, RenderRequest, RenderService, TemplateSource},
};
use crate::domain::format::OutputFormat;

/// Options that shape every rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub footer: bool,
    pub date_format: String,
    /// `None` disables templating.
    pub templates: Option<TemplateNames>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            footer: true,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            templates: None,
        }
    }
}

/// Footer, format conversion, and templating for text documents.
pub struct RenderPipeline {
    renderer: Arc<dyn RenderService>,
    options: PipelineOptions,
}

impl RenderPipeline {
    pub fn new(renderer: Arc<dyn RenderService>, options: PipelineOptions) -> Self {
        Self { renderer, options }
    }

    pub fn templating_enabled(&self) -> bool {
        self.options.templates.is_some()
    }

    pub fn render(
        &self,
        request: &RenderRequest<'_>,
        templates: &dyn TemplateSource,
    ) -> Result<RenderOutput, RenderError> {
        let footer = if self.options.footer {
            build_footer(request.path, request.snapshot, &self.options.date_format)?
        } else {
            String::new()
        };

        let content_type = request
            .format
            .content_type()
            .ok_or(RenderError::Unsupported {
                format: request.format,
            })?;

        let body = match request.format {
            OutputFormat::Markdown => format!("{}{footer}", request.markdown),
            OutputFormat::Plain => {
                let content = strip_markup(&self.renderer.render_html(request.markdown)?)?;
                let footer = self.convert_footer(&footer, |html| strip_markup(&html))?;
                format!("{content}{footer}")
            }
            OutputFormat::Html => {
                let content = self.renderer.render_html(request.markdown)?;
                let footer = self.convert_footer(&footer, Ok)?;
                self.apply_template(request, templates, &content, &footer)
            }
            OutputFormat::RawBinary => {
                return Err(RenderError::Unsupported {
                    format: request.format,
                });
            }
        };

        Ok(RenderOutput { content_type, body })
    }

    fn convert_footer(
        &self,
        footer: &str,
        finish: impl FnOnce(String) -> Result<String, RenderError>,
    ) -> Result<String, RenderError> {
        if footer.is_empty() {
            return Ok(String::new());
        }
        finish(self.renderer.render_html(footer)?)
    }

    fn apply_template(
        &self,
        request: &RenderRequest<'_>,
        templates: &dyn TemplateSource,
        content: &str,
        footer: &str,
    ) -> String {
        let Some(names) = &self.options.templates else {
            return format!("{content}{footer}");
        };

        let name = names.for_kind(request.kind);
        match templates.load(name) {
            Ok(template) => substitute(&template, &[("content", content), ("footer", footer)]),
            Err(err) => {
                metrics::counter!("gitpage_template_fallback_total").increment(1);
                warn!(
                    target = "gitpage::render::template",
                    template = name,
                    path = %request.path,
                    error = %err,
                    "Template unavailable; serving untemplated content"
                );
                format!("{content}{footer}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;
    use crate::application::{
        error::ContentError,
        render::{ComrakRenderService, DocumentKind},
    };
    use crate::domain::{
        objects::{ObjectId, Snapshot},
        path::SitePath,
    };

    struct FixedTemplates(Option<&'static str>);

    impl TemplateSource for FixedTemplates {
        fn load(&self, name: &str) -> Result<String, ContentError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| ContentError::TemplateUnavailable {
                    name: name.to_string(),
                    reason: "missing".to_string(),
                })
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            commit: ObjectId::new("abc123"),
            root: ObjectId::new("tree"),
            author: "Ada".to_string(),
            committed_at: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
                .unwrap(),
        }
    }

    fn pipeline(options: PipelineOptions) -> RenderPipeline {
        RenderPipeline::new(Arc::new(ComrakRenderService::default()), options)
    }

    fn request<'a>(
        markdown: &'a str,
        format: OutputFormat,
        path: &'a SitePath,
        snapshot: &'a Snapshot,
    ) -> RenderRequest<'a> {
        RenderRequest {
            markdown,
            format,
            kind: DocumentKind::Document,
            path,
            snapshot,
        }
    }

    #[test]
    fn markdown_is_passed_through_with_footer() {
        let path = SitePath::parse("about/me");
        let snapshot = snapshot();
        let output = pipeline(PipelineOptions::default())
            .render(
                &request("# Me\n", OutputFormat::Markdown, &path, &snapshot),
                &FixedTemplates(None),
            )
            .unwrap();
        assert_eq!(output.content_type, "text/markdown; charset=utf-8");
        assert!(output.body.starts_with("# Me\n\n---\n[Home](/)"));
        assert!(output.body.contains("Reference [abc123](?ref=abc123)"));
        assert!(!output.body.contains('<'));
    }

    #[test]
    fn plain_output_has_no_markup() {
        let path = SitePath::parse("about/me");
        let snapshot = snapshot();
        let output = pipeline(PipelineOptions::default())
            .render(
                &request("# Me & you\n", OutputFormat::Plain, &path, &snapshot),
                &FixedTemplates(None),
            )
            .unwrap();
        assert_eq!(output.content_type, "text/plain; charset=utf-8");
        assert!(output.body.starts_with("Me & you\n"));
        assert!(output.body.contains("Last modified 2024-01-02 03:04:05 +0000 by Ada"));
        assert!(!output.body.contains('<'));
    }

    #[test]
    fn html_is_templated_when_enabled() {
        let path = SitePath::parse("about/me");
        let snapshot = snapshot();
        let options = PipelineOptions {
            footer: false,
            templates: Some(TemplateNames::default()),
            ..PipelineOptions::default()
        };
        let output = pipeline(options)
            .render(
                &request("hello", OutputFormat::Html, &path, &snapshot),
                &FixedTemplates(Some("<body>$content|${footer}|$title</body>")),
            )
            .unwrap();
        assert_eq!(output.body, "<body><p>hello</p>\n||$title</body>");
    }

    #[test]
    fn missing_template_degrades_to_concatenation() {
        let path = SitePath::parse("about/me");
        let snapshot = snapshot();
        let options = PipelineOptions {
            templates: Some(TemplateNames::default()),
            ..PipelineOptions::default()
        };
        let output = pipeline(options)
            .render(
                &request("hello", OutputFormat::Html, &path, &snapshot),
                &FixedTemplates(None),
            )
            .unwrap();
        assert!(output.body.starts_with("<p>hello</p>\n<hr />"));
        assert!(output.body.contains("<a href=\"/\">Home</a>"));
    }

    #[test]
    fn raw_binary_is_not_a_render_format() {
        let path = SitePath::root();
        let snapshot = snapshot();
        let err = pipeline(PipelineOptions::default())
            .render(
                &request("x", OutputFormat::RawBinary, &path, &snapshot),
                &FixedTemplates(None),
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::Unsupported { .. }));
    }
}
