//! Rendering of text documents and listings.
//!
//! The pipeline is pure: it accepts markdown plus snapshot metadata and
//! produces the response body for the requested format. Template lookup is
//! delegated to the caller through [`TemplateSource`].

pub mod footer;
mod pipeline;
pub mod plain;
mod service;
pub mod template;
mod types;

pub use pipeline::{PipelineOptions, RenderPipeline};
pub use service::{
    ComrakRenderService, RenderConfigError, RenderPipelineConfig, configure_render_service,
    render_service,
};
pub use template::TemplateNames;
pub use types::{
    DocumentKind, MarkdownExtension, RenderError, RenderOutput, RenderRequest, RenderService,
    TemplateSource, UnknownExtension,
};
