mod config;

use std::sync::Arc;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;

use crate::application::render::types::{MarkdownExtension, RenderError, RenderService};

use config::options_for;

/// Comrak-based markdown to HTML conversion.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
}

impl ComrakRenderService {
    pub fn new(config: &RenderPipelineConfig) -> Self {
        Self {
            options: options_for(&config.extensions),
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new(&active_render_config())));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new(&RenderPipelineConfig::default())
    }
}

impl RenderService for ComrakRenderService {
    fn render_html(&self, markdown: &str) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);
        render_html_stage(root, &self.options)
    }
}

#[derive(Debug, Clone)]
pub struct RenderPipelineConfig {
    pub extensions: Vec<MarkdownExtension>,
}

impl Default for RenderPipelineConfig {
    fn default() -> Self {
        Self {
            extensions: MarkdownExtension::ALL.to_vec(),
        }
    }
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            extensions: settings.markdown_extensions.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("render service already configured")]
    AlreadyConfigured,
}

static RENDER_PIPELINE_CONFIG: OnceCell<RenderPipelineConfig> = OnceCell::new();

pub fn configure_render_service(config: RenderPipelineConfig) -> Result<(), RenderConfigError> {
    RENDER_PIPELINE_CONFIG
        .set(config)
        .map_err(|_| RenderConfigError::AlreadyConfigured)
}

fn active_render_config() -> RenderPipelineConfig {
    RENDER_PIPELINE_CONFIG.get().cloned().unwrap_or_default()
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}
