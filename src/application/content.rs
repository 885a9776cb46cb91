//! Request-level orchestration of the content pipeline.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::application::{
    classify::{BlobContent, classify_blob},
    error::ContentError,
    listing::build_listing,
    render::{
        DocumentKind, PipelineOptions, RenderPipeline, RenderRequest, RenderService,
        TemplateNames, TemplateSource,
    },
    resolve::{Node, PathResolver, ReferenceResolver, Resolution},
    store::ObjectStore,
};
use crate::domain::{
    format::OutputFormat,
    objects::{ObjectId, Snapshot},
    path::SitePath,
    policy::PathPolicy,
    query::QueryParams,
    types::{RedirectStatus, SymlinkMode},
};

/// Query key selecting the reference to serve from.
pub const REFERENCE_KEY: &str = "ref";

#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub default_reference: String,
    pub default_format: OutputFormat,
    pub symlink_mode: SymlinkMode,
    pub redirect_status: RedirectStatus,
    pub policy: PathPolicy,
    pub footer: bool,
    pub date_format: String,
    /// Directory holding templates inside the repository; `None` disables templating.
    pub template_dir: Option<SitePath>,
    pub template_names: TemplateNames,
}

impl Default for ContentOptions {
    fn default() -> Self {
        let pipeline = PipelineOptions::default();
        Self {
            default_reference: "HEAD".to_string(),
            default_format: OutputFormat::Html,
            symlink_mode: SymlinkMode::default(),
            redirect_status: RedirectStatus::default(),
            policy: PathPolicy::default(),
            footer: pipeline.footer,
            date_format: pipeline.date_format,
            template_dir: None,
            template_names: TemplateNames::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub path: SitePath,
    pub query: QueryParams,
}

impl ContentRequest {
    pub fn new(path: SitePath, query: QueryParams) -> Self {
        Self { path, query }
    }
}

/// Which max-age applies to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    Blob,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentResponse {
    Document {
        content_type: &'static str,
        body: Bytes,
        cache: CacheClass,
    },
    Redirect {
        location: String,
        status: RedirectStatus,
    },
}

pub struct ContentService {
    store: Arc<dyn ObjectStore>,
    pipeline: RenderPipeline,
    options: ContentOptions,
}

impl ContentService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        renderer: Arc<dyn RenderService>,
        options: ContentOptions,
    ) -> Self {
        let pipeline = RenderPipeline::new(
            renderer,
            PipelineOptions {
                footer: options.footer,
                date_format: options.date_format.clone(),
                templates: options
                    .template_dir
                    .as_ref()
                    .map(|_| options.template_names.clone()),
            },
        );
        Self {
            store,
            pipeline,
            options,
        }
    }

    pub fn options(&self) -> &ContentOptions {
        &self.options
    }

    /// Run one request through the pipeline. Blocks on store reads.
    pub fn serve(&self, request: &ContentRequest) -> Result<ContentResponse, ContentError> {
        let store = self.store.as_ref();
        let policy = &self.options.policy;

        if policy.is_denied(&request.path) {
            return Err(ContentError::forbidden(&request.path));
        }

        let snapshot = ReferenceResolver::new(store, &self.options.default_reference)
            .resolve(request.query.value(REFERENCE_KEY))?;

        let resolver = PathResolver::new(store, self.options.symlink_mode);
        let resolved = match resolver.resolve(&snapshot, &request.path)? {
            Resolution::Redirect(location) => {
                debug!(
                    target = "gitpage::content",
                    path = %request.path,
                    location = %location,
                    "symbolic link answered with redirect"
                );
                return Ok(ContentResponse::Redirect {
                    location,
                    status: self.options.redirect_status,
                });
            }
            Resolution::Object(resolved) => resolved,
        };

        if policy.is_denied(&resolved.path) {
            return Err(ContentError::forbidden(&request.path));
        }

        let format = OutputFormat::select(&request.query, self.options.default_format);
        let templates = SnapshotTemplates {
            resolver: &resolver,
            store,
            snapshot: &snapshot,
            directory: self.options.template_dir.as_ref(),
        };

        match resolved.node {
            Node::Unsupported(kind) => Err(ContentError::UnsupportedObjectType {
                path: resolved.path.to_string(),
                kind,
            }),
            Node::Tree(id) => {
                let entries = store.tree(&id)?;
                let listing = build_listing(
                    &resolved.path,
                    &entries,
                    policy,
                    !self.pipeline.templating_enabled(),
                );
                let kind = if resolved.path.is_root() {
                    DocumentKind::Root
                } else {
                    DocumentKind::Directory
                };
                self.render(&listing, format, kind, &resolved.path, &snapshot, &templates)
                    .map(|(content_type, body)| ContentResponse::Document {
                        content_type,
                        body,
                        cache: CacheClass::Tree,
                    })
            }
            Node::Blob(id) => {
                let bytes = store.blob(&id)?;
                let direct = policy.is_direct(&resolved.path);
                let (content_type, body) = match classify_blob(&resolved.path, bytes, direct) {
                    BlobContent::Binary { mime, bytes } => (mime, bytes),
                    BlobContent::Text(text) => self.render(
                        &text,
                        format,
                        DocumentKind::Document,
                        &resolved.path,
                        &snapshot,
                        &templates,
                    )?,
                };
                Ok(ContentResponse::Document {
                    content_type,
                    body,
                    cache: CacheClass::Blob,
                })
            }
        }
    }

    fn render(
        &self,
        markdown: &str,
        format: OutputFormat,
        kind: DocumentKind,
        path: &SitePath,
        snapshot: &Snapshot,
        templates: &dyn TemplateSource,
    ) -> Result<(&'static str, Bytes), ContentError> {
        let request = RenderRequest {
            markdown,
            format,
            kind,
            path,
            snapshot,
        };
        let output = self
            .pipeline
            .render(&request, templates)
            .map_err(|err| ContentError::internal_render(path, err.to_string()))?;
        Ok((output.content_type, Bytes::from(output.body)))
    }
}

/// Templates read from the snapshot being served.
struct SnapshotTemplates<'a> {
    resolver: &'a PathResolver<'a>,
    store: &'a dyn ObjectStore,
    snapshot: &'a Snapshot,
    directory: Option<&'a SitePath>,
}

impl TemplateSource for SnapshotTemplates<'_> {
    fn load(&self, name: &str) -> Result<String, ContentError> {
        let unavailable = |reason: String| ContentError::TemplateUnavailable {
            name: name.to_string(),
            reason,
        };

        let directory = self
            .directory
            .ok_or_else(|| unavailable("templating is disabled".to_string()))?;
        let path = directory.join_path(&SitePath::parse(name));
        let id: ObjectId = self
            .resolver
            .find_blob(self.snapshot, &path)
            .map_err(|err| unavailable(err.to_string()))?;
        let bytes = self
            .store
            .blob(&id)
            .map_err(|err| unavailable(err.to_string()))?;
        String::from_utf8(bytes.to_vec()).map_err(|err| unavailable(err.to_string()))
    }
}
