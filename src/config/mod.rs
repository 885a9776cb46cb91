//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::{
    content::ContentOptions,
    render::{MarkdownExtension, TemplateNames, footer},
};
use crate::domain::{
    format::OutputFormat,
    path::SitePath,
    policy::PathPolicy,
    types::{RedirectStatus, SymlinkMode},
};

pub use cli::{CliArgs, Command, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "gitpage";
const ENV_PREFIX: &str = "GITPAGE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REPOSITORY_PATH: &str = ".";
const DEFAULT_REFERENCE: &str = "HEAD";
const DEFAULT_DENIED_PATHS: [&str; 1] = [".git"];
const DEFAULT_DIRECT_PATHS: [&str; 1] = ["static"];
const DEFAULT_BLOB_MAX_AGE_SECS: u64 = 3600;
const DEFAULT_TREE_MAX_AGE_SECS: u64 = 300;
const LIST_KEYS: [&str; 4] = [
    "content.denied",
    "content.hidden",
    "content.direct",
    "render.markdown_extensions",
];

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub repository: RepositorySettings,
    pub content: ContentSettings,
    pub cache: CacheSettings,
    pub templates: TemplateSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RepositorySettings {
    pub path: PathBuf,
    pub default_reference: String,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub default_format: OutputFormat,
    pub footer: bool,
    pub date_format: String,
    pub report_errors: bool,
    pub denied: Vec<SitePath>,
    pub hidden: Vec<SitePath>,
    pub direct: Vec<SitePath>,
    pub symlink_mode: SymlinkMode,
    pub redirect_status: RedirectStatus,
    /// Configured redirect status that was not recognised and fell back to the default.
    pub unrecognized_redirect_status: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub blob_max_age_seconds: u64,
    pub tree_max_age_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct TemplateSettings {
    /// Directory inside the repository; `None` disables templating.
    pub directory: Option<SitePath>,
    pub names: TemplateNames,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub markdown_extensions: Vec<MarkdownExtension>,
}

impl Settings {
    /// Options for the content pipeline derived from these settings.
    pub fn content_options(&self) -> ContentOptions {
        ContentOptions {
            default_reference: self.repository.default_reference.clone(),
            default_format: self.content.default_format,
            symlink_mode: self.content.symlink_mode,
            redirect_status: self.content.redirect_status,
            policy: PathPolicy::new(
                self.content.denied.clone(),
                self.content.hidden.clone(),
                self.content.direct.clone(),
            ),
            footer: self.content.footer,
            date_format: self.content.date_format.clone(),
            template_dir: self.templates.directory.clone(),
            template_names: self.templates.names.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    let mut environment = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }
    builder = builder.add_source(environment);

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    repository: RawRepositorySettings,
    content: RawContentSettings,
    cache: RawCacheSettings,
    templates: RawTemplateSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(path) = overrides.repository_path.as_ref() {
            self.repository.path = Some(path.clone());
        }
        if let Some(reference) = overrides.default_reference.as_ref() {
            self.repository.default_reference = Some(reference.clone());
        }
        if let Some(directory) = overrides.templates_directory.as_ref() {
            self.templates.directory = Some(directory.clone());
        }
        if let Some(report) = overrides.report_errors {
            self.content.report_errors = Some(report);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            repository,
            content,
            cache,
            templates,
            render,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let repository = build_repository_settings(repository)?;
        let content = build_content_settings(content)?;
        let cache = build_cache_settings(cache);
        let templates = build_template_settings(templates)?;
        let render = build_render_settings(render)?;

        Ok(Self {
            server,
            logging,
            repository,
            content,
            cache,
            templates,
            render,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_repository_settings(
    repository: RawRepositorySettings,
) -> Result<RepositorySettings, LoadError> {
    let path = repository
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPOSITORY_PATH));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "repository.path",
            "path must not be empty",
        ));
    }

    let default_reference = repository
        .default_reference
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_REFERENCE.to_string());
    if default_reference.is_empty() {
        return Err(LoadError::invalid(
            "repository.default_reference",
            "reference must not be empty",
        ));
    }

    Ok(RepositorySettings {
        path,
        default_reference,
    })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let default_format = match content.default_format {
        Some(value) => OutputFormat::from_str(&value)
            .map_err(|err| LoadError::invalid("content.default_format", err.to_string()))?,
        None => OutputFormat::Html,
    };

    let date_format = content
        .date_format
        .unwrap_or_else(|| footer::DEFAULT_DATE_FORMAT.to_string());
    if !footer::is_valid_date_format(&date_format) {
        return Err(LoadError::invalid(
            "content.date_format",
            format!("`{date_format}` is not a valid strftime pattern"),
        ));
    }

    let symlink_mode = match content.symlink_mode {
        Some(value) => SymlinkMode::from_str(&value)
            .map_err(|reason| LoadError::invalid("content.symlink_mode", reason))?,
        None => SymlinkMode::default(),
    };

    let (redirect_status, unrecognized_redirect_status) = match content.redirect_status {
        Some(value) => match RedirectStatus::parse(&value) {
            Some(status) => (status, None),
            None => (RedirectStatus::default(), Some(value)),
        },
        None => (RedirectStatus::default(), None),
    };

    let denied = site_paths(content.denied, &DEFAULT_DENIED_PATHS);
    let hidden = site_paths(content.hidden, &[]);
    let direct = site_paths(content.direct, &DEFAULT_DIRECT_PATHS);

    Ok(ContentSettings {
        default_format,
        footer: content.footer.unwrap_or(true),
        date_format,
        report_errors: content.report_errors.unwrap_or(false),
        denied,
        hidden,
        direct,
        symlink_mode,
        redirect_status,
        unrecognized_redirect_status,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> CacheSettings {
    CacheSettings {
        blob_max_age_seconds: cache
            .blob_max_age_seconds
            .unwrap_or(DEFAULT_BLOB_MAX_AGE_SECS),
        tree_max_age_seconds: cache
            .tree_max_age_seconds
            .unwrap_or(DEFAULT_TREE_MAX_AGE_SECS),
    }
}

fn build_template_settings(templates: RawTemplateSettings) -> Result<TemplateSettings, LoadError> {
    let directory = templates.directory.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| SitePath::parse(trimmed))
    });

    let defaults = TemplateNames::default();
    let names = TemplateNames {
        root: template_name(templates.root, defaults.root, "templates.root")?,
        directory: template_name(templates.directory_listing, defaults.directory, "templates.directory_listing")?,
        page: template_name(templates.page, defaults.page, "templates.page")?,
    };

    Ok(TemplateSettings { directory, names })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let markdown_extensions = match render.markdown_extensions {
        Some(list) => list
            .into_vec()
            .iter()
            .map(|name| MarkdownExtension::from_str(name))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| LoadError::invalid("render.markdown_extensions", err.to_string()))?,
        None => MarkdownExtension::ALL.to_vec(),
    };

    Ok(RenderSettings {
        markdown_extensions,
    })
}

fn template_name(
    value: Option<String>,
    default: String,
    key: &'static str,
) -> Result<String, LoadError> {
    match value {
        Some(name) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(LoadError::invalid(key, "template name must not be empty"));
            }
            Ok(trimmed.to_string())
        }
        None => Ok(default),
    }
}

fn site_paths(value: Option<RawList>, default: &[&str]) -> Vec<SitePath> {
    let entries = match value {
        Some(list) => list.into_vec(),
        None => default.iter().map(|entry| entry.to_string()).collect(),
    };
    entries
        .iter()
        .map(|entry| SitePath::parse(entry))
        .filter(|path| !path.is_root())
        .collect()
}

/// A list given either as a sequence or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawList {
    Many(Vec<String>),
    One(String),
}

impl RawList {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            RawList::Many(items) => items,
            RawList::One(joined) => joined.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRepositorySettings {
    path: Option<PathBuf>,
    default_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    default_format: Option<String>,
    footer: Option<bool>,
    date_format: Option<String>,
    report_errors: Option<bool>,
    denied: Option<RawList>,
    hidden: Option<RawList>,
    direct: Option<RawList>,
    symlink_mode: Option<String>,
    redirect_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    blob_max_age_seconds: Option<u64>,
    tree_max_age_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTemplateSettings {
    directory: Option<String>,
    root: Option<String>,
    directory_listing: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    markdown_extensions: Option<RawList>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
