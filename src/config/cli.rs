use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the gitpage binary.
#[derive(Debug, Parser)]
#[command(
    name = "gitpage",
    version,
    about = "Serve a website straight out of a git repository"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "GITPAGE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the repository to serve from.
    #[arg(long = "repository-path", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub repository_path: Option<PathBuf>,

    /// Override the reference served when a request names none.
    #[arg(long = "default-reference", value_name = "REF")]
    pub default_reference: Option<String>,

    /// Override the in-repository template directory; empty disables templating.
    #[arg(long = "templates-directory", value_name = "PATH")]
    pub templates_directory: Option<String>,

    /// Toggle diagnostic error bodies.
    #[arg(
        long = "report-errors",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub report_errors: Option<bool>,
}
