use std::{process, sync::Arc};

use gitpage::{
    application::{
        content::ContentService,
        error::AppError,
        render::{RenderPipelineConfig, configure_render_service, render_service},
    },
    config,
    infra::{
        error::InfraError,
        git::GitObjectStore,
        http::{self, HttpState, ResponseAssembler},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    configure_render_service(RenderPipelineConfig::from(&settings.render))
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    if let Some(value) = settings.content.unrecognized_redirect_status.as_deref() {
        warn!(
            target = "gitpage::config",
            value,
            fallback = settings.content.redirect_status.code(),
            "unrecognised redirect status; using the default"
        );
    }

    let store = GitObjectStore::open(&settings.repository.path)?;
    let content = ContentService::new(
        Arc::new(store),
        render_service(),
        settings.content_options(),
    );
    let state = HttpState {
        content: Arc::new(content),
        assembler: ResponseAssembler::new(settings.cache, settings.content.report_errors),
    };

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "gitpage::serve",
        addr = %settings.server.addr,
        repository = %settings.repository.path.display(),
        reference = %settings.repository.default_reference,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "gitpage::serve", "Shutdown requested");
}
