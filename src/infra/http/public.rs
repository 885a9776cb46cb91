use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

use crate::application::{
    content::{ContentRequest, ContentService},
    error::AppError,
};
use crate::domain::{path::SitePath, query::QueryParams};

use super::{
    middleware::{log_responses, set_request_context},
    response::ResponseAssembler,
};

#[derive(Clone)]
pub struct HttpState {
    pub content: Arc<ContentService>,
    pub assembler: ResponseAssembler,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/{*path}", get(content))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
        .with_state(state)
}

async fn root(State(state): State<HttpState>, RawQuery(query): RawQuery) -> Response {
    serve(state, SitePath::root(), query).await
}

async fn content(
    State(state): State<HttpState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    serve(state, SitePath::parse(&path), query).await
}

async fn serve(state: HttpState, path: SitePath, query: Option<String>) -> Response {
    let request = ContentRequest::new(path, QueryParams::parse(query.as_deref()));
    debug!(
        target = "gitpage::http::public",
        path = %request.path,
        "serving content"
    );

    let service = Arc::clone(&state.content);
    let worker_request = request.clone();
    match tokio::task::spawn_blocking(move || service.serve(&worker_request)).await {
        Ok(outcome) => state.assembler.assemble(&request.path, outcome),
        Err(err) => AppError::unexpected(format!("content worker failed: {err}")).into_response(),
    }
}
