use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::store::StoreError, domain::objects::EntryKind, infra::error::InfraError,
};

/// Diagnostic attached to error responses and picked up by the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure taxonomy of the content pipeline.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("reference `{reference}` could not be resolved")]
    UnknownReference { reference: String },
    #[error("no object at `{path}`")]
    NotFound { path: String },
    #[error("delivery of `{path}` is denied")]
    Forbidden { path: String },
    #[error("`{path}` is a {kind} entry and cannot be delivered")]
    UnsupportedObjectType { path: String, kind: EntryKind },
    #[error("symbolic link `{path}` has no readable target")]
    SymlinkTargetUnreadable { path: String },
    #[error("symbolic link `{path}` leads back to itself")]
    SymlinkLoop { path: String },
    #[error("symbolic link `{path}` points at missing `{target}`")]
    SymlinkTargetMissing { path: String, target: String },
    #[error("template `{name}` unavailable: {reason}")]
    TemplateUnavailable { name: String, reason: String },
    #[error("failed to render `{path}`: {message}")]
    InternalRender { path: String, message: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ContentError {
    pub fn not_found(path: impl ToString) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }

    pub fn forbidden(path: impl ToString) -> Self {
        Self::Forbidden {
            path: path.to_string(),
        }
    }

    pub fn internal_render(path: impl ToString, message: impl Into<String>) -> Self {
        Self::InternalRender {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Public status. Bad references and bad paths both read as "not here".
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContentError::UnknownReference { .. }
            | ContentError::NotFound { .. }
            | ContentError::UnsupportedObjectType { .. }
            | ContentError::SymlinkTargetUnreadable { .. }
            | ContentError::SymlinkLoop { .. }
            | ContentError::SymlinkTargetMissing { .. } => StatusCode::NOT_FOUND,
            ContentError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ContentError::TemplateUnavailable { .. }
            | ContentError::InternalRender { .. }
            | ContentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self.status_code() {
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::FORBIDDEN => "forbidden",
            _ => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, "Unexpected error occurred").into_response();
        report.attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_and_path_failures_share_not_found() {
        let errors = [
            ContentError::UnknownReference {
                reference: "nope".into(),
            },
            ContentError::not_found("a/b"),
            ContentError::UnsupportedObjectType {
                path: "vendor/lib".into(),
                kind: EntryKind::Submodule,
            },
            ContentError::SymlinkTargetUnreadable {
                path: "link".into(),
            },
        ];
        for error in errors {
            assert_eq!(error.status_code(), StatusCode::NOT_FOUND, "{error}");
        }
    }

    #[test]
    fn forbidden_and_internal_statuses() {
        assert_eq!(
            ContentError::forbidden("private").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ContentError::internal_render("doc", "boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ContentError::from(StoreError::backend("corrupt pack")).outcome(),
            "error"
        );
    }

    #[test]
    fn report_collects_source_chain() {
        let error = AppError::from(InfraError::Io(std::io::Error::other("disk gone")));
        let report =
            ErrorReport::from_error("test", StatusCode::INTERNAL_SERVER_ERROR, &error);
        assert_eq!(report.messages.first().map(String::as_str), Some("io error: disk gone"));
    }
}
