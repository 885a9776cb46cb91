//! Status, headers, and body for pipeline outcomes.

use axum::{
    body::Body,
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, LOCATION},
    },
    response::Response,
};
use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::application::{
    content::{CacheClass, ContentResponse},
    error::{ContentError, ErrorReport},
};
use crate::config::CacheSettings;
use crate::domain::path::SitePath;

const ERROR_SOURCE: &str = "infra::http::public";
const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const LOCATION_UNSAFE: &AsciiSet = &CONTROLS.add(b' ');

#[derive(Debug, Clone, Copy)]
pub struct ResponseAssembler {
    cache: CacheSettings,
    report_errors: bool,
}

impl ResponseAssembler {
    pub fn new(cache: CacheSettings, report_errors: bool) -> Self {
        Self {
            cache,
            report_errors,
        }
    }

    pub fn assemble(
        &self,
        path: &SitePath,
        outcome: Result<ContentResponse, ContentError>,
    ) -> Response {
        match outcome {
            Ok(ContentResponse::Document {
                content_type,
                body,
                cache,
            }) => {
                let mut response = bytes_response(StatusCode::OK, body);
                set_header(&mut response, CONTENT_TYPE, content_type);
                self.set_cache_control(&mut response, cache);
                record_outcome(&mut response, "ok");
                response
            }
            Ok(ContentResponse::Redirect { location, status }) => {
                let status =
                    StatusCode::from_u16(status.code()).unwrap_or(StatusCode::MOVED_PERMANENTLY);
                let mut response = bytes_response(status, Bytes::new());
                set_header(&mut response, LOCATION, &encode_location(&location));
                self.set_cache_control(&mut response, CacheClass::Blob);
                record_outcome(&mut response, "redirect");
                response
            }
            Err(err) => self.failure(path, err),
        }
    }

    fn failure(&self, path: &SitePath, err: ContentError) -> Response {
        let status = err.status_code();

        let body = if self.report_errors && status != StatusCode::FORBIDDEN {
            Bytes::from(format!("{}: {err}", path.to_url_path()))
        } else {
            Bytes::new()
        };
        let has_body = !body.is_empty();

        let mut response = bytes_response(status, body);
        if has_body {
            set_header(&mut response, CONTENT_TYPE, ERROR_CONTENT_TYPE);
        }
        ErrorReport::from_error(ERROR_SOURCE, status, &err).attach(&mut response);
        record_outcome(&mut response, err.outcome());
        response
    }

    fn set_cache_control(&self, response: &mut Response, class: CacheClass) {
        let max_age = match class {
            CacheClass::Blob => self.cache.blob_max_age_seconds,
            CacheClass::Tree => self.cache.tree_max_age_seconds,
        };
        set_header(response, CACHE_CONTROL, &format!("public, max-age={max_age}"));
    }
}

fn bytes_response(status: StatusCode, body: Bytes) -> Response {
    let length = body.len();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from(length));
    response
}

fn set_header(response: &mut Response, name: axum::http::HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(name, value);
    }
}

/// Outcome label of an assembled response, read back by the logging middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseOutcome(pub &'static str);

fn record_outcome(response: &mut Response, outcome: &'static str) {
    metrics::counter!("gitpage_responses_total", "outcome" => outcome).increment(1);
    response.extensions_mut().insert(ResponseOutcome(outcome));
}

/// Percent-encode bytes that may not appear in a header value.
fn encode_location(location: &str) -> String {
    utf8_percent_encode(location, LOCATION_UNSAFE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RedirectStatus;

    fn assembler(report_errors: bool) -> ResponseAssembler {
        ResponseAssembler::new(
            CacheSettings {
                blob_max_age_seconds: 600,
                tree_max_age_seconds: 60,
            },
            report_errors,
        )
    }

    fn header<'a>(response: &'a Response, name: axum::http::HeaderName) -> Option<&'a str> {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    #[test]
    fn documents_carry_length_type_and_cache() {
        let response = assembler(false).assemble(
            &SitePath::parse("about"),
            Ok(ContentResponse::Document {
                content_type: "text/html; charset=utf-8",
                body: Bytes::from("héllo"),
                cache: CacheClass::Tree,
            }),
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, CONTENT_LENGTH), Some("6"));
        assert_eq!(header(&response, CACHE_CONTROL), Some("public, max-age=60"));
        assert_eq!(
            header(&response, CONTENT_TYPE),
            Some("text/html; charset=utf-8")
        );
    }

    #[test]
    fn redirects_use_blob_lifetime_and_empty_body() {
        let response = assembler(false).assemble(
            &SitePath::parse("a/b/link"),
            Ok(ContentResponse::Redirect {
                location: "/other/doc".to_string(),
                status: RedirectStatus::Temporary,
            }),
        );
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(header(&response, LOCATION), Some("/other/doc"));
        assert_eq!(header(&response, CONTENT_LENGTH), Some("0"));
        assert_eq!(header(&response, CACHE_CONTROL), Some("public, max-age=600"));
        assert_eq!(
            response.extensions().get::<ResponseOutcome>(),
            Some(&ResponseOutcome("redirect"))
        );
    }

    #[test]
    fn forbidden_never_reports_detail() {
        let response = assembler(true).assemble(
            &SitePath::parse("private/x"),
            Err(ContentError::forbidden("private/x")),
        );
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(header(&response, CONTENT_LENGTH), Some("0"));
        assert!(response.extensions().get::<ErrorReport>().is_some());
        assert_eq!(
            response.extensions().get::<ResponseOutcome>(),
            Some(&ResponseOutcome("forbidden"))
        );
    }

    #[test]
    fn report_errors_writes_path_and_cause() {
        let response = assembler(true).assemble(
            &SitePath::parse("missing"),
            Err(ContentError::not_found("missing")),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let expected = "/missing: no object at `missing`";
        assert_eq!(
            header(&response, CONTENT_LENGTH),
            Some(expected.len().to_string().as_str())
        );
    }

    #[test]
    fn locations_are_header_safe() {
        assert_eq!(encode_location("/über uns"), "/%C3%BCber%20uns");
        assert_eq!(encode_location("/tab\there"), "/tab%09here");
        assert_eq!(
            encode_location("https://example.com/a?b=c"),
            "https://example.com/a?b=c"
        );
    }
}
