//! Error-to-HTTP response conversion.
//!
//! Wraps [`movieshelf_common::Error`] so handlers can return
//! `Result<T, AppError>` and have failures rendered as an HTML error page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use movieshelf_common::Error;

use crate::server::request_id::RequestId;
use crate::server::views;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: &RequestId) -> Self {
        self.request_id = Some(id.as_str().to_string());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Text shown to the visitor. Server-side details stay in the log.
    fn public_message(&self) -> String {
        if matches!(self.inner, Error::Upstream(_)) {
            return "The movie database returned an error. Please try again later.".to_string();
        }
        if self.status().is_server_error() {
            return "Something went wrong on our side. Please try again later.".to_string();
        }
        match &self.inner {
            Error::NotFound { entity, id } => format!("No {entity} with id {id}."),
            Error::Validation(msg) | Error::Conflict(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                code = self.inner.code(),
                error = %self.inner,
                "Request failed"
            );
        } else {
            tracing::warn!(
                status = %status,
                code = self.inner.code(),
                error = %self.inner,
                "Request rejected"
            );
        }

        let page = views::error_page(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Error"),
            &self.public_message(),
            self.request_id.as_deref(),
        );

        (status, Html(page)).into_response()
    }
}
