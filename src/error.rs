//! Common error type and alias.
//!
//! Every variant surfaces to HTTP callers as an opaque `500` with a short
//! `{"error": ...}` body.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Could not parse JSON from model response: {0}")]
    Extract(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Deploy error: {0}")]
    Deploy(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {}", self);
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_carries_status_and_body() {
        let err = AppError::Upstream { status: 401, body: "bad key".into() };
        assert_eq!(err.to_string(), "Completion API returned 401: bad key");
    }

    #[test]
    fn every_variant_is_a_server_error() {
        let resp = AppError::Template("missing".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let resp = AppError::Extract(parse).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
