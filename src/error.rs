//! Site-level errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised while loading or rendering site content
#[derive(Debug, Error)]
pub enum SiteError {
    /// A page file or content directory does not exist
    #[error("page not found: {0}")]
    NotFound(String),

    /// Frontmatter or page content could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SiteError {
    /// HTTP status used when this error reaches a client
    pub fn status(&self) -> StatusCode {
        match self {
            SiteError::NotFound(_) => StatusCode::NOT_FOUND,
            SiteError::Parse(_) | SiteError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            SiteError::NotFound(path) => format!("404 Not Found: {path}"),
            SiteError::Parse(msg) => format!("500 Internal Server Error: {msg}"),
            SiteError::Io(e) => {
                tracing::error!("I/O error while serving page: {}", e);
                "500 Internal Server Error".to_string()
            }
        };
        (status, body).into_response()
    }
}
