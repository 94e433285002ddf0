//! Request-time failures of the exposition server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jmxport_collector::ScrapeError;
use jmxport_exposition::FormatError;
use thiserror::Error;

/// Anything that turns a metrics request into a 500
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Serialization failed: {0}")]
    Format(#[from] FormatError),

    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Metrics request failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
