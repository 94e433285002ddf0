use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use jmxport_exposition::ExpositionFormat;
use std::sync::Arc;

use crate::error::ServerError;
use crate::state::AppState;

/// Body of the liveness endpoint
pub const HEALTHY_BODY: &str = "Exporter is healthy.\n";

/// GET <metrics_path> - scrape and serialize in the negotiated format
pub async fn metrics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    let format = ExpositionFormat::from_accept(accept);

    // Scraping reads the source synchronously
    let body = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ServerError> {
        let report = state.scraper.scrape(state.source.as_ref())?;
        if !report.diagnostics.is_empty() {
            tracing::debug!(skipped = report.diagnostics.len(), "Some attributes were not exported");
        }
        Ok(jmxport_exposition::serialize(&report.samples, format)?)
    })
    .await??;

    tracing::debug!(%format, bytes = body.len(), "Serving metrics");
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, format.content_type())],
        body,
    )
        .into_response())
}

/// GET /-/healthy - liveness check
pub async fn healthy() -> impl IntoResponse {
    (StatusCode::OK, HEALTHY_BODY)
}
