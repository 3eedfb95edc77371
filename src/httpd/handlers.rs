// handlers: This module deals with httpd route handlers.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::AppState;
use super::errors::HttpdError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use std::sync::Arc;
use tracing::debug;

// Content type of the OpenMetrics text exposition produced by
// prometheus-client.
const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

// Displays the index page. This is a page which simply links to the actual
// telemetry path.
pub(in crate::httpd) async fn index(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    debug!("Displaying index page");

    let body = state.index_page.clone();

    ([(CONTENT_TYPE, "text/html; charset=utf-8")], body)
}

// Returns the exporter output, or an InternalServerError if things fail for
// some reason.
// Collection blocks on upstream, so it is moved off the async workers.
pub(in crate::httpd) async fn metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpdError> {
    debug!("Processing metrics request");

    let exporter = Arc::clone(&state.exporter);

    let output = tokio::task::spawn_blocking(move || exporter.collect())
        .await
        .map_err(|e| HttpdError::CollectorError(e.to_string()))??;

    Ok(([(CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], Bytes::from(output)))
}
