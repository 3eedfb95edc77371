// httpd errors
#![forbid(unsafe_code)]
#![forbid(missing_docs)]
use axum::http::StatusCode;
use axum::response::{
    IntoResponse,
    Response,
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum HttpdError {
    /// Returned when Httpd cannot bind to the given address.
    #[error("failed to bind to {0}")]
    BindAddress(String),

    /// Returned by the Collector::collect trait method when there are issues.
    #[error("error collecting metrics: {0}")]
    CollectorError(String),

    /// Returned when there are issues running the Httpd.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Returned when there are issues rendering the index template.
    #[error("failed to render template")]
    RenderTemplate(#[from] askama::Error),
}

// Errors reaching a handler are reported to the client as a 500.
impl IntoResponse for HttpdError {
    fn into_response(self) -> Response {
        error!("{self}");

        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
