// httpd: This module deals with httpd related tasks.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use axum::body::Bytes;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{
    debug,
    info,
};

pub mod collector;
pub mod errors;
mod handlers;
mod templates;

use collector::Collector;
use errors::HttpdError;
use handlers::{
    index,
    metrics,
};
use templates::render_index_page;

// This AppState is used to pass the rendered index template to the index
// function and the exporter to the metrics function.
pub(self) struct AppState {
    exporter:   Arc<dyn Collector>,
    index_page: Bytes,
}

// Used for the httpd builder
#[derive(Debug)]
pub struct Server {
    bind_address:   String,
    telemetry_path: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind_address:   "0.0.0.0:9113".into(),
            telemetry_path: "/metrics".into(),
        }
    }
}

// Implements a builder pattern for configuring and running the http server.
impl Server {
    // Returns a new server instance.
    pub fn new() -> Self {
        Default::default()
    }

    // Sets the bind_address of the server.
    pub fn bind_address(mut self, bind_address: String) -> Self {
        debug!("Setting server bind_address to: {bind_address}");

        self.bind_address = bind_address;
        self
    }

    // Sets the telemetry path for the metrics.
    pub fn telemetry_path(mut self, telemetry_path: String) -> Self {
        debug!("Setting server telemetry_path to: {telemetry_path}");

        self.telemetry_path = telemetry_path;
        self
    }

    // Builds the router serving the index page and the telemetry path.
    fn router(&self, exporter: Arc<dyn Collector>) -> Result<Router, HttpdError> {
        let index_page = render_index_page(&self.telemetry_path)?;

        // This state is shared between threads and allows us to pass
        // arbitrary items to request handlers.
        let state = Arc::new(AppState {
            exporter,
            index_page,
        });

        // Route handlers
        debug!("Registering HTTP app routes");
        let app = Router::new()
            // Root of HTTP server. Provides a basic index page and link to
            // the metrics page.
            .route("/", get(index))

            // Path serving up the metrics.
            .route(&self.telemetry_path, get(metrics))

            // Enable request logging
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Ok(app)
    }

    // Run the HTTP server.
    pub async fn run(self, exporter: Arc<dyn Collector>) -> Result<(), HttpdError> {
        let app = self.router(exporter)?;

        // Create the server
        debug!("Attempting to bind to: {}", self.bind_address);
        let listener = tokio::net::TcpListener::bind(&self.bind_address)
            .await
            .map_err(|e| {
                HttpdError::BindAddress(format!("{}: {e}", self.bind_address))
            })?;

        // Run it!
        info!("Starting HTTP server on {}", self.bind_address);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
