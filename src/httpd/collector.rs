// collector: The seam between the HTTP server and the metrics exporter.
#![forbid(unsafe_code)]
use super::errors::HttpdError;

// This trait must be implemented so the HTTPd can export metrics.
// Implementations may block, the server calls them from a blocking thread.
pub trait Collector: Send + Sync {
    fn collect(&self) -> Result<Vec<u8>, HttpdError>;
}
