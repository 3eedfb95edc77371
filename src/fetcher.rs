// fetcher: Retrieves the raw stub_status report from NGINX.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::errors::{
    ExporterError,
    ScrapeError,
};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Performs one blocking GET per call against the stub_status endpoint.
///
/// The underlying client is shared between calls so that connections can be
/// pooled, but every request and response is owned by the call that made it.
#[derive(Clone, Debug)]
pub struct StatusFetcher {
    client: Client,
}

impl StatusFetcher {
    /// Returns a new fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ExporterError> {
        debug!("Building HTTP client with timeout: {timeout:?}");

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ExporterError::ClientBuild)?;

        Ok(Self {
            client,
        })
    }

    /// Fetches the body of `endpoint`, which must answer with 200 OK.
    pub fn fetch(&self, endpoint: &str) -> Result<Vec<u8>, ScrapeError> {
        debug!("Fetching stub_status from: {endpoint}");

        let request = self.client
            .get(endpoint)
            .build()
            .map_err(|source| ScrapeError::RequestConstruction {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let response = self.client
            .execute(request)
            .map_err(|source| ScrapeError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        // The response is dropped on return, closing the connection rather
        // than returning it to the pool with an unread body.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(ScrapeError::BodyRead)?;

        debug!("Fetched {} bytes from {endpoint}", body.len());

        Ok(body.to_vec())
    }
}
