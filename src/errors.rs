// errors: Error types for the exporter and for individual scrapes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::httpd::errors::HttpdError;
use thiserror::Error;

// Longest fragment of upstream input we'll echo back in a FormatError.
const MAX_FRAGMENT_LEN: usize = 32;

/// Errors that stop the exporter from starting or running.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Returned when a required argument wasn't available after parsing.
    #[error("{0} was not set.")]
    ArgNotSet(String),

    /// Returned when the upstream HTTP client cannot be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Returned when the registry cannot be encoded into text.
    #[error("failed to encode metrics")]
    EncodeError(#[from] std::fmt::Error),

    /// Returned when the HTTP server fails.
    #[error("{0}")]
    HttpdError(#[from] HttpdError),

    /// Returned when the async runtime cannot be started.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Everything that can go wrong during a single scrape of stub_status.
/// None of these are fatal, the collector logs them and emits no samples.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The endpoint couldn't be turned into a request, usually a bad URL.
    #[error("failed to create a GET request for '{endpoint}': {source}")]
    RequestConstruction {
        endpoint: String,
        source:   reqwest::Error,
    },

    /// Connection refused, DNS failure, timeouts and friends.
    #[error("failed to GET {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source:   reqwest::Error,
    },

    /// Upstream answered with something other than 200 OK.
    #[error("expected 200 response, got {status}")]
    UnexpectedStatus {
        status: u16,
    },

    /// The response body couldn't be read to the end.
    #[error("failed to read the response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// The response body didn't match the stub_status layout.
    #[error("failed to parse response body: {0}")]
    Format(#[from] FormatError),

    /// A gauge value too large to be exposed as an integer gauge.
    #[error("value {value} for gauge {name} is out of range")]
    GaugeOutOfRange {
        name:  String,
        value: u64,
    },
}

/// Describes where the stub_status text diverged from the expected layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("line {line}, token {position}: expected {expected}, found '{found}'")]
pub struct FormatError {
    /// 1-based line number.
    pub line: usize,

    /// 1-based token position within the line, 0 when the line is missing.
    pub position: usize,

    /// Human readable description of what should have been there.
    pub expected: String,

    /// The offending fragment, truncated.
    pub found: String,
}

impl FormatError {
    /// Returns a new FormatError, truncating `found` if it's too long.
    pub fn new(
        line: usize,
        position: usize,
        expected: impl Into<String>,
        found: &str,
    ) -> Self {
        let found = match found.char_indices().nth(MAX_FRAGMENT_LEN) {
            Some((idx, _)) => format!("{}...", &found[..idx]),
            None           => found.to_string(),
        };

        Self {
            line,
            position,
            expected: expected.into(),
            found,
        }
    }
}
