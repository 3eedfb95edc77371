//
// stub_status_exporter
//
// An exporter for Prometheus, exporting NGINX metrics as reported by the
// stub_status module.
//
#![forbid(unsafe_code)]
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use tracing::{
    debug,
    error,
};
use tracing_subscriber::EnvFilter;

mod cli;
mod errors;
mod exporter;
mod fetcher;
mod httpd;
mod macros;
mod status;

use errors::ExporterError;
use exporter::{
    Exporter,
    StubStatusCollector,
};
use fetcher::StatusFetcher;

// Sets up logging, honouring RUST_LOG if it's set.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}

// Returns an owned String argument, or an error if it's missing.
fn required_string(
    matches: &clap::ArgMatches,
    name: &str,
) -> Result<String, ExporterError> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| ExporterError::ArgNotSet(name.to_owned()))
}

fn run() -> Result<(), ExporterError> {
    // Parse the command line arguments.
    let matches = cli::parse_args();

    // An empty endpoint is accepted here and reported on the first scrape.
    let endpoint = matches
        .get_one::<String>("NGINX_SCRAPE_URI")
        .cloned()
        .unwrap_or_default();
    debug!("nginx.scrape-uri: {endpoint}");

    let timeout = *matches
        .get_one::<Duration>("NGINX_TIMEOUT")
        .ok_or_else(|| ExporterError::ArgNotSet("NGINX_TIMEOUT".into()))?;
    debug!("nginx.timeout: {timeout:?}");

    let namespace = required_string(&matches, "METRICS_NAMESPACE")?;
    debug!("metrics.namespace: {namespace}");

    let bind_address = required_string(&matches, "WEB_LISTEN_ADDRESS")?;
    debug!("web.listen-address: {bind_address}");

    let telemetry_path = required_string(&matches, "WEB_TELEMETRY_PATH")?;
    debug!("web.telemetry-path: {telemetry_path}");

    // The blocking HTTP client must be built outside of the async runtime.
    let fetcher = StatusFetcher::new(timeout)?;
    let collector = StubStatusCollector::new(&namespace, endpoint, fetcher);
    let exporter = Arc::new(Exporter::new(collector));

    let server = httpd::Server::new()
        .bind_address(bind_address)
        .telemetry_path(telemetry_path);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server.run(exporter))?;

    Ok(())
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        error!("{e}");
        exit(1);
    }
}
