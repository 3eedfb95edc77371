//!
//! Command line interface parsing
//!
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use clap::{
    crate_description,
    crate_name,
    crate_version,
    Arg,
    ArgMatches,
    Command,
};
use tracing::debug;

mod validator;

// Create a clap app
fn create_app() -> Command {
    debug!("Creating clap app");

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .term_width(80)
        .arg(
            // Not validated, a bad or missing endpoint shows up as a failed
            // scrape.
            Arg::new("NGINX_SCRAPE_URI")
                .env("NGINX_STATUS_ENDPOINT")
                .long("nginx.scrape-uri")
                .value_name("URL")
                .help("URL of the NGINX stub_status page, e.g. \
                       http://127.0.0.1:80/stub_status")
        )
        .arg(
            Arg::new("NGINX_TIMEOUT")
                .env("NGINX_TIMEOUT")
                .hide_env_values(true)
                .long("nginx.timeout")
                .value_name("SECONDS")
                .help("Timeout for requests to the stub_status page.")
                .default_value("30")
                .value_parser(validator::is_valid_timeout)
        )
        .arg(
            Arg::new("METRICS_NAMESPACE")
                .env("METRICS_NAMESPACE")
                .hide_env_values(true)
                .long("metrics.namespace")
                .value_name("NAMESPACE")
                .help("Prefix for the names of exported metrics.")
                .default_value("nginx")
                .value_parser(validator::is_valid_namespace)
        )
        .arg(
            Arg::new("WEB_LISTEN_ADDRESS")
                .env("WEB_LISTEN_ADDRESS")
                .hide_env_values(true)
                .long("web.listen-address")
                .value_name("[ADDR:PORT]")
                .help("Address on which to expose metrics and web interface.")
                .default_value("0.0.0.0:9113")
                .value_parser(validator::is_valid_socket_addr)
        )
        .arg(
            Arg::new("WEB_TELEMETRY_PATH")
                .env("WEB_TELEMETRY_PATH")
                .hide_env_values(true)
                .long("web.telemetry-path")
                .value_name("PATH")
                .help("Path under which to expose metrics.")
                .default_value("/metrics")
                .value_parser(validator::is_valid_telemetry_path)
        )
}

// Parses the command line arguments and returns the matches.
pub fn parse_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    create_app().get_matches()
}
