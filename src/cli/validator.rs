// Command line interface parsing validators
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

// Checks that the metrics namespace is usable as a metric name prefix.
// Metric names must match [a-zA-Z_:][a-zA-Z0-9_:]*, colons are reserved for
// recording rules so we don't allow them here.
pub fn is_valid_namespace(s: &str) -> Result<String, String> {
    debug!("Ensuring that metrics.namespace is valid");

    let mut chars = s.chars();

    match chars.next() {
        None => return Err("namespace must not be empty".to_owned()),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err("namespace must start with a letter or _".to_owned());
        },
        Some(_) => {},
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("namespace may only contain letters, digits and _".to_owned());
    }

    Ok(s.to_string())
}

// Used as a validator for the argument parsing.
// We validate the parse to SocketAddr here but still continue to return a
// string. TcpListener::bind is fine with taking a string there.
pub fn is_valid_socket_addr(s: &str) -> Result<String, String> {
    debug!("Ensuring that web.listen-address is valid");

    match SocketAddr::from_str(s) {
        Ok(_)  => Ok(s.to_string()),
        Err(_) => Err(format!("'{s}' is not a valid ADDR:PORT string")),
    }
}

// Checks that the telemetry_path is valid.
// This check is extremely basic, and there may still be invalid paths that
// could be passed.
pub fn is_valid_telemetry_path(s: &str) -> Result<String, String> {
    debug!("Ensuring that web.telemetry-path is valid");

    // Ensure s isn't empty.
    if s.is_empty() {
        return Err("path must not be empty".to_owned());
    }

    // Ensure that s starts with /
    if !s.starts_with('/') {
        return Err("path must start with /".to_owned());
    }

    // Ensure that s isn't literally /
    if s == "/" {
        return Err("path must not be /".to_owned());
    }

    // The router would treat these as captures or wildcards.
    if s.contains(['{', '}', ':', '*']) {
        return Err("path must not contain any of {, }, : or *".to_owned());
    }

    Ok(s.to_string())
}

// Validates the upstream request timeout, given in whole seconds.
pub fn is_valid_timeout(s: &str) -> Result<Duration, String> {
    debug!("Ensuring that nginx.timeout is valid");

    let seconds = match s.parse::<u64>() {
        Ok(seconds) => seconds,
        Err(_)      => return Err(format!("Could not parse '{s}' as seconds")),
    };

    if seconds < 1 {
        return Err("timeout cannot be less than 1 second".into());
    }

    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn is_valid_namespace_ok() {
        let res = is_valid_namespace("nginx");
        assert!(res.is_ok());
    }

    #[test]
    fn is_valid_namespace_underscores_and_digits() {
        let res = is_valid_namespace("_nginx_edge2");
        assert!(res.is_ok());
    }

    #[test]
    fn is_valid_namespace_empty() {
        let res = is_valid_namespace("");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_namespace_leading_digit() {
        let res = is_valid_namespace("2nginx");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_namespace_invalid_chars() {
        let res = is_valid_namespace("nginx-edge");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_socket_addr_ipv4_with_port() {
        let res = is_valid_socket_addr("127.0.0.1:9113");
        assert!(res.is_ok());
    }

    #[test]
    fn is_valid_socket_addr_ipv6_with_port() {
        let res = is_valid_socket_addr("[::1]:9113");
        assert!(res.is_ok());
    }

    #[test]
    fn is_valid_socket_addr_ipv4_without_port() {
        let res = is_valid_socket_addr("127.0.0.1");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_socket_addr_ipv6_without_port() {
        let res = is_valid_socket_addr("[::1]");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_socket_addr_no_ip() {
        let res = is_valid_socket_addr("random string");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_slash() {
        let res = is_valid_telemetry_path("/");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_empty() {
        let res = is_valid_telemetry_path("");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_relative() {
        let res = is_valid_telemetry_path("metrics");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_capture() {
        let res = is_valid_telemetry_path("/{metrics}");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_telemetry_path_valid() {
        let res = is_valid_telemetry_path("/metrics");
        assert!(res.is_ok());
    }

    #[test]
    fn is_valid_timeout_ok() {
        let res = is_valid_timeout("5");
        assert_eq!(res, Ok(Duration::from_secs(5)));
    }

    #[test]
    fn is_valid_timeout_zero() {
        let res = is_valid_timeout("0");
        assert!(res.is_err());
    }

    #[test]
    fn is_valid_timeout_not_a_number() {
        let res = is_valid_timeout("5s");
        assert!(res.is_err());
    }
}
