// status: Parsing of the NGINX stub_status text block.
//
// The upstream format is fixed:
//
//   Active connections: <active>
//   server accepts handled requests
//   <accepted> <handled> <requests>
//   Reading: <reading> Writing: <writing> Waiting: <waiting>
//
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::errors::FormatError;
use std::str;

/// Identifies one of the values carried in a stub_status report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusField {
    /// Active client connections, including waiting ones.
    Active,
    /// Total accepted client connections.
    Accepted,
    /// Total handled client connections.
    Handled,
    /// Connections reading the request header.
    Reading,
    /// Connections writing the response.
    Writing,
    /// Idle connections waiting for a request.
    Waiting,
    /// Total client requests.
    Requests,
}

/// Connection related values from stub_status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connections {
    /// Active client connections, including waiting ones.
    pub active:   u64,
    /// Total accepted client connections.
    pub accepted: u64,
    /// Total handled client connections.
    pub handled:  u64,
    /// Connections reading the request header.
    pub reading:  u64,
    /// Connections writing the response.
    pub writing:  u64,
    /// Idle connections waiting for a request.
    pub waiting:  u64,
}

/// A fully parsed stub_status report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Connection values.
    pub connections:    Connections,
    /// Total client requests.
    pub requests_total: u64,
}

impl StatusSnapshot {
    /// Returns the value of the given field.
    pub fn get(&self, field: StatusField) -> u64 {
        match field {
            StatusField::Active   => self.connections.active,
            StatusField::Accepted => self.connections.accepted,
            StatusField::Handled  => self.connections.handled,
            StatusField::Reading  => self.connections.reading,
            StatusField::Writing  => self.connections.writing,
            StatusField::Waiting  => self.connections.waiting,
            StatusField::Requests => self.requests_total,
        }
    }

    fn set(&mut self, field: StatusField, value: u64) {
        let slot = match field {
            StatusField::Active   => &mut self.connections.active,
            StatusField::Accepted => &mut self.connections.accepted,
            StatusField::Handled  => &mut self.connections.handled,
            StatusField::Reading  => &mut self.connections.reading,
            StatusField::Writing  => &mut self.connections.writing,
            StatusField::Waiting  => &mut self.connections.waiting,
            StatusField::Requests => &mut self.requests_total,
        };

        *slot = value;
    }
}

// A single expected token in the template.
enum Token {
    Literal(&'static str),
    Value(StatusField),
}

use Token::{
    Literal,
    Value,
};

// The stub_status template, one entry per line.
const TEMPLATE: [&[Token]; 4] = [
    &[
        Literal("Active"),
        Literal("connections:"),
        Value(StatusField::Active),
    ],
    &[
        Literal("server"),
        Literal("accepts"),
        Literal("handled"),
        Literal("requests"),
    ],
    &[
        Value(StatusField::Accepted),
        Value(StatusField::Handled),
        Value(StatusField::Requests),
    ],
    &[
        Literal("Reading:"),
        Value(StatusField::Reading),
        Literal("Writing:"),
        Value(StatusField::Writing),
        Literal("Waiting:"),
        Value(StatusField::Waiting),
    ],
];

// Parses a base-10 integer made up solely of ASCII digits.
fn parse_value(
    line: usize,
    position: usize,
    field: StatusField,
    token: &str,
) -> Result<u64, FormatError> {
    let expected = || format!("an integer for {field:?}");

    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::new(line, position, expected(), token));
    }

    token
        .parse::<u64>()
        .map_err(|_| FormatError::new(line, position, expected(), token))
}

// Matches a single line against its template entry, writing values into the
// snapshot as they're found.
fn match_line(
    line: usize,
    text: &str,
    template: &[Token],
    snapshot: &mut StatusSnapshot,
) -> Result<(), FormatError> {
    let mut tokens = text.split_whitespace();

    for (idx, expected) in template.iter().enumerate() {
        let position = idx + 1;

        let token = match tokens.next() {
            Some(token) => token,
            None        => {
                let expected = match expected {
                    Literal(literal) => format!("'{literal}'"),
                    Value(field)     => format!("an integer for {field:?}"),
                };

                return Err(FormatError::new(line, position, expected, ""));
            },
        };

        match expected {
            Literal(literal) => {
                if token != *literal {
                    let expected = format!("'{literal}'");
                    return Err(FormatError::new(line, position, expected, token));
                }
            },
            Value(field) => {
                let value = parse_value(line, position, *field, token)?;
                snapshot.set(*field, value);
            },
        }
    }

    if let Some(extra) = tokens.next() {
        let position = template.len() + 1;
        return Err(FormatError::new(line, position, "end of line", extra));
    }

    Ok(())
}

/// Parses the raw stub_status body into a `StatusSnapshot`.
///
/// Parsing is strict: every literal must match exactly and every value must
/// be an unsigned integer. Any deviation fails the whole parse.
pub fn parse(body: &[u8]) -> Result<StatusSnapshot, FormatError> {
    let text = str::from_utf8(body).map_err(|e| {
        FormatError::new(1, 0, "UTF-8 text", &e.to_string())
    })?;

    let mut lines = text.split('\n');

    // Built up privately and only handed out once every line has matched.
    let mut snapshot = StatusSnapshot::default();

    for (idx, template) in TEMPLATE.iter().enumerate() {
        let line = idx + 1;

        let text = match lines.next() {
            Some(text) => text,
            None       => {
                return Err(FormatError::new(line, 0, "another line", ""));
            },
        };

        match_line(line, text, template, &mut snapshot)?;
    }

    // Nothing but whitespace may follow the final line.
    for (idx, text) in lines.enumerate() {
        if let Some(extra) = text.split_whitespace().next() {
            let line = TEMPLATE.len() + idx + 1;
            return Err(FormatError::new(line, 1, "end of input", extra));
        }
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const STATUS: &str = indoc!("
        Active connections: 3
        server accepts handled requests
        10 10 15
        Reading: 0 Writing: 1 Waiting: 2
    ");

    fn expected_snapshot() -> StatusSnapshot {
        StatusSnapshot {
            connections: Connections {
                active:   3,
                accepted: 10,
                handled:  10,
                reading:  0,
                writing:  1,
                waiting:  2,
            },
            requests_total: 15,
        }
    }

    #[test]
    fn parse_ok() {
        let snapshot = parse(STATUS.as_bytes()).unwrap();

        assert_eq!(snapshot, expected_snapshot());
    }

    #[test]
    fn parse_ok_nginx_spacing() {
        // Real NGINX output has leading and trailing spaces on some lines.
        let body = "Active connections: 3 \n\
                    server accepts handled requests\n \
                    10 10 15 \n\
                    Reading: 0 Writing: 1 Waiting: 2 \n";

        let snapshot = parse(body.as_bytes()).unwrap();

        assert_eq!(snapshot, expected_snapshot());
    }

    #[test]
    fn parse_ok_crlf() {
        let body = STATUS.replace('\n', "\r\n");
        let snapshot = parse(body.as_bytes()).unwrap();

        assert_eq!(snapshot, expected_snapshot());
    }

    #[test]
    fn parse_ok_without_final_newline() {
        let body = STATUS.trim_end();
        let snapshot = parse(body.as_bytes()).unwrap();

        assert_eq!(snapshot, expected_snapshot());
    }

    #[test]
    fn parse_is_repeatable() {
        let first = parse(STATUS.as_bytes()).unwrap();
        let second = parse(STATUS.as_bytes()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn parse_large_counters() {
        let body = indoc!("
            Active connections: 1
            server accepts handled requests
            18446744073709551615 18446744073709551615 18446744073709551615
            Reading: 0 Writing: 1 Waiting: 0
        ");

        let snapshot = parse(body.as_bytes()).unwrap();

        assert_eq!(snapshot.connections.accepted, u64::MAX);
        assert_eq!(snapshot.requests_total, u64::MAX);
    }

    #[test]
    fn parse_snapshot_field_access() {
        let snapshot = parse(STATUS.as_bytes()).unwrap();

        assert_eq!(snapshot.get(StatusField::Active), 3);
        assert_eq!(snapshot.get(StatusField::Accepted), 10);
        assert_eq!(snapshot.get(StatusField::Handled), 10);
        assert_eq!(snapshot.get(StatusField::Requests), 15);
        assert_eq!(snapshot.get(StatusField::Reading), 0);
        assert_eq!(snapshot.get(StatusField::Writing), 1);
        assert_eq!(snapshot.get(StatusField::Waiting), 2);
    }

    #[test]
    fn parse_wrong_case_literal() {
        let body = STATUS.replace("Active connections", "Active Connections");
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err, FormatError {
            line:     1,
            position: 2,
            expected: "'connections:'".into(),
            found:    "Connections:".into(),
        });
    }

    #[test]
    fn parse_non_numeric_value() {
        let body = STATUS.replace("10 10 15", "10 ten 15");
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 3);
        assert_eq!(err.position, 2);
        assert_eq!(err.found, "ten");
    }

    #[test]
    fn parse_signed_value() {
        let body = STATUS.replace("Waiting: 2", "Waiting: -2");
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 4);
        assert_eq!(err.position, 6);
    }

    #[test]
    fn parse_overflowing_value() {
        let body = STATUS.replace("10 10 15", "10 10 18446744073709551616");
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 3);
        assert_eq!(err.position, 3);
    }

    #[test]
    fn parse_missing_line() {
        let body = indoc!("
            Active connections: 3
            server accepts handled requests
            10 10 15
        ");

        let err = parse(body.as_bytes()).unwrap_err();

        // The trailing newline leaves an empty fourth line.
        assert_eq!(err.line, 4);
        assert_eq!(err.position, 1);
    }

    #[test]
    fn parse_truncated_input() {
        let body = "Active connections: 3\nserver accepts handled requests";
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 3);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn parse_insufficient_tokens() {
        let body = STATUS.replace("10 10 15", "10 10");
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 3);
        assert_eq!(err.position, 3);
        assert_eq!(err.found, "");
    }

    #[test]
    fn parse_trailing_tokens() {
        let body = STATUS.replace("Waiting: 2", "Waiting: 2 Closing: 4");
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 4);
        assert_eq!(err.position, 7);
        assert_eq!(err.found, "Closing:");
    }

    #[test]
    fn parse_trailing_content() {
        let body = format!("{STATUS}extra\n");
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 5);
        assert_eq!(err.found, "extra");
    }

    #[test]
    fn parse_trailing_blank_lines() {
        let body = format!("{STATUS}\n  \n");
        let snapshot = parse(body.as_bytes()).unwrap();

        assert_eq!(snapshot, expected_snapshot());
    }

    #[test]
    fn parse_invalid_utf8() {
        let body = b"Active connections: \xff\n";
        let err = parse(body).unwrap_err();

        assert_eq!(err.line, 1);
        assert_eq!(err.expected, "UTF-8 text");
    }

    #[test]
    fn parse_empty() {
        let res = parse(b"");

        assert!(res.is_err());
    }

    #[test]
    fn parse_html_error_page() {
        let body = "<html><body>404 Not Found</body></html>";
        let err = parse(body.as_bytes()).unwrap_err();

        assert_eq!(err.line, 1);
        assert_eq!(err.position, 1);
    }
}
