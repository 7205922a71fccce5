use std::collections::HashMap;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tokio::time::timeout;

use crate::http::request::{Method, Request};

/// Upper bound on the size of a request head (request line + headers).
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expecting method, target and protocol, found: {0:?}")]
    MalformedRequestLine(String),
    #[error("unknown request method in: {0:?}")]
    UnknownMethod(String),
    #[error("header line without a colon: {0:?}")]
    MalformedHeader(String),
    #[error("request head exceeds 64 KiB")]
    HeadTooLarge,
}

/// What a single line read produced.
enum Line {
    Bytes(Vec<u8>),
    Eof,
    TimedOut,
    Failed(io::Error),
}

/// Reads the next request head from `reader`.
///
/// Returns `Ok(None)` when there is no request to serve: the stream ended, a
/// read timed out, or the transport failed. A partially received head is
/// dropped in all of those cases. On success the reader is left positioned
/// right after the blank line that terminates the head, so the next call
/// picks up the following request.
pub async fn read_request<R>(
    reader: &mut R,
    idle_timeout: Option<Duration>,
) -> Result<Option<Request>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines: Vec<String> = Vec::new();
    let mut head_bytes = 0usize;

    loop {
        let remaining = MAX_HEAD_BYTES.saturating_sub(head_bytes);
        if remaining == 0 {
            return Err(ParseError::HeadTooLarge);
        }

        let line = match read_line(reader, remaining, idle_timeout).await {
            Line::Bytes(line) => line,
            Line::Eof => {
                if !lines.is_empty() {
                    tracing::debug!(lines = lines.len(), "stream ended mid-request, dropping it");
                }
                return Ok(None);
            }
            Line::TimedOut => {
                tracing::debug!(lines = lines.len(), "timed out waiting for request data");
                return Ok(None);
            }
            Line::Failed(e) => {
                tracing::debug!(error = %e, "failed reading from client");
                return Ok(None);
            }
        };

        head_bytes += line.len();
        if line.last() != Some(&b'\n') {
            // The only way to get an unterminated line short of EOF is the take() limit.
            if line.len() >= remaining {
                return Err(ParseError::HeadTooLarge);
            }
            if !lines.is_empty() {
                tracing::debug!(lines = lines.len(), "stream ended mid-request, dropping it");
            }
            return Ok(None);
        }

        let line = strip_line_ending(String::from_utf8_lossy(&line).into_owned());
        tracing::trace!(line = %line, "request line read");

        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line);
    }

    parse_request_lines(&lines).map(Some)
}

async fn read_line<R>(reader: &mut R, limit: usize, idle_timeout: Option<Duration>) -> Line
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut limited = (&mut *reader).take(limit as u64);
    let read = limited.read_until(b'\n', &mut buf);

    let result = match idle_timeout {
        Some(wait) => match timeout(wait, read).await {
            Ok(result) => result,
            Err(_) => return Line::TimedOut,
        },
        None => read.await,
    };

    match result {
        Ok(0) => Line::Eof,
        Ok(_) => Line::Bytes(buf),
        Err(e) => Line::Failed(e),
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Builds a request from the lines of a head, request line first, without the
/// blank terminator.
pub fn parse_request_lines<S: AsRef<str>>(lines: &[S]) -> Result<Request, ParseError> {
    let (request_line, header_lines) = lines
        .split_first()
        .ok_or_else(|| ParseError::MalformedRequestLine(String::new()))?;
    let request_line = request_line.as_ref();

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let &[method_str, target, version] = &parts[..] else {
        return Err(ParseError::MalformedRequestLine(request_line.to_string()));
    };

    let method = Method::from_str(method_str)
        .ok_or_else(|| ParseError::UnknownMethod(request_line.to_string()))?;

    let mut headers = HashMap::new();
    for line in header_lines {
        let line = line.as_ref();
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;

        headers.insert(
            key.trim().to_string(),
            value.trim().to_string(),
        );
    }

    Ok(Request {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
        request_line: request_line.to_string(),
        body: None,
    })
}

/// Parses a complete head held in memory. Lines are split on `\n`; parsing
/// stops at the first empty line.
pub fn parse_request_head(raw: &str) -> Result<Request, ParseError> {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .skip_while(|l| l.is_empty())
        .take_while(|l| !l.is_empty())
        .collect();

    parse_request_lines(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = parse_request_head("GET / HTTP/1.1\nHost: example.com\n\n").unwrap();

        assert_eq!(req.target, "/");
        assert_eq!(req.request_line, "GET / HTTP/1.1");
        assert_eq!(req.headers.get("Host").unwrap(), "example.com");
    }

    #[test]
    fn header_value_keeps_everything_after_first_colon() {
        let req = parse_request_head("GET / HTTP/1.1\nHost: localhost:4444\n\n").unwrap();

        assert_eq!(req.header("Host"), Some("localhost:4444"));
    }

    #[test]
    fn strips_crlf() {
        assert_eq!(strip_line_ending("abc\r\n".to_string()), "abc");
        assert_eq!(strip_line_ending("abc\n".to_string()), "abc");
        assert_eq!(strip_line_ending("abc".to_string()), "abc");
    }
}
