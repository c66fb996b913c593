use std::collections::HashMap;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::request::{split_target, Peer, Request};

/// Longest line, terminator included, the parser will buffer.
pub const MAX_LINE: usize = 8192;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing request line")]
    MissingRequestLine,
    #[error("request line has no target")]
    MissingTarget,
    #[error("malformed header line {0:?}")]
    InvalidHeader(String),
    #[error("line longer than {} bytes", MAX_LINE)]
    LineTooLong,
    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads one request (request line plus headers) off `reader`.
///
/// Stops at the first blank line or at end of stream, whichever comes
/// first. Nothing is written back to the client.
pub async fn parse_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader)
        .await?
        .ok_or(ParseError::MissingRequestLine)?;
    let (method, target) = parse_request_line(&line)?;
    let (uri, query) = split_target(target);

    let mut headers = HashMap::new();
    while let Some(line) = read_line(reader).await? {
        if line.is_empty() {
            break;
        }
        let (name, value) = parse_header_line(&line)?;
        headers.insert(name.to_string(), value.to_string());
    }

    Ok(Request {
        peer: Peer::default(),
        method: method.to_string(),
        uri: uri.to_string(),
        query: query.to_string(),
        headers,
        path: None,
    })
}

/// Splits a request line into method and target.
///
/// The version token, if any, is ignored.
pub fn parse_request_line(line: &str) -> Result<(&str, &str), ParseError> {
    let mut parts = line.split_whitespace();
    let method = parts.next().ok_or(ParseError::MissingRequestLine)?;
    let target = parts.next().ok_or(ParseError::MissingTarget)?;
    Ok((method, target))
}

/// Splits `Name: value` on the first colon.
///
/// Leading whitespace is trimmed from the value; the name is kept as sent.
pub fn parse_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
    let value = value.trim_start();

    if name.is_empty() || value.is_empty() {
        return Err(ParseError::InvalidHeader(line.to_string()));
    }
    Ok((name, value))
}

/// Reads a single line without its CRLF/LF terminator.
///
/// Returns `None` at end of stream.
async fn read_line<R>(reader: &mut R) -> Result<Option<String>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = reader
        .take(MAX_LINE as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;

    if n == 0 {
        return Ok(None);
    }
    if buf.len() > MAX_LINE {
        return Err(ParseError::LineTooLong);
    }

    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
