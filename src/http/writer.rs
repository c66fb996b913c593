use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.0";

/// Serializes the status line and headers, blank line included.
pub fn serialize_head<'a, I>(status: StatusCode, headers: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = serialize_head(
        resp.status,
        resp.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    buf.extend_from_slice(&resp.body);
    buf
}

/// Writes a response onto the client stream.
///
/// Tracks whether any response bytes have been attempted. Once that has
/// happened the status line can no longer be changed, so callers must not
/// fall back to an error page.
pub struct ResponseWriter<'a, W> {
    stream: &'a mut W,
    started: bool,
}

impl<'a, W> ResponseWriter<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(stream: &'a mut W) -> Self {
        Self {
            stream,
            started: false,
        }
    }

    /// Whether the response has begun.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Sends a complete response and flushes it.
    pub async fn send(&mut self, response: &Response) -> std::io::Result<()> {
        self.write_chunk(&serialize_response(response)).await?;
        self.flush().await
    }

    /// Sends a status line with a single `Content-Type` header.
    pub async fn send_head(
        &mut self,
        status: StatusCode,
        content_type: &str,
    ) -> std::io::Result<()> {
        let head = serialize_head(status, [("Content-Type", content_type)]);
        self.write_chunk(&head).await
    }

    /// Writes raw bytes; the response counts as started from here on.
    pub async fn write_chunk(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.started = true;
        self.stream.write_all(bytes).await
    }

    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush().await
    }
}
