use tokio::io::AsyncWrite;
use tracing::warn;

use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;

/// Writes the error page for `status` and returns `status`.
///
/// Write failures are logged and otherwise ignored; there is nothing left
/// to report them to.
pub async fn handle<W>(writer: &mut ResponseWriter<'_, W>, status: StatusCode) -> StatusCode
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = writer.send(&Response::error_page(status)).await {
        warn!(status = status.as_u16(), error = %e, "Failed to write error page");
    }
    status
}
