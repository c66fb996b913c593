use std::path::Path;

use bytes::BytesMut;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite};
use tracing::debug;

use crate::config::ServerConfig;
use crate::handler::{HandlerError, CHUNK_SIZE};
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// Streams a regular file to the client.
///
/// The file handle only exists once `open` succeeded and is dropped on
/// every return path.
pub async fn handle<W>(
    writer: &mut ResponseWriter<'_, W>,
    path: &Path,
    config: &ServerConfig,
) -> Result<StatusCode, HandlerError>
where
    W: AsyncWrite + Unpin,
{
    let mut file = File::open(path).await.map_err(|source| HandlerError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mime = config.mime_type_for(path);
    debug!(path = %path.display(), mime, "Serving file");
    writer.send_head(StatusCode::Ok, mime).await?;

    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    loop {
        buf.clear();
        if file.read_buf(&mut buf).await? == 0 {
            break;
        }
        writer.write_chunk(&buf).await?;
    }
    writer.flush().await?;

    Ok(StatusCode::Ok)
}
