//! Response handlers and the dispatcher that picks one.
//!
//! Every handler writes a complete response onto a [`ResponseWriter`] and
//! reports the status it produced. A handler error raised before any bytes
//! went out is turned into an error page here; after that the status line
//! is gone and the error is passed up so the connection can be dropped.

pub mod browse;
pub mod cgi;
pub mod error;
pub mod file;

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWrite;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// Size of the buffer used when streaming files and CGI output.
pub const CHUNK_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to scan directory {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed while writing response: {0}")]
    Stream(#[from] std::io::Error),
}

impl HandlerError {
    /// Status to report when the error happens before the response starts.
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Scan { .. } => StatusCode::NotFound,
            HandlerError::Open { .. } | HandlerError::Spawn { .. } | HandlerError::Stream(_) => {
                StatusCode::InternalServerError
            }
        }
    }
}

/// The handler a resolved path is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Browse,
    Cgi,
    File,
    NotFound,
}

/// Classifies a path for this process. The checks run in a fixed order:
/// directory first, then execute access, then read access.
pub async fn classify(path: &Path) -> Route {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(_) => return Route::NotFound,
    };
    if meta.is_dir() {
        return Route::Browse;
    }

    let owned = path.to_path_buf();
    let access = tokio::task::spawn_blocking(move || {
        (accessible(&owned, libc::X_OK), accessible(&owned, libc::R_OK))
    })
    .await;

    match access {
        Ok((true, _)) => Route::Cgi,
        Ok((false, true)) => Route::File,
        Ok((false, false)) => Route::NotFound,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Access check did not complete");
            Route::NotFound
        }
    }
}

/// Asks the kernel whether this process may use `path` with `mode`.
fn accessible(path: &Path, mode: libc::c_int) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is NUL-terminated and outlives the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

/// Runs exactly one handler for a resolved request.
///
/// Returns `Err` only when the response had already begun, in which case
/// nothing more can be sent on this connection.
pub async fn dispatch<W>(
    writer: &mut ResponseWriter<'_, W>,
    request: &Request,
    config: &ServerConfig,
) -> Result<StatusCode, HandlerError>
where
    W: AsyncWrite + Unpin,
{
    let Some(path) = request.resolved_path() else {
        return Ok(error::handle(writer, StatusCode::NotFound).await);
    };

    let route = classify(path).await;
    info!(
        peer = %request.peer,
        path = %path.display(),
        route = ?route,
        "Dispatching request"
    );

    let result = match route {
        Route::Browse => browse::handle(writer, request, path).await,
        Route::Cgi => cgi::handle(writer, request, path, config).await,
        Route::File => file::handle(writer, path, config).await,
        Route::NotFound => Ok(error::handle(writer, StatusCode::NotFound).await),
    };

    match result {
        Err(e) if !writer.started() => {
            warn!(
                peer = %request.peer,
                error = %e,
                "Handler failed before responding"
            );
            Ok(error::handle(writer, e.status()).await)
        }
        other => other,
    }
}
