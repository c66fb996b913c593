//! Runs executables under the served root and relays their output.
//!
//! The child's environment is handed to `Command` directly, never set on
//! this process, so concurrent requests each see only their own bindings.

use std::path::Path;
use std::process::Stdio;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWrite};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::handler::{HandlerError, CHUNK_SIZE};
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// Request headers passed through to the child, with their variable names.
const FORWARDED_HEADERS: [(&str, &str); 6] = [
    ("Host", "HTTP_HOST"),
    ("User-Agent", "HTTP_USER_AGENT"),
    ("Accept", "HTTP_ACCEPT"),
    ("Accept-Language", "HTTP_ACCEPT_LANGUAGE"),
    ("Accept-Encoding", "HTTP_ACCEPT_ENCODING"),
    ("Connection", "HTTP_CONNECTION"),
];

/// Variables set for the child on top of the inherited environment.
pub fn cgi_environment(
    request: &Request,
    script: &Path,
    config: &ServerConfig,
) -> Vec<(&'static str, String)> {
    let mut env = vec![
        ("DOCUMENT_ROOT", config.root.display().to_string()),
        ("QUERY_STRING", request.query.clone()),
        ("REMOTE_ADDR", request.peer.host.clone()),
        ("REMOTE_PORT", request.peer.port.clone()),
        ("REQUEST_METHOD", request.method.clone()),
        ("REQUEST_URI", request.uri.clone()),
        ("SCRIPT_FILENAME", script.display().to_string()),
        ("SERVER_PORT", config.port.to_string()),
    ];

    for (header, var) in FORWARDED_HEADERS {
        if let Some(value) = request.header(header) {
            env.push((var, value.to_string()));
        }
    }
    env
}

fn cgi_command(program: &Path, env: &[(&'static str, String)]) -> Command {
    let mut command = Command::new(program);
    command
        .envs(env.iter().map(|(name, value)| (*name, value)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    command
}

/// Executes `script` and copies its stdout to the client unchanged.
///
/// The script writes its own status line and headers. A script the kernel
/// refuses to execute directly (no `#!` line) is run with `/bin/sh`.
pub async fn handle<W>(
    writer: &mut ResponseWriter<'_, W>,
    request: &Request,
    script: &Path,
    config: &ServerConfig,
) -> Result<StatusCode, HandlerError>
where
    W: AsyncWrite + Unpin,
{
    let spawn_error = |source| HandlerError::Spawn {
        path: script.to_path_buf(),
        source,
    };

    let env = cgi_environment(request, script, config);
    let mut child = match cgi_command(script, &env).spawn() {
        Err(e) if e.raw_os_error() == Some(libc::ENOEXEC) => {
            debug!(script = %script.display(), "No interpreter line, running with /bin/sh");
            let mut command = cgi_command(Path::new("/bin/sh"), &env);
            command.arg(script);
            command.spawn()
        }
        spawned => spawned,
    }
    .map_err(spawn_error)?;

    let mut stdout = child.stdout.take().ok_or_else(|| {
        spawn_error(std::io::Error::other("child stdout was not captured"))
    })?;

    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    let mut relayed = 0usize;
    loop {
        buf.clear();
        let n = stdout.read_buf(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_chunk(&buf).await?;
        relayed += n;
    }
    writer.flush().await?;

    let exit = child.wait().await?;
    if exit.success() {
        debug!(script = %script.display(), bytes = relayed, "CGI finished");
    } else {
        warn!(script = %script.display(), status = %exit, "CGI exited unsuccessfully");
    }

    Ok(StatusCode::Ok)
}
