use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::handler;
use crate::http::parser::parse_request;
use crate::http::request::{Peer, Request};
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;
use crate::resolve::resolve;

/// Owns one accepted connection from the first byte read until close.
pub struct Connection<S> {
    stream: BufReader<S>,
    peer: Peer,
    config: Arc<ServerConfig>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Resolving(Request),
    Dispatching(Request),
    Failed(StatusCode),
    Responded(StatusCode),
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: Peer, config: Arc<ServerConfig>) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer,
            config,
            state: ConnectionState::Reading,
        }
    }

    /// Serves exactly one request and closes the connection.
    ///
    /// Failures before the response starts become an error page. An error
    /// is returned only when a response was already under way; the stream
    /// is dropped either way.
    pub async fn run(mut self) -> anyhow::Result<StatusCode> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Reading);
            self.state = match state {
                ConnectionState::Reading => match parse_request(&mut self.stream).await {
                    Ok(mut request) => {
                        request.peer = self.peer.clone();
                        debug!(
                            peer = %self.peer,
                            method = %request.method,
                            uri = %request.uri,
                            query = %request.query,
                            headers = request.headers.len(),
                            "Parsed request"
                        );
                        ConnectionState::Resolving(request)
                    }
                    Err(e) => {
                        warn!(peer = %self.peer, error = %e, "Failed to parse request");
                        ConnectionState::Failed(StatusCode::BadRequest)
                    }
                },

                ConnectionState::Resolving(mut request) => {
                    match resolve(&request.uri, &self.config.root).await {
                        Ok(path) => {
                            debug!(peer = %self.peer, path = %path.display(), "Resolved request path");
                            request.path = Some(path);
                            ConnectionState::Dispatching(request)
                        }
                        Err(e) => {
                            warn!(peer = %self.peer, error = %e, "Failed to resolve request path");
                            ConnectionState::Failed(StatusCode::NotFound)
                        }
                    }
                }

                ConnectionState::Dispatching(request) => {
                    let mut writer = ResponseWriter::new(&mut self.stream);
                    let status = handler::dispatch(&mut writer, &request, &self.config)
                        .await
                        .with_context(|| format!("{} {}", request.method, request.uri))?;
                    ConnectionState::Responded(status)
                }

                ConnectionState::Failed(status) => {
                    let mut writer = ResponseWriter::new(&mut self.stream);
                    ConnectionState::Responded(handler::error::handle(&mut writer, status).await)
                }

                ConnectionState::Responded(status) => {
                    if let Err(e) = self.stream.shutdown().await {
                        debug!(peer = %self.peer, error = %e, "Shutdown after response failed");
                    }
                    return Ok(status);
                }
            };
        }
    }
}
