use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::config::{Mode, ServerConfig};
use crate::http::connection::Connection;
use crate::http::request::Peer;

/// Pause after a failed accept so errors like EMFILE do not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: Arc<ServerConfig>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(cfg.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr()))?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, cfg).await
}

/// Accepts connections forever, one worker per connection.
///
/// In `Task` mode each connection gets its own spawned task; in `Single`
/// mode the loop serves it before accepting the next one. A worker never
/// comes back to this loop holding a connection.
pub async fn serve(listener: TcpListener, cfg: Arc<ServerConfig>) -> anyhow::Result<()> {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        let peer = Peer::from(addr);
        info!("Accepted connection from {}", peer);

        match cfg.mode {
            Mode::Task => {
                let cfg = Arc::clone(&cfg);
                tokio::spawn(async move {
                    handle_connection(socket, peer, cfg).await;
                });
            }
            Mode::Single => handle_connection(socket, peer, Arc::clone(&cfg)).await,
        }
    }
}

async fn handle_connection(socket: TcpStream, peer: Peer, cfg: Arc<ServerConfig>) {
    let conn = Connection::new(socket, peer.clone(), cfg);
    match conn.run().await {
        Ok(status) => info!(peer = %peer, status = status.as_u16(), "Request complete"),
        Err(e) => error!("Connection error from {}: {:#}", peer, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_backoff_is_not_zero() {
        assert!(!ACCEPT_BACKOFF.is_zero());
    }
}
