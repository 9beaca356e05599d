use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use roomlink_api::framing::{self, DEFAULT_BUFFER_SIZE};
use roomlink_api::{Command, LineFramer, Response};
use roomlink_bridge::errors::CommandError;
use roomlink_bridge::services::{CommandRouter, RoomRegistry};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// TCP room controller answering from its own room registry.
pub struct MockController {
    router: CommandRouter,
    registry: Arc<RoomRegistry>,
}

impl MockController {
    pub fn new(router: CommandRouter, registry: Arc<RoomRegistry>) -> Self {
        Self { router, registry }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> io::Result<()> {
        loop {
            let (socket, peer) = listener.accept().await?;
            tracing::info!("Bridge connected from {}", peer);

            let controller = self.clone();
            tokio::spawn(async move {
                if let Err(e) = controller.handle_connection(socket, peer).await {
                    tracing::warn!("Connection {} failed: {}", peer, e);
                }
                tracing::info!("Bridge {} disconnected", peer);
            });
        }
    }

    async fn handle_connection(&self, mut socket: TcpStream, peer: SocketAddr) -> io::Result<()> {
        let mut framer = LineFramer::new();
        let mut chunk = vec![0u8; DEFAULT_BUFFER_SIZE];

        loop {
            let read = socket.read(&mut chunk).await?;
            if read == 0 {
                return Ok(());
            }

            for frame in framer.push::<Command>(&chunk[..read]) {
                let response = match frame {
                    Ok(command) => {
                        tracing::debug!("{} -> {}", peer, command.kind);
                        self.router.handle(&command, &self.registry).await
                    }
                    Err(e) => {
                        tracing::debug!("{} sent a bad frame: {}", peer, e);
                        Response::from(CommandError::InvalidFormat)
                    }
                };

                if response.is_error() {
                    tracing::debug!("{} <- {:?}", peer, response.message);
                }

                let encoded = framing::encode(&response).map_err(io::Error::other)?;
                socket.write_all(&encoded).await?;
            }
        }
    }
}
