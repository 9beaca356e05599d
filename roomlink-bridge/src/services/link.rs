use std::time::Duration;

use roomlink_api::LineFramer;
use roomlink_api::framing::{self, DEFAULT_BUFFER_SIZE};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::LinkError;

pub type ControllerMessage = Map<String, Value>;

/// What the reader side of a [`ControllerLink`] reports.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// One complete message from the controller
    Message(ControllerMessage),
    /// Controller closed the connection cleanly
    Closed,
    /// Read failed; the link is unusable
    Error(String),
}

/// One TCP connection to the room controller.
///
/// Reads happen on a background task that frames the byte stream and
/// forwards [`LinkEvent`]s in arrival order. Dropping the link stops that
/// task.
#[derive(Debug)]
pub struct ControllerLink {
    addr: String,
    writer: OwnedWriteHalf,
    reader_task: JoinHandle<()>,
}

impl ControllerLink {
    pub async fn connect(
        host: &str,
        port: u16,
        timeout: Duration,
        token: String,
    ) -> Result<(Self, mpsc::UnboundedReceiver<LinkEvent>), LinkError> {
        let addr = format!("{host}:{port}");

        let stream = match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(LinkError::Connect { addr, source }),
            Err(_) => {
                return Err(LinkError::Timeout {
                    addr,
                    timeout_ms: timeout.as_millis(),
                });
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!("Failed to set TCP_NODELAY on {}: {}", addr, e);
        }

        let (reader, writer) = stream.into_split();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let reader_task = tokio::spawn(read_loop(reader, events_tx, token));

        tracing::info!("Connected to controller {}", addr);

        Ok((
            Self {
                addr,
                writer,
                reader_task,
            },
            events_rx,
        ))
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Write one message followed by the frame delimiter.
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), LinkError> {
        let frame = framing::encode(message)?;

        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn close(mut self) {
        self.reader_task.abort();
        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!("Controller {} shutdown: {}", self.addr, e);
        }
        tracing::info!("Closed controller link {}", self.addr);
    }
}

#[cfg(test)]
impl ControllerLink {
    /// Close only the write side so the next `send` fails.
    pub(crate) async fn shutdown_write(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}

impl Drop for ControllerLink {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<LinkEvent>,
    token: String,
) {
    let mut framer = LineFramer::new();
    let mut chunk = vec![0u8; DEFAULT_BUFFER_SIZE];

    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(0) => {
                let _ = events.send(LinkEvent::Closed);
                return;
            }
            Ok(read) => read,
            Err(e) => {
                let _ = events.send(LinkEvent::Error(e.to_string()));
                return;
            }
        };

        for frame in framer.push::<ControllerMessage>(&chunk[..read]) {
            match frame {
                Ok(mut message) => {
                    fill_info_token(&mut message, &token);
                    tracing::debug!("Received from controller: {:?}", message);

                    if events.send(LinkEvent::Message(message)).is_err() {
                        return;
                    }
                }
                Err(e) => tracing::warn!("Dropping controller frame: {}", e),
            }
        }
    }
}

/// Some controllers answer `get_info` without their token; clients learn
/// the token from that answer, so fill in the one we hold.
pub fn fill_info_token(message: &mut ControllerMessage, token: &str) {
    if message.get("type").and_then(Value::as_str) != Some("info") {
        return;
    }

    let missing = match message.get("token") {
        None | Some(Value::Null) => true,
        Some(Value::String(existing)) => existing.is_empty(),
        Some(_) => false,
    };
    if missing {
        message.insert("token".into(), Value::String(token.to_string()));
    }
}
