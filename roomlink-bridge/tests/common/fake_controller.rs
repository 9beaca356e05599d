use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;

use super::WAIT;

/// Plain TCP listener standing in for the room controller.
pub struct FakeController {
    listener: TcpListener,
}

impl FakeController {
    pub async fn bind() -> Self {
        Self::bind_on(0).await
    }

    pub async fn bind_on(port: u16) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        Self { listener }
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().unwrap().port()
    }

    pub async fn accept(&self) -> FakeConnection {
        let (socket, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .expect("timed out waiting for the bridge to connect")
            .unwrap();
        let (reader, writer) = socket.into_split();

        FakeConnection {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }
}

pub struct FakeConnection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl FakeConnection {
    pub async fn read_command(&mut self) -> Value {
        let line = tokio::time::timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for a forwarded command")
            .unwrap()
            .expect("bridge closed the connection");

        serde_json::from_str(&line).unwrap()
    }

    pub async fn send(&mut self, message: Value) {
        let mut line = message.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
    }

    /// Abort the connection so the bridge sees a reset instead of EOF.
    pub fn reset(self) {
        let reader = self.lines.into_inner().into_inner();
        let socket = reader.reunite(self.writer).unwrap();
        socket.set_linger(Some(Duration::ZERO)).unwrap();
    }
}
