use std::sync::Arc;
use std::time::Duration;

use roomlink_api::ControllerInfo;
use roomlink_bridge::services::{CommandRouter, RoomRegistry};
use roomlink_mock::server::MockController;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

pub const TOKEN: &str = "SNQaq6KVIQQMHR3x";
pub const RELOCK: Duration = Duration::from_millis(300);

pub struct MockClient {
    pub controller: Arc<MockController>,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl MockClient {
    /// Start a mock controller on an ephemeral port and connect to it.
    pub async fn connect() -> Self {
        let info = ControllerInfo {
            mac: "A2:DD:6C:98:2E:58".into(),
            ip: "127.0.0.1".into(),
            ble_name: "ROOM_19".into(),
            version: "1.0.0".into(),
            token: TOKEN.into(),
        };
        let registry = Arc::new(RoomRegistry::with_rooms(RELOCK, ["101", "102"]));
        let controller = Arc::new(MockController::new(CommandRouter::new(info), registry));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(controller.clone().serve(listener));

        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();

        Self {
            controller,
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    pub async fn request(&mut self, command: Value) -> Value {
        let mut line = command.to_string();
        line.push('\n');
        self.send_raw(line.as_bytes()).await;
        self.response().await
    }

    pub async fn response(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        serde_json::from_str(&line).unwrap()
    }
}
