#![allow(dead_code)]

pub mod fake_controller;

use std::sync::Arc;
use std::time::Duration;

use roomlink_api::ControllerInfo;
use roomlink_bridge::services::{
    CommandRouter, ReconnectConfig, RoomRegistry, Session, SessionConfig, SessionContext,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const TOKEN: &str = "T";
pub const WAIT: Duration = Duration::from_secs(5);

pub fn info() -> ControllerInfo {
    ControllerInfo {
        mac: "A2:DD:6C:98:2E:58".into(),
        ip: "127.0.0.1".into(),
        ble_name: "ROOM_19".into(),
        version: "1.0.0".into(),
        token: TOKEN.into(),
    }
}

pub fn session_config(port: u16) -> SessionConfig {
    SessionConfig {
        controller_host: "127.0.0.1".into(),
        controller_port: port,
        connect_timeout: Duration::from_secs(1),
        inject_token: true,
        simulation: true,
        simulation_delay: Duration::from_millis(200),
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(100),
            max_attempts: 3,
        },
    }
}

pub fn context(config: SessionConfig) -> SessionContext {
    SessionContext {
        router: CommandRouter::new(info()),
        registry: Arc::new(RoomRegistry::with_rooms(
            Duration::from_secs(5),
            ["101", "102", "103", "201", "202"],
        )),
        config: Arc::new(config),
    }
}

/// A port nothing listens on.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Drives a [`Session`] through its channels the way the WebSocket
/// transport does.
pub struct TestClient {
    inbound: Option<mpsc::UnboundedSender<String>>,
    outbound: mpsc::UnboundedReceiver<Value>,
    task: JoinHandle<()>,
}

impl TestClient {
    pub fn start(context: SessionContext) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let session = Session::new(context, outbound_tx);
        let task = tokio::spawn(session.run(inbound_rx));

        Self {
            inbound: Some(inbound_tx),
            outbound: outbound_rx,
            task,
        }
    }

    pub fn send(&self, command: Value) {
        self.send_raw(&command.to_string());
    }

    pub fn send_raw(&self, text: &str) {
        self.inbound
            .as_ref()
            .unwrap()
            .send(text.to_string())
            .unwrap();
    }

    pub async fn recv(&mut self) -> Value {
        tokio::time::timeout(WAIT, self.outbound.recv())
            .await
            .expect("timed out waiting for session output")
            .expect("session ended")
    }

    /// Skip frames until one satisfies `predicate`.
    pub async fn recv_until(&mut self, predicate: impl Fn(&Value) -> bool) -> Value {
        loop {
            let value = self.recv().await;
            if predicate(&value) {
                return value;
            }
        }
    }

    /// Close the client side and wait for the session to wind down.
    pub async fn close(mut self) {
        self.inbound = None;
        tokio::time::timeout(WAIT, self.task).await.unwrap().unwrap();
    }
}

pub fn is_connection(value: &Value, status: &str) -> bool {
    value["type"] == "connection" && value["status"] == status
}
