use std::future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use roomlink_api::{Command, Response, Status};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Sleep};
use uuid::Uuid;

use super::{
    Backoff, CommandRouter, ControllerLink, LinkEvent, ReconnectConfig, RoomRegistry, Simulation,
};
use crate::errors::{CommandError, LinkError};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub controller_host: String,
    pub controller_port: u16,
    pub connect_timeout: Duration,
    /// Fill in the shared token on client commands that carry none
    pub inject_token: bool,
    /// Fall back to a virtual controller when the real one fails
    pub simulation: bool,
    pub simulation_delay: Duration,
    pub reconnect: ReconnectConfig,
}

/// Everything a session shares with the rest of the process.
#[derive(Clone)]
pub struct SessionContext {
    pub router: CommandRouter,
    pub registry: Arc<RoomRegistry>,
    pub config: Arc<SessionConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Simulated,
    Disconnected,
}

type ConnectOutcome = Result<(ControllerLink, mpsc::UnboundedReceiver<LinkEvent>), LinkError>;

/// One client's view of the controller.
///
/// A session owns at most one controller link. Client commands are
/// authorized locally, then forwarded while connected, answered by the
/// simulation once that is active, or parked (one slot, newest wins) while
/// a connection is being established.
pub struct Session {
    id: String,
    context: SessionContext,
    simulation: Simulation,
    outbound: mpsc::UnboundedSender<Value>,
    state: ConnectionState,
    link: Option<ControllerLink>,
    events: Option<mpsc::UnboundedReceiver<LinkEvent>>,
    connecting: Option<JoinHandle<ConnectOutcome>>,
    backoff: Backoff,
    retrying: bool,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
    simulation_timer: Option<Pin<Box<Sleep>>>,
    pending: Option<Command>,
}

impl Session {
    pub fn new(context: SessionContext, outbound: mpsc::UnboundedSender<Value>) -> Self {
        let simulation = Simulation::new(context.router.clone(), context.registry.clone());
        let backoff = Backoff::new(context.config.reconnect.clone());

        Self {
            id: Uuid::new_v4().to_string(),
            context,
            simulation,
            outbound,
            state: ConnectionState::Connecting,
            link: None,
            events: None,
            connecting: None,
            backoff,
            retrying: false,
            reconnect_timer: None,
            simulation_timer: None,
            pending: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Drive the session until the client side of `inbound` goes away.
    pub async fn run(mut self, mut inbound: mpsc::UnboundedReceiver<String>) {
        tracing::info!("Session {} started", self.id);
        self.start_connect();

        loop {
            tokio::select! {
                frame = inbound.recv() => match frame {
                    Some(text) => self.on_client_frame(&text).await,
                    None => break,
                },
                event = next_event(&mut self.events) => {
                    self.on_link_event(event.unwrap_or(LinkEvent::Closed)).await;
                }
                outcome = connect_outcome(&mut self.connecting) => {
                    self.connecting = None;
                    self.on_connect_outcome(outcome).await;
                }
                _ = fire(&mut self.reconnect_timer) => {
                    self.reconnect_timer = None;
                    self.start_connect();
                }
                _ = fire(&mut self.simulation_timer) => {
                    self.simulation_timer = None;
                    self.enter_simulation().await;
                }
            }
        }

        self.shutdown().await;
    }

    async fn on_client_frame(&mut self, text: &str) {
        let mut command: Command = match serde_json::from_str(text) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!("Session {} got malformed command: {}", self.id, e);
                self.reply(CommandError::InvalidFormat.into());
                return;
            }
        };

        if self.context.config.inject_token && command.token.is_none() {
            command.token = Some(self.context.router.token().to_string());
        }

        if let Err(e) = self.context.router.authorize(&command) {
            tracing::debug!("Session {} rejected {} ({:?}): {}", self.id, command.kind, e.kind(), e);
            self.reply(e.into());
            return;
        }

        match self.state {
            ConnectionState::Connected => self.forward(command).await,
            ConnectionState::Simulated => {
                let response = self.simulation.answer(&command).await;
                self.reply(response);
            }
            ConnectionState::Connecting | ConnectionState::Disconnected => {
                if let Some(replaced) = self.pending.replace(command) {
                    tracing::debug!("Session {} dropped queued {}", self.id, replaced.kind);
                }

                if self.is_idle() {
                    tracing::info!("Session {} reconnecting on client request", self.id);
                    self.backoff.reset();
                    self.retrying = false;
                    self.start_connect();
                }
            }
        }
    }

    async fn on_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Message(message) => self.send_value(Value::Object(message)),
            LinkEvent::Closed => {
                tracing::info!("Session {}: controller closed the connection", self.id);
                self.drop_link();
                self.state = ConnectionState::Disconnected;
                self.reply(Response::connection(
                    Status::Disconnected,
                    "Controller connection closed",
                ));

                self.retrying = true;
                self.schedule_reconnect();
            }
            LinkEvent::Error(e) => self.on_link_error(e).await,
        }
    }

    async fn on_connect_outcome(&mut self, outcome: Result<ConnectOutcome, JoinError>) {
        let error = match outcome {
            Ok(Ok((link, events))) => return self.on_connected(link, events).await,
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("Connect task failed: {e}"),
        };

        if self.retrying {
            tracing::warn!(
                "Session {} reconnect attempt {} failed: {}",
                self.id,
                self.backoff.attempt(),
                error
            );
            self.state = ConnectionState::Disconnected;
            self.schedule_reconnect();
        } else {
            self.on_link_error(error).await;
        }
    }

    async fn on_connected(
        &mut self,
        link: ControllerLink,
        events: mpsc::UnboundedReceiver<LinkEvent>,
    ) {
        tracing::info!("Session {} connected to {}", self.id, link.addr());

        self.state = ConnectionState::Connected;
        self.backoff.reset();
        self.retrying = false;
        self.link = Some(link);
        self.events = Some(events);
        self.reply(Response::connection(
            Status::Connected,
            "Connected to hotel controller",
        ));

        if let Some(command) = self.pending.take() {
            self.forward(command).await;
        }
    }

    async fn on_link_error(&mut self, error: String) {
        tracing::warn!("Session {} controller error: {}", self.id, error);

        self.drop_link();
        self.state = ConnectionState::Disconnected;
        self.reply(Response::connection(Status::Error, error));

        if self.context.config.simulation {
            self.simulation_timer = Some(Box::pin(time::sleep(
                self.context.config.simulation_delay,
            )));
        } else {
            self.retrying = true;
            self.schedule_reconnect();
        }
    }

    async fn forward(&mut self, command: Command) {
        let Some(link) = self.link.as_mut() else {
            self.pending = Some(command);
            return;
        };

        match link.send(&command).await {
            Ok(()) => tracing::debug!("Session {} forwarded {}", self.id, command.kind),
            Err(e) => {
                self.pending = Some(command);
                self.on_link_error(e.to_string()).await;
            }
        }
    }

    async fn enter_simulation(&mut self) {
        tracing::info!("Session {} switched to simulation", self.id);
        self.state = ConnectionState::Simulated;

        for frame in self.simulation.greeting() {
            self.reply(frame);
        }

        if let Some(command) = self.pending.take() {
            let response = self.simulation.answer(&command).await;
            self.reply(response);
        }
    }

    fn start_connect(&mut self) {
        self.state = ConnectionState::Connecting;

        let config = self.context.config.clone();
        let token = self.context.router.token().to_string();

        self.connecting = Some(tokio::spawn(async move {
            ControllerLink::connect(
                &config.controller_host,
                config.controller_port,
                config.connect_timeout,
                token,
            )
            .await
        }));
    }

    fn schedule_reconnect(&mut self) {
        match self.backoff.next_delay() {
            Some(delay) => {
                tracing::info!(
                    "Session {} reconnecting in {:?} (attempt {})",
                    self.id,
                    delay,
                    self.backoff.attempt()
                );
                self.reconnect_timer = Some(Box::pin(time::sleep(delay)));
            }
            None => {
                tracing::warn!("Session {} gave up reconnecting", self.id);
                self.retrying = false;
                self.reply(Response::connection(
                    Status::Disconnected,
                    format!(
                        "Controller unreachable, gave up reconnecting after {} attempts",
                        self.backoff.attempt()
                    ),
                ));
            }
        }
    }

    /// Nothing in flight that would eventually connect or simulate.
    fn is_idle(&self) -> bool {
        self.connecting.is_none() && self.reconnect_timer.is_none() && self.simulation_timer.is_none()
    }

    fn drop_link(&mut self) {
        self.link = None;
        self.events = None;
    }

    fn reply(&self, response: Response) {
        match serde_json::to_value(&response) {
            Ok(value) => self.send_value(value),
            Err(e) => tracing::error!("Session {} failed to encode response: {}", self.id, e),
        }
    }

    fn send_value(&self, value: Value) {
        if self.outbound.send(value).is_err() {
            tracing::debug!("Session {} client already gone", self.id);
        }
    }

    async fn shutdown(mut self) {
        if let Some(task) = self.connecting.take() {
            task.abort();
        }
        self.reconnect_timer = None;
        self.simulation_timer = None;

        if let Some(link) = self.link.take() {
            link.close().await;
        }
        tracing::info!("Session {} closed", self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.connecting.take() {
            task.abort();
        }
    }
}

async fn next_event(events: &mut Option<mpsc::UnboundedReceiver<LinkEvent>>) -> Option<LinkEvent> {
    match events {
        Some(events) => events.recv().await,
        None => future::pending().await,
    }
}

async fn connect_outcome(
    task: &mut Option<JoinHandle<ConnectOutcome>>,
) -> Result<ConnectOutcome, JoinError> {
    match task {
        Some(task) => task.await,
        None => future::pending().await,
    }
}

async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}
