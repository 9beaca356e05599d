use std::sync::Arc;

use roomlink_api::{Command, ControllerInfo, Response, RoomState, Status};

use super::{CommandRouter, RoomRegistry};

/// Stand-in for an unreachable controller.
///
/// Commands are answered by the router against the shared registry, so the
/// values clients see are the same plausible, drifting readings every
/// simulated session sees.
#[derive(Clone)]
pub struct Simulation {
    router: CommandRouter,
    registry: Arc<RoomRegistry>,
}

impl Simulation {
    pub fn new(router: CommandRouter, registry: Arc<RoomRegistry>) -> Self {
        Self { router, registry }
    }

    /// The three frames a client receives when the session switches to
    /// simulation: a connection notice, the controller identity and a
    /// nominal room state.
    pub fn greeting(&self) -> [Response; 3] {
        let info = self.router.info();
        let mock_info = ControllerInfo {
            version: format!("{}-mock", info.version),
            ..info.clone()
        };

        [
            Response::connection(
                Status::MockConnected,
                "Connected to virtual controller (simulation mode)",
            ),
            Response::info(&mock_info),
            Response::state(RoomState::nominal()),
        ]
    }

    pub async fn answer(&self, command: &Command) -> Response {
        self.router.handle(command, &self.registry).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use roomlink_api::{CommandKind, ResponseType, RoomStatePatch};

    use super::*;

    fn simulation() -> Simulation {
        let router = CommandRouter::new(ControllerInfo {
            mac: "A2:DD:6C:98:2E:58".into(),
            ip: "192.168.1.100".into(),
            ble_name: "ROOM_19".into(),
            version: "1.0.0".into(),
            token: "T".into(),
        });
        let registry = Arc::new(RoomRegistry::with_rooms(Duration::from_secs(5), ["101"]));

        Simulation::new(router, registry)
    }

    #[test]
    fn test_greeting() {
        let [connection, info, state] = simulation().greeting();

        assert_eq!(connection.kind, Some(ResponseType::Connection));
        assert_eq!(connection.status, Some(Status::MockConnected));
        assert_eq!(info.version.as_deref(), Some("1.0.0-mock"));
        assert_eq!(info.token.as_deref(), Some("T"));
        assert_eq!(state.state.map(|s| s.temperature), Some(23.0));
    }

    #[tokio::test]
    async fn test_answers_from_registry() {
        let simulation = simulation();
        let command = Command::new(CommandKind::SetState)
            .with_room("101")
            .with_token("T")
            .with_state(RoomStatePatch {
                channel1: Some(true),
                ..Default::default()
            });

        let response = simulation.answer(&command).await;

        assert_eq!(response.kind, Some(ResponseType::State));
        assert!(response.state.unwrap().channel1);
    }

    #[tokio::test]
    async fn test_global_update() {
        let simulation = simulation();
        let command = Command::new(CommandKind::SetState)
            .with_global(true)
            .with_token("T")
            .with_state(RoomStatePatch {
                lights_on: Some(true),
                ..Default::default()
            });

        let response = simulation.answer(&command).await;

        assert_eq!(response.status, Some(Status::Success));
        assert!(simulation.registry.get("101").await.unwrap().lights_on);
    }
}
