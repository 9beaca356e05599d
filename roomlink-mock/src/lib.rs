use std::io;
use std::sync::Arc;
use std::time::Duration;

use roomlink_bridge::services::{CommandRouter, RoomRegistry, spawn_drift};
use tokio::net::TcpListener;

use crate::server::MockController;
use crate::settings::Settings;

pub mod server;
pub mod settings;

pub async fn run(settings: &Arc<Settings>) -> io::Result<()> {
    let info = settings.controller_info();
    if settings.mock.generate_token {
        tracing::info!("Generated controller token {}", info.token);
    }

    let registry = Arc::new(RoomRegistry::with_rooms(
        Duration::from_millis(settings.rooms.relock_delay),
        settings.rooms.seed.iter().cloned(),
    ));
    let drift = spawn_drift(
        registry.clone(),
        Duration::from_millis(settings.rooms.drift_interval),
    );

    let controller = Arc::new(MockController::new(CommandRouter::new(info), registry));
    let listener = TcpListener::bind((settings.mock.host.as_str(), settings.mock.port)).await?;

    tracing::info!("Mock controller listening on {}", listener.local_addr()?);

    let served = controller.serve(listener).await;
    drift.abort();
    served
}
