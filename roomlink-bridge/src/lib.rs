use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::app::create_app;
use crate::configs::Settings;
use crate::errors::BridgeError;
use crate::services::{CommandRouter, RoomRegistry, SessionContext, spawn_drift};

pub mod app;
pub mod configs;
pub mod errors;
pub mod services;

/// Room registry and session context for a set of settings.
pub fn build_context(settings: &Settings) -> SessionContext {
    let registry = Arc::new(RoomRegistry::with_rooms(
        settings.rooms.relock_delay(),
        settings.rooms.seed.iter().cloned(),
    ));

    SessionContext {
        router: CommandRouter::new(settings.controller.info()),
        registry,
        config: Arc::new(settings.session_config()),
    }
}

pub async fn run(settings: &Arc<Settings>) -> Result<(), BridgeError> {
    let context = build_context(settings);
    let drift = spawn_drift(context.registry.clone(), settings.rooms.drift_interval());

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .map_err(|_| BridgeError::Address(settings.server.host.clone()))?;
    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| BridgeError::Bind {
            addr: address.to_string(),
            source,
        })?;

    tracing::info!("listening on {:?}", address);
    tracing::info!("{} rooms seeded", context.registry.len().await);
    tracing::info!(
        "forwarding to controller {}:{}",
        settings.controller.host,
        settings.controller.port
    );

    let served = axum::serve(listener, create_app(context))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(BridgeError::Serve);

    drift.abort();
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
