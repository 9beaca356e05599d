use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use roomlink_api::ControllerInfo;
use serde::{Deserialize, Serialize};

use crate::services::{ReconnectConfig, SessionConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Uplink target and the identity it reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Controller {
    pub host: String,
    pub port: u16,
    /// Milliseconds
    pub connect_timeout: u64,
    pub token: String,
    pub mac: String,
    pub ip: String,
    pub ble_name: String,
    pub version: String,
}

impl Controller {
    pub fn info(&self) -> ControllerInfo {
        ControllerInfo {
            mac: self.mac.clone(),
            ip: self.ip.clone(),
            ble_name: self.ble_name.clone(),
            version: self.version.clone(),
            token: self.token.clone(),
        }
    }
}

/// Per-client session behaviour. Delays are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub inject_token: bool,
    pub simulation: bool,
    pub simulation_delay: u64,
    pub reconnect_initial_delay: u64,
    pub reconnect_max_delay: u64,
    pub max_reconnect_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rooms {
    pub seed: Vec<String>,
    /// Milliseconds until an unlocked door locks itself again
    pub relock_delay: u64,
    /// Milliseconds between sensor drift steps
    pub drift_interval: u64,
}

impl Rooms {
    pub fn relock_delay(&self) -> Duration {
        Duration::from_millis(self.relock_delay)
    }

    pub fn drift_interval(&self) -> Duration {
        Duration::from_millis(self.drift_interval)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub controller: Controller,
    pub session: Session,
    pub rooms: Rooms,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// `ROOMLINK__SECTION__KEY` variables. `ROOMLINK__ROOMS__SEED` takes a
    /// comma separated list.
    fn environment() -> Environment {
        Environment::with_prefix("ROOMLINK")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("rooms.seed")
            .try_parsing(true)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            controller_host: self.controller.host.clone(),
            controller_port: self.controller.port,
            connect_timeout: Duration::from_millis(self.controller.connect_timeout),
            inject_token: self.session.inject_token,
            simulation: self.session.simulation,
            simulation_delay: Duration::from_millis(self.session.simulation_delay),
            reconnect: ReconnectConfig {
                initial_delay: Duration::from_millis(self.session.reconnect_initial_delay),
                max_delay: Duration::from_millis(self.session.reconnect_max_delay),
                max_attempts: self.session.max_reconnect_attempts,
            },
        }
    }
}
