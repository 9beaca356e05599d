use std::error::Error;

use roomlink_api::ControllerInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Identity the mock reports for `get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Controller {
    pub token: String,
    pub mac: String,
    pub ip: String,
    pub ble_name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rooms {
    pub seed: Vec<String>,
    pub relock_delay: u64,
    pub drift_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mock {
    pub host: String,
    pub port: u16,
    /// Ignore `controller.token` and make up a fresh one at startup
    #[serde(default)]
    pub generate_token: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub controller: Controller,
    pub rooms: Rooms,
    pub mock: Mock,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))?;

        Ok(settings)
    }

    /// Controller identity with the token this run authenticates against.
    pub fn controller_info(&self) -> ControllerInfo {
        let token = if self.mock.generate_token {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            self.controller.token.clone()
        };

        ControllerInfo {
            mac: self.controller.mac.clone(),
            ip: self.controller.ip.clone(),
            ble_name: self.controller.ble_name.clone(),
            version: self.controller.version.clone(),
            token,
        }
    }
}
