use serde::{Deserialize, Serialize};

/// Static identity of the physical room controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerInfo {
    /// Hardware address
    pub mac: String,
    /// Address on the hotel network
    pub ip: String,
    /// Advertised BLE name
    #[serde(rename = "ble_name", alias = "bleName")]
    pub ble_name: String,
    /// Firmware version
    pub version: String,
    /// Shared command token
    pub token: String,
}
