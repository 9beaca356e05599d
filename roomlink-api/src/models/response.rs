use serde::{Deserialize, Serialize};

use super::{ControllerInfo, RoomState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
    Connected,
    Disconnected,
    MockConnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Info,
    State,
    Connection,
}

/// Any message travelling from the bridge (or controller) to a client.
/// Every field is optional and omitted when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResponseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RoomState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(rename = "ble_name", default, skip_serializing_if = "Option::is_none")]
    pub ble_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Success),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Error),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn info(info: &ControllerInfo) -> Self {
        Self {
            kind: Some(ResponseType::Info),
            mac: Some(info.mac.clone()),
            ip: Some(info.ip.clone()),
            ble_name: Some(info.ble_name.clone()),
            version: Some(info.version.clone()),
            token: Some(info.token.clone()),
            ..Default::default()
        }
    }

    pub fn state(state: RoomState) -> Self {
        Self {
            kind: Some(ResponseType::State),
            state: Some(state),
            ..Default::default()
        }
    }

    /// Link lifecycle notification (`type: "connection"`).
    pub fn connection(status: Status, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            kind: Some(ResponseType::Connection),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_state(mut self, state: RoomState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == Some(Status::Error)
    }
}
