use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RoomStatePatch;

/// Command vocabulary understood by the room controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    GetInfo,
    GetState,
    SetState,
    DoorUnlock,
    DoorLock,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::GetInfo => "get_info",
            CommandKind::GetState => "get_state",
            CommandKind::SetState => "set_state",
            CommandKind::DoorUnlock => "door_unlock",
            CommandKind::DoorLock => "door_lock",
        }
    }

    /// `get_info` is how a fresh client learns the token, so it is the only
    /// command accepted without one.
    pub fn requires_token(&self) -> bool {
        !matches!(self, CommandKind::GetInfo)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_info" => Ok(CommandKind::GetInfo),
            "get_state" => Ok(CommandKind::GetState),
            "set_state" => Ok(CommandKind::SetState),
            "door_unlock" => Ok(CommandKind::DoorUnlock),
            "door_lock" => Ok(CommandKind::DoorLock),
            other => Err(format!("unknown command type: {other}")),
        }
    }
}

/// A client (or bridge) command as it travels over the wire.
///
/// The `type` is kept verbatim so unknown commands can still be reported,
/// and any extra top-level fields survive forwarding to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Raw command type
    #[serde(rename = "type")]
    pub kind: String,
    /// Target room
    #[serde(
        default,
        deserialize_with = "deserialize_room_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub room_id: Option<String>,
    /// Partial state for `set_state`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RoomStatePatch>,
    /// Apply `set_state` to every known room
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<bool>,
    /// Shared controller token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            room_id: None,
            state: None,
            global: None,
            token: None,
            extra: Map::new(),
        }
    }

    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_state(mut self, state: RoomStatePatch) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_global(mut self, global: bool) -> Self {
        self.global = Some(global);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Parsed command type, `None` when outside the vocabulary.
    pub fn command_kind(&self) -> Option<CommandKind> {
        self.kind.parse().ok()
    }

    /// Room id, treating an empty string as absent.
    pub fn room(&self) -> Option<&str> {
        self.room_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_global(&self) -> bool {
        self.global.unwrap_or(false)
    }
}

/// Browsers send room numbers as either strings or numbers.
fn deserialize_room_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "roomId must be a string or number, got {other}"
        ))),
    }
}
