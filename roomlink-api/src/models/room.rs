use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Snapshot of one hotel room as reported by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    /// Main light relay
    pub lights_on: bool,
    /// Door lock actuator
    pub door_locked: bool,
    /// Auxiliary relay 1
    pub channel1: bool,
    /// Auxiliary relay 2
    pub channel2: bool,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Air pressure in hPa
    pub pressure: f64,
    /// Time of the last mutation
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl RoomState {
    /// Nominal readings of an idle room: everything off, door locked,
    /// 23 °C, 45 % and 1013 hPa.
    pub fn nominal() -> Self {
        Self {
            lights_on: false,
            door_locked: true,
            channel1: false,
            channel2: false,
            temperature: 23.0,
            humidity: 45.0,
            pressure: 1013.0,
            last_updated: OffsetDateTime::now_utc(),
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = OffsetDateTime::now_utc();
    }
}

/// Partial [`RoomState`] carried by `set_state`. Absent fields are left
/// untouched when the patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lights_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel1: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel2: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl RoomStatePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the present fields into `state` and restamp it.
    pub fn apply(&self, state: &mut RoomState) {
        if let Some(value) = self.lights_on {
            state.lights_on = value;
        }
        if let Some(value) = self.door_locked {
            state.door_locked = value;
        }
        if let Some(value) = self.channel1 {
            state.channel1 = value;
        }
        if let Some(value) = self.channel2 {
            state.channel2 = value;
        }
        if let Some(value) = self.temperature {
            state.temperature = value;
        }
        if let Some(value) = self.humidity {
            state.humidity = value;
        }
        if let Some(value) = self.pressure {
            state.pressure = value;
        }
        state.touch();
    }
}
