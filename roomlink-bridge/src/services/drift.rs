use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use roomlink_api::RoomState;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::RoomRegistry;

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 18.0..=28.0;
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 30.0..=70.0;
pub const PRESSURE_RANGE: RangeInclusive<f64> = 1000.0..=1030.0;

const TEMPERATURE_STEP: f64 = 0.2;
const HUMIDITY_STEP: f64 = 1.0;
const PRESSURE_STEP: f64 = 0.3;

/// Move every sensor reading by a small random step, keeping it inside its
/// realistic range, and restamp the room.
pub fn nudge<R: Rng + ?Sized>(state: &mut RoomState, rng: &mut R) {
    state.temperature = step(state.temperature, TEMPERATURE_STEP, &TEMPERATURE_RANGE, rng);
    state.humidity = step(state.humidity, HUMIDITY_STEP, &HUMIDITY_RANGE, rng);
    state.pressure = step(state.pressure, PRESSURE_STEP, &PRESSURE_RANGE, rng);
    state.touch();
}

fn step<R: Rng + ?Sized>(value: f64, max_step: f64, range: &RangeInclusive<f64>, rng: &mut R) -> f64 {
    (value + rng.random_range(-max_step..max_step)).clamp(*range.start(), *range.end())
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Spawn the process-wide drift task. The first step happens one `period`
/// after the call. Periods below 1ms are raised to 1ms.
pub fn spawn_drift(registry: Arc<RoomRegistry>, period: Duration) -> JoinHandle<()> {
    let period = period.max(MIN_PERIOD);

    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;
            let rooms = registry.drift().await;
            tracing::trace!("Sensor drift applied to {} rooms", rooms);
        }
    })
}
