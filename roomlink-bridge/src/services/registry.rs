use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use roomlink_api::{RoomState, RoomStatePatch};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::drift;

/// One room and its pending re-lock, if any.
///
/// `generation` changes whenever the door timer is armed or disarmed. A
/// timer only re-locks if the generation it was armed with is still
/// current when it gets the lock.
struct Room {
    state: RoomState,
    relock: Option<JoinHandle<()>>,
    generation: u64,
}

impl Room {
    fn new(state: RoomState) -> Self {
        Self {
            state,
            relock: None,
            generation: 0,
        }
    }

    fn random() -> Self {
        Self::new(random_room())
    }

    fn disarm(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.relock.take() {
            timer.abort();
        }
    }
}

/// Owner of every known room's state.
///
/// Rooms are created lazily on first reference and live as long as the
/// registry. Unlocking a door arms a per-room re-lock timer; a later unlock
/// re-arms it and an explicit lock disarms it, so at most one timer is live
/// per room. Door state and timer bookkeeping share one lock.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Room>>,
    relock_delay: Duration,
}

impl RoomRegistry {
    pub fn new(relock_delay: Duration) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            relock_delay,
        }
    }

    pub fn with_rooms<I, S>(relock_delay: Duration, room_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rooms = room_ids
            .into_iter()
            .map(|id| (id.into(), Room::random()))
            .collect();

        Self {
            rooms: RwLock::new(rooms),
            relock_delay,
        }
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn room_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.rooms.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn get(&self, room_id: &str) -> Option<RoomState> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|room| room.state.clone())
    }

    pub async fn get_or_create(&self, room_id: &str) -> RoomState {
        if let Some(state) = self.get(room_id).await {
            return state;
        }

        self.rooms
            .write()
            .await
            .entry(room_id.to_string())
            .or_insert_with(Room::random)
            .state
            .clone()
    }

    /// Merge `patch` into one room, creating it if needed.
    pub async fn apply(self: &Arc<Self>, room_id: &str, patch: &RoomStatePatch) -> RoomState {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .entry(room_id.to_string())
            .or_insert_with(Room::random);

        patch.apply(&mut room.state);
        self.track_door(room_id, room, patch.door_locked);
        room.state.clone()
    }

    /// Merge `patch` into every known room. Returns the number of rooms
    /// touched.
    pub async fn apply_all(self: &Arc<Self>, patch: &RoomStatePatch) -> usize {
        let mut rooms = self.rooms.write().await;

        for (room_id, room) in rooms.iter_mut() {
            patch.apply(&mut room.state);
            self.track_door(room_id, room, patch.door_locked);
        }
        rooms.len()
    }

    /// Unlock the door and arm the re-lock timer.
    pub async fn unlock(self: &Arc<Self>, room_id: &str) -> RoomState {
        let patch = RoomStatePatch {
            door_locked: Some(false),
            ..Default::default()
        };
        self.apply(room_id, &patch).await
    }

    /// Lock the door immediately, cancelling any pending re-lock.
    pub async fn lock(self: &Arc<Self>, room_id: &str) -> RoomState {
        let patch = RoomStatePatch {
            door_locked: Some(true),
            ..Default::default()
        };
        self.apply(room_id, &patch).await
    }

    /// One sensor drift step over every room. Returns the number of rooms.
    pub async fn drift(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let mut rng = rand::rng();
        for room in rooms.values_mut() {
            drift::nudge(&mut room.state, &mut rng);
        }
        rooms.len()
    }

    pub async fn has_pending_relock(&self, room_id: &str) -> bool {
        self.rooms
            .read()
            .await
            .get(room_id)
            .is_some_and(|room| room.relock.is_some())
    }

    fn track_door(self: &Arc<Self>, room_id: &str, room: &mut Room, door_locked: Option<bool>) {
        match door_locked {
            Some(false) => {
                room.disarm();
                room.relock = Some(self.spawn_relock(room_id, room.generation));
            }
            Some(true) => room.disarm(),
            None => {}
        }
    }

    fn spawn_relock(self: &Arc<Self>, room_id: &str, generation: u64) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        let delay = self.relock_delay;
        let room_id = room_id.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(registry) = registry.upgrade() {
                registry.relock(&room_id, generation).await;
            }
        })
    }

    async fn relock(&self, room_id: &str, generation: u64) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };

        if room.generation != generation {
            tracing::trace!("Room {} re-lock superseded", room_id);
            return;
        }

        room.relock = None;
        room.state.door_locked = true;
        room.state.touch();
        tracing::debug!("Room {} door locked again after {:?}", room_id, self.relock_delay);
    }
}

/// Fresh room: everything off, door locked, sensor readings drawn from
/// comfortable ranges.
pub fn random_room() -> RoomState {
    let mut rng = rand::rng();

    RoomState {
        lights_on: false,
        door_locked: true,
        channel1: false,
        channel2: false,
        temperature: f64::from(rng.random_range(22i32..26)),
        humidity: f64::from(rng.random_range(40i32..60)),
        pressure: f64::from(rng.random_range(1010i32..1020)),
        last_updated: OffsetDateTime::now_utc(),
    }
}
