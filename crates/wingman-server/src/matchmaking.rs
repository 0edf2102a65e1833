// matchmaking.rs — room lifecycle and the join/leave/list/matchmake/
// challenge protocol. Each room is backed by its own
// game thread (`RoomHandle`, see room.rs); `RoomManager` itself takes
// `&mut self`/`&self` throughout and does no internal locking of its own
// map — the owner (the reactor, behind its own single mutex) serializes
// structural changes, while `with_room`/`with_room_mut` reach through to
// the per-room lock for everything that touches `Room` fields.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use wingman_common::wire::{RoomError, RoomInfo};
use wingman_game::{GameEvent, NoSpawning, SimulationConfig};

use crate::challenge::ChallengeStore;
use crate::room::{Room, RoomHandle, RoomState};

/// Room name used when matchmaking creates a fresh room without an
/// explicit name.
fn generated_room_name(room_id: u32) -> String {
    format!("room-{room_id}")
}

/// Callback fired with every tick's drained events for a room, that
/// room's roster at drain time (so the reactor knows who to broadcast to
/// without reaching back into `RoomManager`, which it may not hold the
/// lock to from the room's own game thread), and whether this tick is the
/// one where the countdown finished (the room just became `Running`, so
/// the reactor should also broadcast `GameStart`). Cheaply `Clone`-able so
/// each room's game thread can carry its own copy into the closure
/// `RoomHandle::spawn` takes ownership of.
pub type EventSink = Arc<dyn Fn(u32, Vec<u32>, Vec<GameEvent>, bool) + Send + Sync>;

pub struct RoomManager {
    rooms: HashMap<u32, RoomHandle>,
    next_room_id: u32,
    challenges: ChallengeStore,
    sim_config: SimulationConfig,
    tick_dt: Duration,
    event_sink: EventSink,
}

impl RoomManager {
    pub fn new(sim_config: SimulationConfig, tick_dt: Duration, event_sink: EventSink) -> Self {
        Self {
            rooms: HashMap::new(),
            next_room_id: 1,
            challenges: ChallengeStore::new(),
            sim_config,
            tick_dt,
            event_sink,
        }
    }

    /// Run `f` against the room's current state under its lock. Returns
    /// `None` if the room doesn't exist.
    pub fn with_room<R>(&self, room_id: u32, f: impl FnOnce(&Room) -> R) -> Option<R> {
        self.rooms.get(&room_id).map(|handle| f(&handle.room.lock()))
    }

    /// Like [`RoomManager::with_room`] but with mutable access.
    pub fn with_room_mut<R>(&self, room_id: u32, f: impl FnOnce(&mut Room) -> R) -> Option<R> {
        self.rooms.get(&room_id).map(|handle| f(&mut handle.room.lock()))
    }

    pub fn room_exists(&self, room_id: u32) -> bool {
        self.rooms.contains_key(&room_id)
    }

    /// `CreateRoom{name, is_private, password, max_players}` — assigns the
    /// next room id, stores the password as a SHA256-of-challenge gate
    /// (checked via [`RoomManager::request_challenge`]/`validate_join`) for
    /// private rooms, spawns the room's game thread, and returns the new id.
    pub fn create_room(&mut self, name: String, private: bool, password: Option<String>, max_players: u8) -> u32 {
        let room_id = self.next_room_id;
        self.next_room_id += 1;
        let name = if name.is_empty() { generated_room_name(room_id) } else { name };
        let room = Room::new(room_id, name, private, password, max_players, self.sim_config, Box::new(NoSpawning));
        let shared = Arc::new(Mutex::new(room));

        let room_for_sink = Arc::clone(&shared);
        let sink = Arc::clone(&self.event_sink);
        let handle = RoomHandle::spawn(shared, self.tick_dt, move |room_id, events, just_started| {
            let roster = room_for_sink.lock().roster.clone();
            sink(room_id, roster, events, just_started);
        });
        self.rooms.insert(room_id, handle);
        room_id
    }

    /// Finish and join every room's game thread, per S7's graceful
    /// shutdown. Dropping each `RoomHandle` marks its room `Finished` and
    /// blocks until the thread exits at its next tick boundary.
    pub fn shutdown_all(&mut self) {
        self.rooms.clear();
    }

    /// `RequestChallenge{room_id}` — step 2 of the join protocol for
    /// private rooms. Fails with `RoomNotFound` if the room doesn't exist.
    pub fn request_challenge(&mut self, player_id: u32, room_id: u32) -> Result<String, RoomError> {
        if !self.room_exists(room_id) {
            return Err(RoomError::RoomNotFound);
        }
        Ok(self.challenges.issue(player_id, room_id))
    }

    /// `JoinRoom{room_id, password}` where `password` is
    /// `SHA256(nonce ‖ real_password)` hex for private rooms, or the plain
    /// (empty) password for public ones.
    pub fn join_room(&mut self, player_id: u32, room_id: u32, password: &str, already_in_room: bool) -> Result<(), RoomError> {
        if already_in_room {
            return Err(RoomError::AlreadyInRoom);
        }
        let Some(handle) = self.rooms.get(&room_id) else { return Err(RoomError::RoomNotFound) };
        let mut room = handle.room.lock();
        if room.is_full() {
            return Err(RoomError::RoomFull);
        }
        if room.private {
            let Some(expected_hash) = room.password.clone() else { return Err(RoomError::WrongPassword) };
            if !self.challenges.validate_and_consume(player_id, room_id, &expected_hash, password) {
                return Err(RoomError::WrongPassword);
            }
        }
        room.add_player(player_id);
        Ok(())
    }

    pub fn leave_room(&mut self, player_id: u32, room_id: u32) {
        self.with_room_mut(room_id, |room| room.remove_player(player_id));
    }

    /// `ListRoom` — public, non-full, not-yet-running rooms only.
    pub fn list_public_rooms(&self) -> Vec<RoomInfo> {
        self.rooms
            .values()
            .filter_map(|handle| {
                let room = handle.room.lock();
                (!room.private && room.state != RoomState::Finished).then(|| RoomInfo {
                    room_id: room.id,
                    room_name: room.name.clone(),
                    player_count: room.roster.len() as u8,
                    max_players: room.max_players,
                })
            })
            .collect()
    }

    /// `MatchmakingRequest{}` — the first `Waiting` non-full public room,
    /// or a freshly created one if none exists.
    pub fn matchmake(&mut self, player_id: u32, default_max_players: u8) -> u32 {
        let existing = self
            .rooms
            .iter()
            .find(|(_, handle)| handle.room.lock().is_public_and_joinable())
            .map(|(&id, _)| id);

        let room_id = existing.unwrap_or_else(|| self.create_room(String::new(), false, None, default_max_players));
        self.with_room_mut(room_id, |room| room.add_player(player_id));
        room_id
    }

    /// Garbage-collect every `Finished` room whose roster is empty.
    /// Dropping the `RoomHandle`
    /// joins its game thread (already idle, since the room is finished).
    pub fn sweep_finished_rooms(&mut self) -> Vec<u32> {
        let to_remove: Vec<u32> = self
            .rooms
            .iter()
            .filter(|(_, handle)| handle.room.lock().is_empty_and_finished())
            .map(|(&id, _)| id)
            .collect();
        for id in &to_remove {
            self.rooms.remove(id);
        }
        to_remove
    }
}
