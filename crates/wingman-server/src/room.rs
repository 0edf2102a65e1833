// room.rs — one match instance: state machine, roster, and the dedicated
// simulation thread. The tick loop itself is `wingman_game::Simulation`,
// kept isolated per room with its own registry and own event queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use wingman_game::{EnemySpawnPolicy, GameEvent, Simulation, SimulationConfig};

/// Countdown between a room reaching its minimum player count and
/// transitioning to `Running`.
pub const STARTING_COUNTDOWN: Duration = Duration::from_secs(5);

/// Minimum roster size that begins the countdown.
pub const MIN_PLAYERS_TO_START: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Waiting,
    Starting,
    Running,
    Finished,
}

pub struct Room {
    pub id: u32,
    pub name: String,
    pub private: bool,
    pub password: Option<String>,
    pub max_players: u8,
    pub roster: Vec<u32>,
    pub state: RoomState,
    starting_since: Option<Instant>,
    pub simulation: Simulation,
}

impl Room {
    pub fn new(
        id: u32,
        name: String,
        private: bool,
        password: Option<String>,
        max_players: u8,
        sim_config: SimulationConfig,
        spawn_policy: Box<dyn EnemySpawnPolicy>,
    ) -> Self {
        Self {
            id,
            name,
            private,
            password,
            max_players,
            roster: Vec::new(),
            state: RoomState::Waiting,
            starting_since: None,
            simulation: Simulation::new(512, sim_config, spawn_policy),
        }
    }

    pub fn is_full(&self) -> bool {
        self.roster.len() as u8 >= self.max_players
    }

    pub fn is_public_and_joinable(&self) -> bool {
        !self.private && self.state == RoomState::Waiting && !self.is_full()
    }

    pub fn add_player(&mut self, player_id: u32) {
        if !self.roster.contains(&player_id) {
            self.roster.push(player_id);
        }
        if self.state == RoomState::Waiting && self.roster.len() >= MIN_PLAYERS_TO_START {
            self.state = RoomState::Starting;
            self.starting_since = Some(Instant::now());
        }
    }

    pub fn remove_player(&mut self, player_id: u32) {
        self.roster.retain(|&id| id != player_id);
        self.simulation.despawn_player(player_id);
    }

    /// Called by the room's countdown check (owned by the game thread, or a
    /// test driving it directly): transitions `Starting` -> `Running` once
    /// [`STARTING_COUNTDOWN`] has elapsed. Returns `true` on transition.
    pub fn advance_countdown(&mut self) -> bool {
        if self.state != RoomState::Starting {
            return false;
        }
        let Some(since) = self.starting_since else { return false };
        if since.elapsed() >= STARTING_COUNTDOWN {
            self.state = RoomState::Running;
            self.starting_since = None;
            true
        } else {
            false
        }
    }

    pub fn finish(&mut self) {
        self.state = RoomState::Finished;
    }

    pub fn is_empty_and_finished(&self) -> bool {
        self.state == RoomState::Finished && self.roster.is_empty()
    }
}

/// Owns the background thread driving one room's fixed-step tick. The
/// room itself lives behind `Arc<Mutex<Room>>` so the reactor thread can
/// still reach in (e.g. to record a `PlayerInput`) between ticks.
pub struct RoomHandle {
    pub room: Arc<Mutex<Room>>,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl RoomHandle {
    /// Spawn the game thread over an already-shared room (the reactor
    /// keeps its own `Arc` to reach in between ticks, e.g. to record a
    /// `PlayerInput`). `on_events` is called with each tick's drained
    /// events, plus whether this tick is the one where the countdown
    /// finished and the room just became `Running` (so the caller can
    /// broadcast `GameStart` — the state machine has no `GameEvent` of its
    /// own, since that enum belongs to the simulation, not the room). The
    /// simulation never sends directly.
    pub fn spawn<F>(room: Arc<Mutex<Room>>, tick_dt: Duration, mut on_events: F) -> Self
    where
        F: FnMut(u32, Vec<GameEvent>, bool) + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));

        let room_for_thread = Arc::clone(&room);
        let shutdown_for_thread = Arc::clone(&shutdown);
        let join = thread::Builder::new()
            .name(format!("room-{}", room_for_thread.lock().id))
            .spawn(move || {
                while !shutdown_for_thread.load(Ordering::Relaxed) {
                    let tick_start = Instant::now();
                    let (room_id, events, just_started, finished) = {
                        let mut room = room_for_thread.lock();
                        if room.state == RoomState::Finished {
                            (room.id, Vec::new(), false, true)
                        } else {
                            let just_started = room.advance_countdown();
                            if room.state == RoomState::Running {
                                room.simulation.tick(tick_dt.as_secs_f32());
                            }
                            let events = room.simulation.events.drain();
                            // A resource-exhausted spawn is fatal to the room per
                            // the resource error taxonomy: finish it now so the
                            // thread exits at its next tick boundary, after this
                            // tick's events (including the GameEnd translation)
                            // have already reached `on_events`.
                            if events.iter().any(|e| matches!(e, GameEvent::ResourceExhausted { .. })) {
                                room.finish();
                            }
                            (room.id, events, just_started, false)
                        }
                    };
                    if just_started || !events.is_empty() {
                        on_events(room_id, events, just_started);
                    }
                    if finished {
                        break;
                    }

                    let elapsed = tick_start.elapsed();
                    if elapsed < tick_dt {
                        thread::sleep(tick_dt - elapsed);
                    }
                }
            })
            .expect("failed to spawn room game thread");

        Self { room, shutdown, join: Some(join) }
    }

    /// Mark the room `Finished` and join its game thread; the thread exits
    /// at the next tick boundary.
    pub fn shutdown(&mut self) {
        self.room.lock().finish();
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for RoomHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_game::NoSpawning;

    fn new_room(id: u32, max_players: u8) -> Room {
        Room::new(id, format!("room-{id}"), false, None, max_players, SimulationConfig::default(), Box::new(NoSpawning))
    }

    #[test]
    fn room_starts_waiting_and_transitions_at_min_players() {
        let mut room = new_room(1, 4);
        assert_eq!(room.state, RoomState::Waiting);
        room.add_player(1);
        assert_eq!(room.state, RoomState::Waiting);
        room.add_player(2);
        assert_eq!(room.state, RoomState::Starting);
    }

    #[test]
    fn full_room_is_not_joinable() {
        let mut room = new_room(1, 1);
        room.add_player(1);
        assert!(room.is_full());
        assert!(!room.is_public_and_joinable());
    }

    #[test]
    fn private_room_is_never_publicly_joinable() {
        let mut room = Room::new(1, "secret".into(), true, Some("hash".into()), 4, SimulationConfig::default(), Box::new(NoSpawning));
        assert!(!room.is_public_and_joinable());
    }

    #[test]
    fn finished_empty_room_is_collectible() {
        let mut room = new_room(1, 4);
        room.add_player(1);
        room.remove_player(1);
        room.finish();
        assert!(room.is_empty_and_finished());
    }

    #[test]
    fn resource_exhausted_event_finishes_the_room() {
        use wingman_common::ResourceError;
        use wingman_game::GameEvent;

        let room = Arc::new(Mutex::new(new_room(1, 4)));
        room.lock().simulation.events.push(GameEvent::ResourceExhausted {
            resource_err: ResourceError::EntityCapacityExhausted { capacity: 512 },
        });

        let saw_resource_exhausted = Arc::new(AtomicBool::new(false));
        let saw_for_thread = Arc::clone(&saw_resource_exhausted);
        let mut handle = RoomHandle::spawn(Arc::clone(&room), Duration::from_millis(5), move |_room_id, events, _just_started| {
            if events.iter().any(|e| matches!(e, GameEvent::ResourceExhausted { .. })) {
                saw_for_thread.store(true, Ordering::Relaxed);
            }
        });

        for _ in 0..20 {
            if saw_resource_exhausted.load(Ordering::Relaxed) && room.lock().state == RoomState::Finished {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert!(saw_resource_exhausted.load(Ordering::Relaxed));
        assert_eq!(room.lock().state, RoomState::Finished);

        handle.shutdown();
    }

    #[test]
    fn countdown_does_not_advance_before_it_elapses() {
        let mut room = new_room(1, 4);
        room.add_player(1);
        room.add_player(2);
        assert!(!room.advance_countdown());
        assert_eq!(room.state, RoomState::Starting);
    }
}
