// reactor.rs — the UDP I/O reactor: binds the socket, demuxes inbound
// datagrams to client records, dispatches the handshake/matchmaking/input
// protocol, and turns each room's drained `GameEvent`s into outbound
// broadcasts. Mirrors `sv_main.rs` frame loop
// (`SV_ReadPackets`, the per-client walk in `SV_Frame`) generalized from
// one shared world to one game thread per room, each feeding events back
// through a single `EventSink`.
//
// Every datagram is `[sequence_number: u32 LE][payload]`, where `payload`
// is a `wire::Packet::encode()`d body, optionally LZ4-framed. The envelope
// sequence number is what `ReliableChannel::send`/`on_receive` track; it
// lives outside `wire::Packet`'s own header because only this transport
// layer needs it, not the packet codec (mirrors the prior implementation's `net_chan`
// sitting below `SizeBuf`, rather than inside it).

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use wingman_common::compression;
use wingman_common::config::ServerConfig;
use wingman_common::wire::{EnemyType, Packet, PacketType, ProjectileType, RoomError};
use wingman_ecs::components::Position;
use wingman_game::simulation::{DEFAULT_PLAYER_MAX_HEALTH, DEFAULT_PLAYER_SPEED};
use wingman_game::{GameEvent, SimulationConfig};

use crate::client_record::{ClientRecord, ClientRegistry};
use crate::matchmaking::{EventSink, RoomManager};
use crate::player_store::PlayerStore;

const ENVELOPE_SEQ_LEN: usize = 4;
const RECV_BUFFER_SIZE: usize = 4096;
const COMPRESSION_RATIO: f32 = 0.9;
const DEFAULT_ROOM_MAX_PLAYERS: u8 = 4;
const ROOM_TICK: Duration = Duration::from_millis(16);
const MAINTENANCE_INTERVAL: Duration = Duration::from_millis(250);
const SPAWN_X: f32 = 640.0;
const SPAWN_Y: f32 = 360.0;
const PLAYER_PROJECTILE_SPEED: f32 = 420.0;
const PLAYER_PROJECTILE_DAMAGE: u32 = 20;

fn encode_envelope(seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENVELOPE_SEQ_LEN + payload.len());
    out.extend_from_slice(&seq.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn decode_envelope(data: &[u8]) -> Option<(u32, &[u8])> {
    if data.len() < ENVELOPE_SEQ_LEN {
        return None;
    }
    let seq = u32::from_le_bytes(data[..ENVELOPE_SEQ_LEN].try_into().unwrap());
    Some((seq, &data[ENVELOPE_SEQ_LEN..]))
}

fn now_unix_secs() -> u32 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as u32).unwrap_or(0)
}

/// Encode, (maybe) compress, allocate an envelope sequence via the
/// client's channel (registering it for retransmission if reliable), and
/// send. The bytes handed to `ReliableChannel::send` are the
/// pre-envelope payload, so a later resend can re-wrap them with the same
/// sequence number.
fn send_packet(socket: &UdpSocket, client: &mut ClientRecord, packet: &Packet) {
    let reliable = packet.packet_type().is_reliable();
    let body = packet.encode();
    let payload = compression::compress_packet(&body, COMPRESSION_RATIO).unwrap_or(body);
    let seq = client.channel.send(payload.clone(), reliable);
    let datagram = encode_envelope(seq, &payload);
    if let Err(e) = socket.send_to(&datagram, client.peer) {
        warn!(peer = %client.peer, error = %e, "send_to failed");
    }
}

fn send_packet_to(socket: &UdpSocket, clients: &Mutex<ClientRegistry>, player_id: u32, packet: &Packet) {
    let mut clients = clients.lock();
    let Some(client) = clients.get_mut(player_id) else { return };
    send_packet(socket, client, packet);
}

/// Translate one tick's `GameEvent` into the wire packet clients expect.
/// `GameEvent::PlayerDestroy` has
/// no wire counterpart — it's an internal marker always paired with
/// `PlayerDied`, which already carries the visible-to-clients semantics.
fn translate_event(event: GameEvent) -> Option<Packet> {
    use GameEvent::*;
    Some(match event {
        EnemySpawn { enemy_id, x, y, vx, vy, health, max_health } => Packet::EnemySpawn {
            enemy_id,
            enemy_type: EnemyType::BasicFighter,
            x,
            y,
            velocity_x: vx,
            velocity_y: vy,
            health,
            max_health,
        },
        EnemyMove { enemy_id, x, y, vx, vy, seq } => {
            Packet::EnemyMove { enemy_id, x, y, velocity_x: vx, velocity_y: vy, sequence_number: seq }
        }
        EnemyDestroy { enemy_id, x, y, killer_player_id, score } => {
            Packet::EnemyDeath { enemy_id, death_x: x, death_y: y, player_id: killer_player_id, score }
        }
        EnemyHit { enemy_id, x, y, damage, seq } => {
            Packet::EnemyHit { enemy_id, hit_x: x, hit_y: y, damage, sequence_number: seq }
        }
        PlayerHit { player_id, x, y, damage, seq } => {
            Packet::PlayerHit { player_id, damage, x, y, sequence_number: seq }
        }
        PlayerDied { player_id, x, y } => Packet::PlayerDeath { player_id, x, y },
        PlayerDestroy { .. } => return None,
        PositionUpdate { player_id, x, y, seq } => Packet::PlayerMove { player_id, sequence_number: seq, x, y },
        ProjectileSpawn { projectile_id, owner_id, is_enemy_projectile, x, y, vx, vy, speed, damage } => {
            Packet::ProjectileSpawn {
                projectile_id,
                projectile_type: if is_enemy_projectile { ProjectileType::EnemyBasic } else { ProjectileType::PlayerBasic },
                owner_id,
                is_enemy_projectile,
                x,
                y,
                velocity_x: vx,
                velocity_y: vy,
                speed,
                damage,
            }
        }
        ProjectileHit { projectile_id, target_id, target_is_player, x, y } => {
            Packet::ProjectileHit { projectile_id, target_id, target_is_player, hit_x: x, hit_y: y }
        }
        ProjectileDestroy { projectile_id, x, y } => Packet::ProjectileDestroy { projectile_id, x, y },
        ResourceExhausted { resource_err } => {
            warn!(error = %resource_err, "room resource exhausted, ending room");
            Packet::GameEnd { game_end: true }
        }
    })
}

fn broadcast_room_events(
    socket: &UdpSocket,
    clients: &Mutex<ClientRegistry>,
    room_id: u32,
    roster: &[u32],
    events: Vec<GameEvent>,
    just_started: bool,
) {
    if just_started {
        trace!(room_id, "room started, broadcasting GameStart");
        for &player_id in roster {
            send_packet_to(socket, clients, player_id, &Packet::GameStart { game_start: true });
        }
    }
    for event in events {
        if let Some(packet) = translate_event(event) {
            for &player_id in roster {
                send_packet_to(socket, clients, player_id, &packet);
            }
        }
    }
}

/// The authoritative UDP match server: client registry, room manager, and
/// the socket tying them to the wire protocol.
pub struct Reactor {
    socket: Arc<UdpSocket>,
    clients: Arc<Mutex<ClientRegistry>>,
    rooms: Arc<Mutex<RoomManager>>,
    player_store: Arc<Mutex<dyn PlayerStore>>,
    client_timeout: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Reactor {
    pub fn bind(config: &ServerConfig, player_store: Arc<Mutex<dyn PlayerStore>>) -> std::io::Result<Self> {
        let socket = UdpSocket::bind((config.bind_ip, config.port))?;
        socket.set_read_timeout(Some(MAINTENANCE_INTERVAL))?;
        let socket = Arc::new(socket);
        let clients = Arc::new(Mutex::new(ClientRegistry::new(config.max_clients)));

        let sink_socket = Arc::clone(&socket);
        let sink_clients = Arc::clone(&clients);
        let event_sink: EventSink = Arc::new(move |room_id, roster, events, just_started| {
            broadcast_room_events(&sink_socket, &sink_clients, room_id, &roster, events, just_started);
        });

        let rooms = Arc::new(Mutex::new(RoomManager::new(SimulationConfig::default(), ROOM_TICK, event_sink)));

        Ok(Self {
            socket,
            clients,
            rooms,
            player_store,
            client_timeout: config.client_timeout,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared with the caller so an external trigger (a `ctrlc` handler, a
    /// test) can request shutdown without holding a `&Reactor`.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Run the receive loop until the shutdown flag is set, per S7. Blocks
    /// the calling thread.
    pub fn run(&self) {
        let maintenance = self.spawn_maintenance_thread();
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        info!(local_addr = ?self.socket.local_addr(), "reactor listening");

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buf) {
                Ok((len, peer)) => self.handle_datagram(peer, &buf[..len]),
                Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => continue,
                Err(e) => warn!(error = %e, "recv_from failed"),
            }
        }

        let _ = maintenance.join();
        self.rooms.lock().shutdown_all();
        info!("reactor shut down");
    }

    fn spawn_maintenance_thread(&self) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let rooms = Arc::clone(&self.rooms);
        let shutdown = Arc::clone(&self.shutdown);
        let client_timeout = self.client_timeout;

        thread::Builder::new()
            .name("reactor-maintenance".into())
            .spawn(move || {
                while !shutdown.load(Ordering::Relaxed) {
                    thread::sleep(MAINTENANCE_INTERVAL);
                    if shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                    Self::sweep_resends(&socket, &clients);
                    Self::sweep_timed_out_clients(&socket, &clients, &rooms, client_timeout);
                    let removed = rooms.lock().sweep_finished_rooms();
                    if !removed.is_empty() {
                        debug!(?removed, "garbage-collected finished rooms");
                    }
                }
            })
            .expect("failed to spawn reactor maintenance thread")
    }

    fn sweep_resends(socket: &UdpSocket, clients: &Mutex<ClientRegistry>) {
        let mut clients = clients.lock();
        for client in clients.iter_mut() {
            let sweep = client.channel.sweep_resends();
            for (seq, bytes) in sweep.to_resend {
                let datagram = encode_envelope(seq, &bytes);
                if let Err(e) = socket.send_to(&datagram, client.peer) {
                    warn!(peer = %client.peer, error = %e, "resend failed");
                }
            }
            for seq in sweep.dropped {
                warn!(peer = %client.peer, seq, "reliable packet dropped after max resend attempts");
            }
            client.channel.sweep_stale_entries();
        }
    }

    fn sweep_timed_out_clients(
        socket: &UdpSocket,
        clients: &Mutex<ClientRegistry>,
        rooms: &Mutex<RoomManager>,
        timeout: Duration,
    ) {
        let disconnected = clients.lock().sweep_timeouts(timeout);
        for client in disconnected {
            info!(player_id = client.player_id, peer = %client.peer, "client timed out");
            let Some(room_id) = client.room_id else { continue };
            let mut rooms_guard = rooms.lock();
            rooms_guard.leave_room(client.player_id, room_id);
            let roster = rooms_guard.with_room(room_id, |room| room.roster.clone()).unwrap_or_default();
            drop(rooms_guard);

            let packet = Packet::PlayerDisconnected { player_id: client.player_id };
            for &peer_id in &roster {
                send_packet_to(socket, clients, peer_id, &packet);
            }
        }
    }

    fn send_to_player(&self, player_id: u32, packet: &Packet) {
        send_packet_to(&self.socket, &self.clients, player_id, packet);
    }

    fn handle_datagram(&self, peer: SocketAddr, data: &[u8]) {
        let Some((seq, payload)) = decode_envelope(data) else {
            warn!(%peer, "datagram shorter than the envelope, dropping");
            return;
        };

        let raw = if compression::is_compressed(payload) {
            match compression::decompress_packet(payload) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(%peer, error = %e, "bad compression frame, dropping");
                    return;
                }
            }
        } else {
            payload.to_vec()
        };

        let packet = match Packet::decode(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(%peer, error = %e, "bad packet, dropping");
                return;
            }
        };

        self.dispatch(peer, seq, packet);
    }

    fn dispatch(&self, peer: SocketAddr, seq: u32, packet: Packet) {
        let kind = packet.packet_type();

        // PlayerInfo is the one packet a brand-new peer may send before it
        // has a ClientRecord (and therefore a channel to dedup/ack through).
        if let Packet::PlayerInfo { name } = &packet {
            self.handle_player_info(peer, name.clone(), seq);
            return;
        }

        let Some(player_id) = self.clients.lock().by_addr(peer).map(|c| c.player_id) else {
            debug!(%peer, ?kind, "packet from unregistered peer, dropping");
            return;
        };

        if kind.is_reliable() {
            let first_time = {
                let clients = self.clients.lock();
                let client = clients.get(player_id).expect("player_id resolved above");
                client.channel.on_receive(peer, kind, seq)
            };
            self.send_to_player(player_id, &Packet::Ack { sequence_number: seq });
            if !first_time {
                return;
            }
        }

        self.clients.lock().touch_heartbeat(player_id);

        match packet {
            Packet::Ack { sequence_number } => self.handle_ack(player_id, sequence_number),
            Packet::Heartbeat { .. } => {}
            Packet::ChatMessage { message, r, g, b, a, .. } => self.handle_chat(player_id, message, r, g, b, a),
            Packet::MatchmakingRequest => self.handle_matchmake(player_id),
            Packet::CreateRoom { room_name, is_private, password, max_players } => {
                self.handle_create_room(player_id, room_name, is_private, password, max_players)
            }
            Packet::JoinRoom { room_id, password } => self.handle_join_room(player_id, room_id, password),
            Packet::LeaveRoom { room_id } => self.handle_leave_room(player_id, room_id),
            Packet::ListRoom => self.handle_list_room(player_id),
            Packet::RequestChallenge { room_id } => self.handle_request_challenge(player_id, room_id),
            Packet::PlayerInput { input, sequence_number } => self.handle_player_input(player_id, input, sequence_number),
            Packet::PlayerShoot { x, y, sequence_number, .. } => self.handle_player_shoot(player_id, x, y, sequence_number),
            Packet::ScoreboardRequest { limit } => self.handle_scoreboard_request(player_id, limit),
            _ => debug!(?kind, "unhandled inbound packet kind"),
        }
    }

    /// S1: `PlayerInfo{name}` handshake. Registers the client (menu state,
    /// no room) if under capacity, then always acks — registering twice
    /// for the same peer is idempotent, so a resent handshake is safe.
    fn handle_player_info(&self, peer: SocketAddr, name: String, seq: u32) {
        let player_id = {
            let mut clients = self.clients.lock();
            match clients.register(peer, name) {
                Some(id) => id,
                None => {
                    warn!(%peer, "server at capacity, rejecting handshake");
                    return;
                }
            }
        };

        let first_time = {
            let clients = self.clients.lock();
            let client = clients.get(player_id).expect("just registered");
            client.channel.on_receive(peer, PacketType::PlayerInfo, seq)
        };
        self.send_to_player(player_id, &Packet::Ack { sequence_number: seq });
        if first_time {
            self.clients.lock().touch_heartbeat(player_id);
            info!(%peer, player_id, "handshake complete");
        }
    }

    fn handle_ack(&self, player_id: u32, sequence_number: u32) {
        let clients = self.clients.lock();
        if let Some(client) = clients.get(player_id) {
            client.channel.on_ack(sequence_number);
        }
    }

    fn player_room(&self, player_id: u32) -> Option<u32> {
        self.clients.lock().get(player_id).and_then(|c| c.room_id)
    }

    /// Common tail of matchmake/create/join: spawn the player's entity in
    /// the room's simulation, record the room/entity on the client, and
    /// broadcast `NewPlayer` to the room's roster (including the joiner
    /// themself, per S2). If the room's registry is at entity capacity,
    /// `spawn_player` has already pushed a `GameEvent::ResourceExhausted`
    /// that ends the room on its next tick (see `RoomHandle::spawn` and
    /// `translate_event`); this just avoids attaching the joiner to a
    /// room that's about to finish.
    fn finish_join(&self, player_id: u32, room_id: u32) {
        let name = self.clients.lock().get(player_id).map(|c| c.name.clone()).unwrap_or_default();

        let entity = {
            let rooms = self.rooms.lock();
            rooms
                .with_room_mut(room_id, |room| {
                    room.simulation
                        .spawn_player(player_id, name.clone(), SPAWN_X, SPAWN_Y, DEFAULT_PLAYER_SPEED, DEFAULT_PLAYER_MAX_HEALTH)
                        .map_err(|e| warn!(player_id, room_id, error = %e, "player spawn failed, room ending"))
                        .ok()
                })
                .flatten()
        };
        let Some(entity) = entity else { return };

        {
            let mut clients = self.clients.lock();
            if let Some(client) = clients.get_mut(player_id) {
                client.room_id = Some(room_id);
                client.entity = Some(entity);
            }
        }

        let roster = self.rooms.lock().with_room(room_id, |room| room.roster.clone()).unwrap_or_default();
        let new_player = Packet::NewPlayer {
            player_id,
            player_name: name,
            x: SPAWN_X,
            y: SPAWN_Y,
            speed: DEFAULT_PLAYER_SPEED,
            max_health: DEFAULT_PLAYER_MAX_HEALTH,
        };
        for &peer_id in &roster {
            self.send_to_player(peer_id, &new_player);
        }
    }

    /// S2: `MatchmakingRequest{}` — join the first joinable public room or
    /// a freshly created one.
    fn handle_matchmake(&self, player_id: u32) {
        if self.player_room(player_id).is_some() {
            self.send_to_player(player_id, &Packet::MatchmakingResponse { error_code: RoomError::AlreadyInRoom });
            return;
        }
        let room_id = self.rooms.lock().matchmake(player_id, DEFAULT_ROOM_MAX_PLAYERS);
        self.finish_join(player_id, room_id);
        self.send_to_player(player_id, &Packet::MatchmakingResponse { error_code: RoomError::Success });
    }

    fn handle_create_room(&self, player_id: u32, room_name: String, is_private: bool, password: String, max_players: u8) {
        if self.player_room(player_id).is_some() {
            self.send_to_player(player_id, &Packet::CreateRoomResponse { error_code: RoomError::AlreadyInRoom, room_id: 0 });
            return;
        }
        let max_players = if max_players == 0 { DEFAULT_ROOM_MAX_PLAYERS } else { max_players };
        let password = (is_private && !password.is_empty()).then_some(password);

        let room_id = {
            let mut rooms = self.rooms.lock();
            let room_id = rooms.create_room(room_name, is_private, password, max_players);
            rooms.with_room_mut(room_id, |room| room.add_player(player_id));
            room_id
        };
        self.finish_join(player_id, room_id);
        self.send_to_player(player_id, &Packet::CreateRoomResponse { error_code: RoomError::Success, room_id });
    }

    /// S3: `JoinRoom{room_id, password}`.
    fn handle_join_room(&self, player_id: u32, room_id: u32, password: String) {
        let already_in_room = self.player_room(player_id).is_some();
        let result = self.rooms.lock().join_room(player_id, room_id, &password, already_in_room);
        match result {
            Ok(()) => {
                self.finish_join(player_id, room_id);
                self.send_to_player(player_id, &Packet::JoinRoomResponse { error_code: RoomError::Success });
            }
            Err(error_code) => self.send_to_player(player_id, &Packet::JoinRoomResponse { error_code }),
        }
    }

    fn handle_leave_room(&self, player_id: u32, room_id: u32) {
        let roster = {
            let mut rooms = self.rooms.lock();
            rooms.leave_room(player_id, room_id);
            rooms.with_room(room_id, |room| room.roster.clone()).unwrap_or_default()
        };
        if let Some(client) = self.clients.lock().get_mut(player_id) {
            client.room_id = None;
            client.entity = None;
        }
        let packet = Packet::PlayerDisconnected { player_id };
        for &peer_id in &roster {
            self.send_to_player(peer_id, &packet);
        }
    }

    fn handle_list_room(&self, player_id: u32) {
        let rooms = self.rooms.lock().list_public_rooms();
        self.send_to_player(player_id, &Packet::ListRoomResponse { rooms });
    }

    /// Step 2 of the private-room join protocol: issue a nonce the client
    /// hashes with the real password to prove knowledge of it.
    fn handle_request_challenge(&self, player_id: u32, room_id: u32) {
        match self.rooms.lock().request_challenge(player_id, room_id) {
            Ok(challenge) => {
                self.send_to_player(player_id, &Packet::ChallengeResponse { challenge, timestamp: now_unix_secs() });
            }
            Err(_) => {
                warn!(player_id, room_id, "challenge requested for an unknown room");
            }
        }
    }

    /// S4: `PlayerInput{input, sequence_number}` — forwarded to the room's
    /// simulation; applied on its next tick.
    fn handle_player_input(&self, player_id: u32, input: u8, sequence_number: u32) {
        let Some(room_id) = self.player_room(player_id) else { return };
        self.rooms.lock().with_room_mut(room_id, |room| {
            room.simulation.record_input(player_id, input, sequence_number);
        });
    }

    /// `PlayerShoot{x, y, ...}` — `x, y` is the aim direction; the spawn
    /// origin is the player's own server-authoritative position, never
    /// trusted from the client.
    fn handle_player_shoot(&self, player_id: u32, aim_x: f32, aim_y: f32, _sequence_number: u32) {
        let Some(room_id) = self.player_room(player_id) else { return };
        self.rooms.lock().with_room_mut(room_id, |room| {
            let Some(entity) = room.simulation.player_entity(player_id) else { return };
            let Ok(&Position { x, y }) = room.simulation.registry.get_component::<Position>(entity) else { return };
            let _ = room.simulation.spawn_player_projectile(
                player_id,
                x,
                y,
                aim_x,
                aim_y,
                PLAYER_PROJECTILE_SPEED,
                PLAYER_PROJECTILE_DAMAGE,
            );
        });
    }

    fn handle_chat(&self, player_id: u32, message: String, r: u8, g: u8, b: u8, a: u8) {
        let Some(room_id) = self.player_room(player_id) else { return };
        let roster = self.rooms.lock().with_room(room_id, |room| room.roster.clone()).unwrap_or_default();
        let packet = Packet::ChatMessage { timestamp: now_unix_secs(), message, player_id, r, g, b, a };
        for &peer_id in &roster {
            self.send_to_player(peer_id, &packet);
        }
    }

    fn handle_scoreboard_request(&self, player_id: u32, limit: u32) {
        let scores = self.player_store.lock().top_scores(limit as usize);
        self.send_to_player(player_id, &Packet::ScoreboardResponse { scores });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_sequence_and_payload() {
        let datagram = encode_envelope(42, b"hello");
        let (seq, payload) = decode_envelope(&datagram).unwrap();
        assert_eq!(seq, 42);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn envelope_decode_rejects_short_datagrams() {
        assert!(decode_envelope(&[1, 2, 3]).is_none());
    }

    #[test]
    fn player_destroy_event_has_no_wire_packet() {
        assert!(translate_event(GameEvent::PlayerDestroy { player_id: 1 }).is_none());
    }

    #[test]
    fn position_update_translates_to_player_move() {
        let packet = translate_event(GameEvent::PositionUpdate { player_id: 1, x: 1.0, y: 2.0, seq: 9 }).unwrap();
        assert!(matches!(packet, Packet::PlayerMove { player_id: 1, sequence_number: 9, .. }));
    }

    #[test]
    fn resource_exhausted_translates_to_game_end() {
        use wingman_common::ResourceError;
        let packet = translate_event(GameEvent::ResourceExhausted {
            resource_err: ResourceError::EntityCapacityExhausted { capacity: 512 },
        })
        .unwrap();
        assert!(matches!(packet, Packet::GameEnd { game_end: true }));
    }
}
