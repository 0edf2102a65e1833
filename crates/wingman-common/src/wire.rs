// wire.rs — packet framing, type tags, and per-variant (de)serialization.
//
// Wire format: `header{type:u8, size:u32} | body`, little-endian, native
// f32 layout, length-prefixed strings. This mirrors the prior implementation's
// `SizeBuf`/`msg_write_*`/`msg_read_*` pair (myq2-common/src/common.rs) in
// shape — a cursor over an owned byte buffer for writing, a cursor over a
// borrowed slice for reading — generalized to this protocol's closed
// packet-type enum instead of quake2's `svc_*`/`clc_*` op codes.
//
// Per the design notes' "packed network structs" flag, there is no
// `#[repr(C)]`/alignment trick anywhere here: every field is written and
// read one at a time, in the order this module defines.

use crate::error::TransportError;

/// Size of the fixed packet header: 1-byte type tag + 4-byte LE size.
pub const HEADER_SIZE: usize = 5;

/// Strings longer than this are truncated on encode (room/player names,
/// passwords). Chat messages are exempt.
pub const MAX_SHORT_STRING: usize = 32;

// =============================================================================
// ByteWriter / ByteReader — cursor helpers
// =============================================================================

#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(64) }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Length-u16-prefixed UTF-8 string, truncated to `max_len` bytes
    /// (on a char boundary) before the length is written.
    pub fn write_str(&mut self, s: &str, max_len: usize) {
        let truncated = truncate_on_boundary(s, max_len);
        self.write_u16(truncated.len() as u16);
        self.buf.extend_from_slice(truncated.as_bytes());
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

fn truncate_on_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn need(&self, n: usize) -> Result<(), TransportError> {
        if self.pos + n > self.data.len() {
            return Err(TransportError::Truncated {
                need: self.pos + n,
                have: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, TransportError> {
        self.need(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16, TransportError> {
        self.need(2)?;
        let v = u16::from_le_bytes(self.data[self.pos..self.pos + 2].try_into().unwrap());
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32, TransportError> {
        self.need(4)?;
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    pub fn read_f32(&mut self) -> Result<f32, TransportError> {
        self.need(4)?;
        let v = f32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    pub fn read_str(&mut self) -> Result<String, TransportError> {
        let len = self.read_u16()? as usize;
        self.need(len)?;
        let s = String::from_utf8_lossy(&self.data[self.pos..self.pos + len]).into_owned();
        self.pos += len;
        Ok(s)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], TransportError> {
        self.need(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// =============================================================================
// Closed packet-type enum
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    ChatMessage = 0x01,
    PlayerMove = 0x02,
    NewPlayer = 0x03,
    PlayerInfo = 0x04,
    EnemySpawn = 0x05,
    EnemyMove = 0x06,
    EnemyDeath = 0x07,
    PlayerShoot = 0x08,
    ProjectileSpawn = 0x09,
    ProjectileHit = 0x0A,
    ProjectileDestroy = 0x0B,
    GameStart = 0x0C,
    GameEnd = 0x0D,
    PlayerDisconnected = 0x0E,
    Heartbeat = 0x0F,
    EnemyHit = 0x10,
    PlayerHit = 0x11,
    PlayerDeath = 0x12,
    CreateRoom = 0x13,
    JoinRoom = 0x14,
    LeaveRoom = 0x15,
    ListRoom = 0x16,
    ListRoomResponse = 0x17,
    MatchmakingRequest = 0x18,
    MatchmakingResponse = 0x19,
    JoinRoomResponse = 0x1A,
    PlayerInput = 0x1B,
    RequestChallenge = 0x1C,
    ChallengeResponse = 0x1D,
    CreateRoomResponse = 0x1E,
    ScoreboardRequest = 0x1F,
    ScoreboardResponse = 0x20,
    Ack = 0x21,
}

impl PacketType {
    pub fn from_u8(tag: u8) -> Result<Self, TransportError> {
        use PacketType::*;
        Ok(match tag {
            0x01 => ChatMessage,
            0x02 => PlayerMove,
            0x03 => NewPlayer,
            0x04 => PlayerInfo,
            0x05 => EnemySpawn,
            0x06 => EnemyMove,
            0x07 => EnemyDeath,
            0x08 => PlayerShoot,
            0x09 => ProjectileSpawn,
            0x0A => ProjectileHit,
            0x0B => ProjectileDestroy,
            0x0C => GameStart,
            0x0D => GameEnd,
            0x0E => PlayerDisconnected,
            0x0F => Heartbeat,
            0x10 => EnemyHit,
            0x11 => PlayerHit,
            0x12 => PlayerDeath,
            0x13 => CreateRoom,
            0x14 => JoinRoom,
            0x15 => LeaveRoom,
            0x16 => ListRoom,
            0x17 => ListRoomResponse,
            0x18 => MatchmakingRequest,
            0x19 => MatchmakingResponse,
            0x1A => JoinRoomResponse,
            0x1B => PlayerInput,
            0x1C => RequestChallenge,
            0x1D => ChallengeResponse,
            0x1E => CreateRoomResponse,
            0x1F => ScoreboardRequest,
            0x20 => ScoreboardResponse,
            0x21 => Ack,
            other => return Err(TransportError::UnknownKind(other)),
        })
    }

    /// Whether this kind is sent with delivery guarantees (retried until
    /// ack'd or dropped).
    pub fn is_reliable(self) -> bool {
        use PacketType::*;
        !matches!(self, Heartbeat | PlayerMove | EnemyMove | Ack)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnemyType {
    BasicFighter = 0x01,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProjectileType {
    PlayerBasic = 0x01,
    EnemyBasic = 0x02,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RoomError {
    Success = 0x00,
    RoomNotFound = 0x01,
    RoomFull = 0x02,
    WrongPassword = 0x03,
    AlreadyInRoom = 0x04,
    PlayerBanned = 0x05,
    UnknownError = 0x06,
}

impl RoomError {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x00 => RoomError::Success,
            0x01 => RoomError::RoomNotFound,
            0x02 => RoomError::RoomFull,
            0x03 => RoomError::WrongPassword,
            0x04 => RoomError::AlreadyInRoom,
            0x05 => RoomError::PlayerBanned,
            _ => RoomError::UnknownError,
        }
    }
}

impl From<crate::error::SessionError> for RoomError {
    fn from(e: crate::error::SessionError) -> Self {
        use crate::error::SessionError as S;
        match e {
            S::RoomNotFound => RoomError::RoomNotFound,
            S::RoomFull => RoomError::RoomFull,
            S::WrongPassword => RoomError::WrongPassword,
            S::AlreadyInRoom => RoomError::AlreadyInRoom,
            S::PlayerBanned => RoomError::PlayerBanned,
            S::Unknown => RoomError::UnknownError,
        }
    }
}

/// Bits of `PlayerInput::bitmask`.
pub mod input_bits {
    pub const UP: u8 = 1 << 0;
    pub const DOWN: u8 = 1 << 1;
    pub const LEFT: u8 = 1 << 2;
    pub const RIGHT: u8 = 1 << 3;
}

// =============================================================================
// Packet payloads
// =============================================================================

#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: u32,
    pub room_name: String,
    pub player_count: u8,
    pub max_players: u8,
}

#[derive(Debug, Clone)]
pub struct ScoreEntry {
    pub player_name: String,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub enum Packet {
    ChatMessage { timestamp: u32, message: String, player_id: u32, r: u8, g: u8, b: u8, a: u8 },
    PlayerMove { player_id: u32, sequence_number: u32, x: f32, y: f32 },
    NewPlayer { player_id: u32, player_name: String, x: f32, y: f32, speed: f32, max_health: u32 },
    PlayerInfo { name: String },
    EnemySpawn { enemy_id: u32, enemy_type: EnemyType, x: f32, y: f32, velocity_x: f32, velocity_y: f32, health: u32, max_health: u32 },
    EnemyMove { enemy_id: u32, x: f32, y: f32, velocity_x: f32, velocity_y: f32, sequence_number: u32 },
    EnemyDeath { enemy_id: u32, death_x: f32, death_y: f32, player_id: u32, score: u32 },
    PlayerShoot { x: f32, y: f32, projectile_type: ProjectileType, sequence_number: u32 },
    ProjectileSpawn { projectile_id: u32, projectile_type: ProjectileType, owner_id: u32, is_enemy_projectile: bool, x: f32, y: f32, velocity_x: f32, velocity_y: f32, speed: f32, damage: u32 },
    ProjectileHit { projectile_id: u32, target_id: u32, target_is_player: bool, hit_x: f32, hit_y: f32 },
    ProjectileDestroy { projectile_id: u32, x: f32, y: f32 },
    GameStart { game_start: bool },
    GameEnd { game_end: bool },
    PlayerDisconnected { player_id: u32 },
    Heartbeat { player_id: u32 },
    EnemyHit { enemy_id: u32, hit_x: f32, hit_y: f32, damage: f32, sequence_number: u32 },
    PlayerHit { player_id: u32, damage: u32, x: f32, y: f32, sequence_number: u32 },
    PlayerDeath { player_id: u32, x: f32, y: f32 },
    CreateRoom { room_name: String, is_private: bool, password: String, max_players: u8 },
    JoinRoom { room_id: u32, password: String },
    LeaveRoom { room_id: u32 },
    ListRoom,
    ListRoomResponse { rooms: Vec<RoomInfo> },
    MatchmakingRequest,
    MatchmakingResponse { error_code: RoomError },
    JoinRoomResponse { error_code: RoomError },
    PlayerInput { input: u8, sequence_number: u32 },
    RequestChallenge { room_id: u32 },
    ChallengeResponse { challenge: String, timestamp: u32 },
    CreateRoomResponse { error_code: RoomError, room_id: u32 },
    ScoreboardRequest { limit: u32 },
    ScoreboardResponse { scores: Vec<ScoreEntry> },
    Ack { sequence_number: u32 },
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        use Packet::*;
        match self {
            ChatMessage { .. } => PacketType::ChatMessage,
            PlayerMove { .. } => PacketType::PlayerMove,
            NewPlayer { .. } => PacketType::NewPlayer,
            PlayerInfo { .. } => PacketType::PlayerInfo,
            EnemySpawn { .. } => PacketType::EnemySpawn,
            EnemyMove { .. } => PacketType::EnemyMove,
            EnemyDeath { .. } => PacketType::EnemyDeath,
            PlayerShoot { .. } => PacketType::PlayerShoot,
            ProjectileSpawn { .. } => PacketType::ProjectileSpawn,
            ProjectileHit { .. } => PacketType::ProjectileHit,
            ProjectileDestroy { .. } => PacketType::ProjectileDestroy,
            GameStart { .. } => PacketType::GameStart,
            GameEnd { .. } => PacketType::GameEnd,
            PlayerDisconnected { .. } => PacketType::PlayerDisconnected,
            Heartbeat { .. } => PacketType::Heartbeat,
            EnemyHit { .. } => PacketType::EnemyHit,
            PlayerHit { .. } => PacketType::PlayerHit,
            PlayerDeath { .. } => PacketType::PlayerDeath,
            CreateRoom { .. } => PacketType::CreateRoom,
            JoinRoom { .. } => PacketType::JoinRoom,
            LeaveRoom { .. } => PacketType::LeaveRoom,
            ListRoom => PacketType::ListRoom,
            ListRoomResponse { .. } => PacketType::ListRoomResponse,
            MatchmakingRequest => PacketType::MatchmakingRequest,
            MatchmakingResponse { .. } => PacketType::MatchmakingResponse,
            JoinRoomResponse { .. } => PacketType::JoinRoomResponse,
            PlayerInput { .. } => PacketType::PlayerInput,
            RequestChallenge { .. } => PacketType::RequestChallenge,
            ChallengeResponse { .. } => PacketType::ChallengeResponse,
            CreateRoomResponse { .. } => PacketType::CreateRoomResponse,
            ScoreboardRequest { .. } => PacketType::ScoreboardRequest,
            ScoreboardResponse { .. } => PacketType::ScoreboardResponse,
            Ack { .. } => PacketType::Ack,
        }
    }

    /// Serialize the body (no header) for this packet.
    fn encode_body(&self, w: &mut ByteWriter) {
        use Packet::*;
        match self {
            ChatMessage { timestamp, message, player_id, r, g, b, a } => {
                w.write_u32(*timestamp);
                w.write_str(message, usize::MAX);
                w.write_u32(*player_id);
                w.write_u8(*r);
                w.write_u8(*g);
                w.write_u8(*b);
                w.write_u8(*a);
            }
            PlayerMove { player_id, sequence_number, x, y } => {
                w.write_u32(*player_id);
                w.write_u32(*sequence_number);
                w.write_f32(*x);
                w.write_f32(*y);
            }
            NewPlayer { player_id, player_name, x, y, speed, max_health } => {
                w.write_u32(*player_id);
                w.write_str(player_name, MAX_SHORT_STRING);
                w.write_f32(*x);
                w.write_f32(*y);
                w.write_f32(*speed);
                w.write_u32(*max_health);
            }
            PlayerInfo { name } => {
                w.write_str(name, MAX_SHORT_STRING);
            }
            EnemySpawn { enemy_id, enemy_type, x, y, velocity_x, velocity_y, health, max_health } => {
                w.write_u32(*enemy_id);
                w.write_u8(*enemy_type as u8);
                w.write_f32(*x);
                w.write_f32(*y);
                w.write_f32(*velocity_x);
                w.write_f32(*velocity_y);
                w.write_u32(*health);
                w.write_u32(*max_health);
            }
            EnemyMove { enemy_id, x, y, velocity_x, velocity_y, sequence_number } => {
                w.write_u32(*enemy_id);
                w.write_f32(*x);
                w.write_f32(*y);
                w.write_f32(*velocity_x);
                w.write_f32(*velocity_y);
                w.write_u32(*sequence_number);
            }
            EnemyDeath { enemy_id, death_x, death_y, player_id, score } => {
                w.write_u32(*enemy_id);
                w.write_f32(*death_x);
                w.write_f32(*death_y);
                w.write_u32(*player_id);
                w.write_u32(*score);
            }
            PlayerShoot { x, y, projectile_type, sequence_number } => {
                w.write_f32(*x);
                w.write_f32(*y);
                w.write_u8(*projectile_type as u8);
                w.write_u32(*sequence_number);
            }
            ProjectileSpawn { projectile_id, projectile_type, owner_id, is_enemy_projectile, x, y, velocity_x, velocity_y, speed, damage } => {
                w.write_u32(*projectile_id);
                w.write_u8(*projectile_type as u8);
                w.write_u32(*owner_id);
                w.write_u8(*is_enemy_projectile as u8);
                w.write_f32(*x);
                w.write_f32(*y);
                w.write_f32(*velocity_x);
                w.write_f32(*velocity_y);
                w.write_f32(*speed);
                w.write_u32(*damage);
            }
            ProjectileHit { projectile_id, target_id, target_is_player, hit_x, hit_y } => {
                w.write_u32(*projectile_id);
                w.write_u32(*target_id);
                w.write_u8(*target_is_player as u8);
                w.write_f32(*hit_x);
                w.write_f32(*hit_y);
            }
            ProjectileDestroy { projectile_id, x, y } => {
                w.write_u32(*projectile_id);
                w.write_f32(*x);
                w.write_f32(*y);
            }
            GameStart { game_start } => w.write_u8(*game_start as u8),
            GameEnd { game_end } => w.write_u8(*game_end as u8),
            PlayerDisconnected { player_id } => w.write_u32(*player_id),
            Heartbeat { player_id } => w.write_u32(*player_id),
            EnemyHit { enemy_id, hit_x, hit_y, damage, sequence_number } => {
                w.write_u32(*enemy_id);
                w.write_f32(*hit_x);
                w.write_f32(*hit_y);
                w.write_f32(*damage);
                w.write_u32(*sequence_number);
            }
            PlayerHit { player_id, damage, x, y, sequence_number } => {
                w.write_u32(*player_id);
                w.write_u32(*damage);
                w.write_f32(*x);
                w.write_f32(*y);
                w.write_u32(*sequence_number);
            }
            PlayerDeath { player_id, x, y } => {
                w.write_u32(*player_id);
                w.write_f32(*x);
                w.write_f32(*y);
            }
            CreateRoom { room_name, is_private, password, max_players } => {
                w.write_str(room_name, MAX_SHORT_STRING);
                w.write_u8(*is_private as u8);
                w.write_str(password, MAX_SHORT_STRING);
                w.write_u8(*max_players);
            }
            JoinRoom { room_id, password } => {
                w.write_u32(*room_id);
                w.write_str(password, MAX_SHORT_STRING);
            }
            LeaveRoom { room_id } => w.write_u32(*room_id),
            ListRoom => {}
            ListRoomResponse { rooms } => {
                w.write_u32(rooms.len() as u32);
                for room in rooms {
                    w.write_u32(room.room_id);
                    w.write_str(&room.room_name, MAX_SHORT_STRING);
                    w.write_u8(room.player_count);
                    w.write_u8(room.max_players);
                }
            }
            MatchmakingRequest => {}
            MatchmakingResponse { error_code } => w.write_u8(*error_code as u8),
            JoinRoomResponse { error_code } => w.write_u8(*error_code as u8),
            PlayerInput { input, sequence_number } => {
                w.write_u8(*input);
                w.write_u32(*sequence_number);
            }
            RequestChallenge { room_id } => w.write_u32(*room_id),
            ChallengeResponse { challenge, timestamp } => {
                w.write_str(challenge, usize::MAX);
                w.write_u32(*timestamp);
            }
            CreateRoomResponse { error_code, room_id } => {
                w.write_u8(*error_code as u8);
                w.write_u32(*room_id);
            }
            ScoreboardRequest { limit } => w.write_u32(*limit),
            ScoreboardResponse { scores } => {
                w.write_u32(scores.len() as u32);
                for entry in scores {
                    w.write_str(&entry.player_name, MAX_SHORT_STRING);
                    w.write_u32(entry.score);
                }
            }
            Ack { sequence_number } => w.write_u32(*sequence_number),
        }
    }

    /// Encode the full packet: header + body.
    pub fn encode(&self) -> Vec<u8> {
        let mut body_w = ByteWriter::new();
        self.encode_body(&mut body_w);
        let body = body_w.into_vec();

        let mut w = ByteWriter::new();
        w.write_u8(self.packet_type() as u8);
        w.write_u32((HEADER_SIZE + body.len()) as u32);
        w.write_bytes(&body);
        w.into_vec()
    }

    /// Decode a full packet (header + body) from `data`.
    pub fn decode(data: &[u8]) -> Result<Self, TransportError> {
        if data.len() < HEADER_SIZE {
            return Err(TransportError::Truncated { need: HEADER_SIZE, have: data.len() });
        }
        let mut header = ByteReader::new(&data[..HEADER_SIZE]);
        let tag = header.read_u8()?;
        let declared_size = header.read_u32()?;
        if declared_size as usize != data.len() {
            return Err(TransportError::SizeMismatch {
                declared: declared_size,
                actual: data.len() as u32,
            });
        }

        let kind = PacketType::from_u8(tag)?;
        let mut r = ByteReader::new(&data[HEADER_SIZE..]);
        decode_body(kind, &mut r)
    }
}

fn decode_body(kind: PacketType, r: &mut ByteReader) -> Result<Packet, TransportError> {
    use PacketType::*;
    Ok(match kind {
        ChatMessage => Packet::ChatMessage {
            timestamp: r.read_u32()?,
            message: r.read_str()?,
            player_id: r.read_u32()?,
            r: r.read_u8()?,
            g: r.read_u8()?,
            b: r.read_u8()?,
            a: r.read_u8()?,
        },
        PlayerMove => Packet::PlayerMove {
            player_id: r.read_u32()?,
            sequence_number: r.read_u32()?,
            x: r.read_f32()?,
            y: r.read_f32()?,
        },
        NewPlayer => Packet::NewPlayer {
            player_id: r.read_u32()?,
            player_name: r.read_str()?,
            x: r.read_f32()?,
            y: r.read_f32()?,
            speed: r.read_f32()?,
            max_health: r.read_u32()?,
        },
        PlayerInfo => Packet::PlayerInfo { name: r.read_str()? },
        EnemySpawn => Packet::EnemySpawn {
            enemy_id: r.read_u32()?,
            enemy_type: EnemyType::BasicFighter, // closed enum, single variant
            x: r.read_f32()?,
            y: r.read_f32()?,
            velocity_x: r.read_f32()?,
            velocity_y: r.read_f32()?,
            health: r.read_u32()?,
            max_health: r.read_u32()?,
        },
        EnemyMove => Packet::EnemyMove {
            enemy_id: r.read_u32()?,
            x: r.read_f32()?,
            y: r.read_f32()?,
            velocity_x: r.read_f32()?,
            velocity_y: r.read_f32()?,
            sequence_number: r.read_u32()?,
        },
        EnemyDeath => Packet::EnemyDeath {
            enemy_id: r.read_u32()?,
            death_x: r.read_f32()?,
            death_y: r.read_f32()?,
            player_id: r.read_u32()?,
            score: r.read_u32()?,
        },
        PlayerShoot => Packet::PlayerShoot {
            x: r.read_f32()?,
            y: r.read_f32()?,
            projectile_type: decode_projectile_type(r.read_u8()?),
            sequence_number: r.read_u32()?,
        },
        ProjectileSpawn => Packet::ProjectileSpawn {
            projectile_id: r.read_u32()?,
            projectile_type: decode_projectile_type(r.read_u8()?),
            owner_id: r.read_u32()?,
            is_enemy_projectile: r.read_u8()? != 0,
            x: r.read_f32()?,
            y: r.read_f32()?,
            velocity_x: r.read_f32()?,
            velocity_y: r.read_f32()?,
            speed: r.read_f32()?,
            damage: r.read_u32()?,
        },
        ProjectileHit => Packet::ProjectileHit {
            projectile_id: r.read_u32()?,
            target_id: r.read_u32()?,
            target_is_player: r.read_u8()? != 0,
            hit_x: r.read_f32()?,
            hit_y: r.read_f32()?,
        },
        ProjectileDestroy => Packet::ProjectileDestroy {
            projectile_id: r.read_u32()?,
            x: r.read_f32()?,
            y: r.read_f32()?,
        },
        GameStart => Packet::GameStart { game_start: r.read_u8()? != 0 },
        GameEnd => Packet::GameEnd { game_end: r.read_u8()? != 0 },
        PlayerDisconnected => Packet::PlayerDisconnected { player_id: r.read_u32()? },
        Heartbeat => Packet::Heartbeat { player_id: r.read_u32()? },
        EnemyHit => Packet::EnemyHit {
            enemy_id: r.read_u32()?,
            hit_x: r.read_f32()?,
            hit_y: r.read_f32()?,
            damage: r.read_f32()?,
            sequence_number: r.read_u32()?,
        },
        PlayerHit => Packet::PlayerHit {
            player_id: r.read_u32()?,
            damage: r.read_u32()?,
            x: r.read_f32()?,
            y: r.read_f32()?,
            sequence_number: r.read_u32()?,
        },
        PlayerDeath => Packet::PlayerDeath {
            player_id: r.read_u32()?,
            x: r.read_f32()?,
            y: r.read_f32()?,
        },
        CreateRoom => Packet::CreateRoom {
            room_name: r.read_str()?,
            is_private: r.read_u8()? != 0,
            password: r.read_str()?,
            max_players: r.read_u8()?,
        },
        JoinRoom => Packet::JoinRoom {
            room_id: r.read_u32()?,
            password: r.read_str()?,
        },
        LeaveRoom => Packet::LeaveRoom { room_id: r.read_u32()? },
        ListRoom => Packet::ListRoom,
        ListRoomResponse => {
            let count = r.read_u32()?;
            let mut rooms = Vec::with_capacity(count as usize);
            for _ in 0..count {
                rooms.push(RoomInfo {
                    room_id: r.read_u32()?,
                    room_name: r.read_str()?,
                    player_count: r.read_u8()?,
                    max_players: r.read_u8()?,
                });
            }
            Packet::ListRoomResponse { rooms }
        }
        MatchmakingRequest => Packet::MatchmakingRequest,
        MatchmakingResponse => Packet::MatchmakingResponse { error_code: RoomError::from_u8(r.read_u8()?) },
        JoinRoomResponse => Packet::JoinRoomResponse { error_code: RoomError::from_u8(r.read_u8()?) },
        PlayerInput => Packet::PlayerInput {
            input: r.read_u8()?,
            sequence_number: r.read_u32()?,
        },
        RequestChallenge => Packet::RequestChallenge { room_id: r.read_u32()? },
        ChallengeResponse => Packet::ChallengeResponse {
            challenge: r.read_str()?,
            timestamp: r.read_u32()?,
        },
        CreateRoomResponse => Packet::CreateRoomResponse {
            error_code: RoomError::from_u8(r.read_u8()?),
            room_id: r.read_u32()?,
        },
        ScoreboardRequest => Packet::ScoreboardRequest { limit: r.read_u32()? },
        ScoreboardResponse => {
            let count = r.read_u32()?;
            let mut scores = Vec::with_capacity(count as usize);
            for _ in 0..count {
                scores.push(ScoreEntry {
                    player_name: r.read_str()?,
                    score: r.read_u32()?,
                });
            }
            Packet::ScoreboardResponse { scores }
        }
        Ack => Packet::Ack { sequence_number: r.read_u32()? },
    })
}

fn decode_projectile_type(tag: u8) -> ProjectileType {
    match tag {
        0x02 => ProjectileType::EnemyBasic,
        _ => ProjectileType::PlayerBasic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(p: Packet) {
        let encoded = p.encode();
        let decoded = Packet::decode(&encoded).expect("decode");
        assert_eq!(format!("{:?}", p), format!("{:?}", decoded));
    }

    #[test]
    fn roundtrip_player_move() {
        roundtrip(Packet::PlayerMove { player_id: 7, sequence_number: 42, x: 1.5, y: -2.25 });
    }

    #[test]
    fn roundtrip_new_player() {
        roundtrip(Packet::NewPlayer {
            player_id: 0,
            player_name: "Alice".into(),
            x: 0.0,
            y: 0.0,
            speed: 120.0,
            max_health: 100,
        });
    }

    #[test]
    fn roundtrip_chat_message() {
        roundtrip(Packet::ChatMessage {
            timestamp: 1000,
            message: "gg".into(),
            player_id: 1,
            r: 255,
            g: 0,
            b: 128,
            a: 255,
        });
    }

    #[test]
    fn roundtrip_create_room() {
        roundtrip(Packet::CreateRoom {
            room_name: "arena".into(),
            is_private: true,
            password: "hunter2".into(),
            max_players: 4,
        });
    }

    #[test]
    fn roundtrip_list_room_response() {
        roundtrip(Packet::ListRoomResponse {
            rooms: vec![
                RoomInfo { room_id: 1, room_name: "a".into(), player_count: 1, max_players: 4 },
                RoomInfo { room_id: 2, room_name: "b".into(), player_count: 2, max_players: 4 },
            ],
        });
    }

    #[test]
    fn roundtrip_empty_variants() {
        roundtrip(Packet::ListRoom);
        roundtrip(Packet::MatchmakingRequest);
    }

    #[test]
    fn roundtrip_ack() {
        roundtrip(Packet::Ack { sequence_number: 99 });
    }

    #[test]
    fn long_name_is_truncated_on_encode() {
        let long_name = "x".repeat(64);
        let p = Packet::PlayerInfo { name: long_name };
        let encoded = p.encode();
        let decoded = Packet::decode(&encoded).unwrap();
        match decoded {
            Packet::PlayerInfo { name } => assert_eq!(name.len(), MAX_SHORT_STRING),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn decode_rejects_truncated_header() {
        let err = Packet::decode(&[0x02, 0x00]).unwrap_err();
        assert!(matches!(err, TransportError::Truncated { .. }));
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let mut bytes = vec![0xFFu8];
        bytes.extend_from_slice(&9u32.to_le_bytes());
        let err = Packet::decode(&bytes).unwrap_err();
        assert!(matches!(err, TransportError::UnknownKind(0xFF)));
    }

    #[test]
    fn decode_rejects_size_mismatch() {
        let mut bytes = vec![PacketType::Heartbeat as u8];
        bytes.extend_from_slice(&999u32.to_le_bytes());
        bytes.extend_from_slice(&7u32.to_le_bytes());
        let err = Packet::decode(&bytes).unwrap_err();
        assert!(matches!(err, TransportError::SizeMismatch { .. }));
    }

    #[test]
    fn reliability_classification() {
        assert!(!PacketType::Heartbeat.is_reliable());
        assert!(!PacketType::PlayerMove.is_reliable());
        assert!(!PacketType::EnemyMove.is_reliable());
        assert!(PacketType::PlayerShoot.is_reliable());
        assert!(PacketType::CreateRoom.is_reliable());
        assert!(PacketType::PlayerInfo.is_reliable());
    }
}
