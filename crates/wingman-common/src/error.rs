// error.rs — error taxonomy shared by the network, session, and resource
// layers. Grounded on the kinds named in the specification's error-handling
// design; expressed with `thiserror` rather than the prior implementation's hand-rolled
// `String` errors, in keeping with the rest of the example pack.

use thiserror::Error;

/// Errors arising from the wire codec and the reliable channel. Always
/// logged and dropped at the receive handler; never propagated to the
/// simulation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("truncated packet: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("bad compression magic")]
    BadMagic,
    #[error("declared size {declared} does not match body length {actual}")]
    SizeMismatch { declared: u32, actual: u32 },
    #[error("unknown packet type tag {0:#04x}")]
    UnknownKind(u8),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("outbound queue full, packet dropped")]
    QueueFull,
}

/// Protocol-sequencing errors. Silently ignored by the receiver; never
/// surfaced to the peer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("sequence {seq} is not newer than last-processed {last_processed}")]
    SequenceTooOld { seq: u32, last_processed: u32 },
    #[error("packet arrived in an unexpected session state: {0}")]
    UnexpectedState(&'static str),
}

/// Session/room errors. Reported back to the originating client via the
/// matching response packet (`RoomError` on the wire), never fatal to the
/// server.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("wrong password")]
    WrongPassword,
    #[error("player already in a room")]
    AlreadyInRoom,
    #[error("player is banned")]
    PlayerBanned,
    #[error("unknown session error")]
    Unknown,
}

/// Resource-exhaustion errors. Fatal to the owning room: the room
/// transitions to `Finished` and every client in it receives `GameEnd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("entity capacity ({capacity}) exhausted")]
    EntityCapacityExhausted { capacity: u32 },
    #[error("component type budget (32 bits) exhausted")]
    ComponentBudgetExhausted,
}

/// Configuration errors. Refuse to start; the process exits non-zero
/// before any thread is spawned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be in 1..65535, got {0}")]
    BadPort(i64),
    #[error("MAX_CLIENTS must be > 0, got {0}")]
    BadMaxClients(i64),
    #[error("could not read config file {path}: {source}")]
    MissingFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
