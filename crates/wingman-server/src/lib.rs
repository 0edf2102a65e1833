// wingman-server — the authoritative match server: client registry, room
// lifecycle and matchmaking, private-room challenges, a `PlayerStore`
// persistence seam, and the UDP reactor tying them to the wire protocol.
//
// Mirrors `myq2-server` crate split (`sv_main.rs`'s
// frame loop and client bookkeeping, `sv_send.rs`'s broadcast helpers)
// generalized from Quake2's single-world server to one room per match,
// each with its own game thread.

pub mod challenge;
pub mod client_record;
pub mod config;
pub mod matchmaking;
pub mod player_store;
pub mod reactor;
pub mod room;

pub use challenge::ChallengeStore;
pub use client_record::{ClientRecord, ClientRegistry};
pub use config::load_server_config;
pub use matchmaking::{EventSink, RoomManager};
pub use player_store::{InMemoryPlayerStore, PlayerRecord, PlayerStore};
pub use reactor::Reactor;
pub use room::{Room, RoomHandle, RoomState};
