// wingman-client — the player-facing half of the protocol: a transport
// that mirrors the reactor's wire handling for a single peer, a local
// entity mirror driven entirely by inbound packets, local-player input
// prediction with server reconciliation, and interpolation for everyone
// else. No rendering, no audio, no asset loading — those stay out of
// scope, same as the surface this crate talks to on the wire.
//
// Mirrors `myq2-client` crate split (`cl_main.rs`'s
// top-level frame/session state machine, `cl_pred.rs`'s predict/
// reconcile idiom, `cl_ents.rs`'s entity-state interpolation), narrowed
// to this protocol's handshake/matchmaking/room/combat surface.

pub mod challenge;
pub mod config;
pub mod interpolation;
pub mod net;
pub mod prediction;
pub mod session;
pub mod world;

pub use challenge::respond_to_challenge;
pub use config::load_client_config;
pub use interpolation::interpolate;
pub use net::NetClient;
pub use prediction::Predictor;
pub use session::{ClientEvent, GameClient};
pub use world::ClientWorld;
