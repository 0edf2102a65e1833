// wingman-game — the per-room authoritative simulation: input application,
// enemy AI, projectile integration, AABB collision resolution, boundary
// clamping, and FIFO event emission.
//
// Mirrors `myq2-game` split of concerns into small,
// free-standing functions taking an explicit context (`g_phys.rs`'s
// `sv_*`/`clip_velocity`, `g_ai.rs`'s `ai_*`, `g_combat.rs`'s `t_damage`)
// rather than methods on a God object — this crate keeps that shape,
// swapping the prior implementation's `Vec<Edict>`/`LevelLocals` context for a
// `wingman_ecs::Registry` and an [`events::EventQueue`].

pub mod ai;
pub mod collision;
pub mod events;
pub mod input;
pub mod physics;
pub mod simulation;

pub use events::{GameEvent, EventQueue};
pub use physics::WorldBounds;
pub use simulation::{EnemySpawnPolicy, NoSpawning, Simulation, SimulationConfig};
