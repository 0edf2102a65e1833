// prediction.rs — local-player input prediction and server reconciliation:
// the client applies its own `PlayerInput` locally, ahead of the server
// round-trip, and later reconciles against the authoritative `PlayerMove`
// carrying the same sequence number. Mirrors
// `cl_pred.rs` predict/reconcile split (`CL_PredictMovement` vs
// `CL_CheckPredictionError`), generalized from quake2's `usercmd_t`
// replay buffer to this crate's single-entity input/physics pipeline —
// prediction reuses `wingman_game::input::apply_input` and
// `wingman_game::physics::integrate_actors` verbatim, so the client's
// math can never drift from the server's.

use std::collections::VecDeque;

use wingman_ecs::components::Position;
use wingman_ecs::{Entity, EcsError, Registry};

/// A predicted position within this distance of the server's
/// authoritative one is accepted as-is; beyond it, the local entity snaps
/// to the server's value.
pub const RECONCILE_EPSILON: f32 = 2.0;

const HISTORY_CAPACITY: usize = 64;

#[derive(Clone, Copy)]
struct PredictedSample {
    seq: u32,
    x: f32,
    y: f32,
}

/// Per-local-player prediction state: the sequence counter for outgoing
/// `PlayerInput`s and a bounded history of the position predicted for
/// each one, consulted when that sequence's server ack arrives.
pub struct Predictor {
    history: VecDeque<PredictedSample>,
    next_seq: u32,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor {
    pub fn new() -> Self {
        Self { history: VecDeque::new(), next_seq: 1 }
    }

    /// Apply `bitmask` to the local player's entity exactly as the server
    /// would, advance it by `dt`, and remember the resulting position
    /// under a freshly allocated sequence number. Returns that sequence
    /// number, which the caller sends alongside the `PlayerInput` packet.
    pub fn predict(&mut self, registry: &mut Registry, entity: Entity, bitmask: u8, dt: f32) -> Result<u32, EcsError> {
        wingman_game::input::apply_input(registry, entity, bitmask)?;
        wingman_game::physics::integrate_actors(registry, dt);

        let pos = *registry.get_component::<Position>(entity)?;
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(PredictedSample { seq, x: pos.x, y: pos.y });
        Ok(seq)
    }

    /// Reconcile against the server's authoritative position for `seq`
    /// (from a `PlayerMove` addressed to the local player). Samples up to
    /// and including `seq` are dropped either way, since they're
    /// superseded by this ack; the local entity only snaps if it still
    /// had a prediction on record for `seq` and that prediction diverges
    /// from the server's value beyond [`RECONCILE_EPSILON`].
    pub fn reconcile(
        &mut self,
        registry: &mut Registry,
        entity: Entity,
        seq: u32,
        server_x: f32,
        server_y: f32,
    ) -> Result<(), EcsError> {
        let predicted = self.history.iter().find(|s| s.seq == seq).map(|s| (s.x, s.y));
        self.history.retain(|s| s.seq > seq);

        if let Some((px, py)) = predicted {
            let (dx, dy) = (px - server_x, py - server_y);
            if (dx * dx + dy * dy).sqrt() <= RECONCILE_EPSILON {
                return Ok(());
            }
        }

        let pos = registry.get_component_mut::<Position>(entity)?;
        pos.x = server_x;
        pos.y = server_y;
        Ok(())
    }
}
