// input.rs — per-tick input application: bitmask → clamped velocity.
//
// Duplicate inputs (same bitmask from the same client already pending)
// are coalesced: rather than queueing every arrival, `PendingInputs` keeps
// only the latest `(bitmask, seq)` per player entity, overwriting in
// place, so a burst of identical packets between ticks collapses to one
// velocity write.

use std::collections::HashMap;

use wingman_common::wire::input_bits;
use wingman_ecs::components::{Player, Speed, Velocity};
use wingman_ecs::{Entity, Registry};

#[derive(Default)]
pub struct PendingInputs {
    latest: HashMap<Entity, (u8, u32)>,
}

impl PendingInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input arrival, overwriting any still-pending input for
    /// this entity (this is the coalescing: only the latest survives until
    /// the next tick drains it).
    pub fn record(&mut self, entity: Entity, bitmask: u8, seq: u32) {
        self.latest.insert(entity, (bitmask, seq));
    }

    /// Consume every pending input, applying it to the entity's `Velocity`
    /// via [`apply_input`]. Returns the `(entity, seq)` pairs applied, so
    /// the caller can emit `PositionUpdate`/ack bookkeeping.
    pub fn drain_apply(&mut self, registry: &mut Registry) -> Vec<(Entity, u32)> {
        let pending: Vec<(Entity, u8, u32)> =
            self.latest.drain().map(|(e, (bits, seq))| (e, bits, seq)).collect();

        let mut applied = Vec::with_capacity(pending.len());
        for (entity, bitmask, seq) in pending {
            if apply_input(registry, entity, bitmask).is_ok() {
                if let Ok(player) = registry.get_component_mut::<Player>(entity) {
                    player.seq = seq;
                }
                applied.push((entity, seq));
            }
        }
        applied
    }
}

/// Compute desired velocity from `bitmask` (UP=1, DOWN=2, LEFT=4, RIGHT=8),
/// clamp its magnitude to the entity's `Speed`, and write the result to its
/// `Velocity` component.
pub fn apply_input(registry: &mut Registry, entity: Entity, bitmask: u8) -> Result<(), wingman_ecs::EcsError> {
    let speed = registry.get_component::<Speed>(entity)?.value;

    let mut dx = 0.0f32;
    let mut dy = 0.0f32;
    if bitmask & input_bits::UP != 0 {
        dy -= 1.0;
    }
    if bitmask & input_bits::DOWN != 0 {
        dy += 1.0;
    }
    if bitmask & input_bits::LEFT != 0 {
        dx -= 1.0;
    }
    if bitmask & input_bits::RIGHT != 0 {
        dx += 1.0;
    }

    let len = (dx * dx + dy * dy).sqrt();
    let (vx, vy) = if len > 0.0 { (dx / len * speed, dy / len * speed) } else { (0.0, 0.0) };

    let velocity = registry.get_component_mut::<Velocity>(entity)?;
    velocity.vx = vx;
    velocity.vy = vy;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_ecs::components::{Player, Speed, Velocity};

    fn new_registry() -> Registry {
        let mut reg = Registry::new(8);
        reg.register_component::<Speed>().unwrap();
        reg.register_component::<Velocity>().unwrap();
        reg.register_component::<Player>().unwrap();
        reg
    }

    #[test]
    fn diagonal_input_is_normalized_to_speed() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Speed { value: 100.0 }).unwrap();
        reg.add_component(e, Velocity::default()).unwrap();

        apply_input(&mut reg, e, input_bits::UP | input_bits::RIGHT).unwrap();

        let vel = *reg.get_component::<Velocity>(e).unwrap();
        let magnitude = (vel.vx * vel.vx + vel.vy * vel.vy).sqrt();
        assert!((magnitude - 100.0).abs() < 0.01);
        assert!(vel.vx > 0.0);
        assert!(vel.vy < 0.0);
    }

    #[test]
    fn opposing_bits_cancel_out() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Speed { value: 100.0 }).unwrap();
        reg.add_component(e, Velocity::default()).unwrap();

        apply_input(&mut reg, e, input_bits::UP | input_bits::DOWN).unwrap();

        let vel = *reg.get_component::<Velocity>(e).unwrap();
        assert_eq!(vel.vx, 0.0);
        assert_eq!(vel.vy, 0.0);
    }

    #[test]
    fn coalescing_keeps_only_latest_input_per_entity() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Speed { value: 100.0 }).unwrap();
        reg.add_component(e, Velocity::default()).unwrap();
        reg.add_component(e, Player { name: "x".into(), seq: 0, alive: true, connected: true, player_id: 1 })
            .unwrap();

        let mut pending = PendingInputs::new();
        pending.record(e, input_bits::UP, 1);
        pending.record(e, input_bits::RIGHT, 2); // supersedes

        let applied = pending.drain_apply(&mut reg);
        assert_eq!(applied, vec![(e, 2)]);

        let vel = *reg.get_component::<Velocity>(e).unwrap();
        assert!(vel.vx > 0.0);
        assert_eq!(vel.vy, 0.0);
    }
}
