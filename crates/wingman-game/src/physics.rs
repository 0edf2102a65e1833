// physics.rs — projectile integration and boundary clamping, the
// integrate-then-clamp steps of the per-tick pipeline. Mirrors the shape
// of `g_phys.rs` (`sv_add_gravity`, the position-integration half of
// `sv_fly_move`), simplified to this crate's flat top-down/side-scroll
// motion model — no gravity, no trace-based collision, just `position +=
// velocity * dt` and an axis-aligned clamp.

use wingman_ecs::components::{ClampToBounds, Collider, Position, Projectile, Velocity};
use wingman_ecs::Registry;

use crate::events::{EventQueue, GameEvent};

#[derive(Debug, Clone, Copy)]
pub struct WorldBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl WorldBounds {
    /// How far past the edge a projectile may travel before it's destroyed
    /// rather than clamped — projectiles aren't boundary-clamped entities,
    /// they simply despawn once sufficiently offscreen.
    pub const DESPAWN_MARGIN: f32 = 64.0;
}

/// Advance every non-projectile `Position`+`Velocity` entity (players,
/// enemies) by `velocity * dt`. Projectiles are excluded here — they get
/// their own pass in [`integrate_projectiles`], which also applies the
/// despawn-margin rule reserved for them.
pub fn integrate_actors(registry: &mut Registry, dt: f32) {
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let vel_sig = registry.component_bit::<Velocity>().unwrap();
    let proj_sig = registry.component_bit::<Projectile>().unwrap();
    let required = (1 << pos_sig) | (1 << vel_sig);

    for entity in registry.entities_matching(required) {
        if registry.signature(entity) & (1 << proj_sig) != 0 {
            continue;
        }
        let velocity = *registry.get_component::<Velocity>(entity).unwrap();
        let position = registry.get_component_mut::<Position>(entity).unwrap();
        position.x += velocity.vx * dt;
        position.y += velocity.vy * dt;
    }
}

/// Copy every `Position`-and-`Collider` entity's position into its
/// collider's center, so AABB collision resolution (step 4) sees this
/// tick's post-integration placement rather than spawn-time coordinates.
pub fn sync_colliders_to_position(registry: &mut Registry) {
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let collider_sig = registry.component_bit::<Collider>().unwrap();
    let required = (1 << pos_sig) | (1 << collider_sig);

    for entity in registry.entities_matching(required) {
        let position = *registry.get_component::<Position>(entity).unwrap();
        let collider = registry.get_component_mut::<Collider>(entity).unwrap();
        collider.center_x = position.x;
        collider.center_y = position.y;
    }
}

/// Advance every projectile's position by `velocity * dt`; destroy any
/// that have drifted more than [`WorldBounds::DESPAWN_MARGIN`] outside the
/// world rect.
pub fn integrate_projectiles(
    registry: &mut Registry,
    events: &EventQueue,
    dt: f32,
    bounds: WorldBounds,
) {
    let proj_sig = registry.component_bit::<Projectile>().unwrap();
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let vel_sig = registry.component_bit::<Velocity>().unwrap();
    let required = (1 << proj_sig) | (1 << pos_sig) | (1 << vel_sig);

    let mut to_destroy = Vec::new();

    for entity in registry.entities_matching(required) {
        let velocity = *registry.get_component::<Velocity>(entity).unwrap();
        let position = registry.get_component_mut::<Position>(entity).unwrap();
        position.x += velocity.vx * dt;
        position.y += velocity.vy * dt;
        let position = *position;

        let out_of_bounds = position.x < bounds.min_x - WorldBounds::DESPAWN_MARGIN
            || position.x > bounds.max_x + WorldBounds::DESPAWN_MARGIN
            || position.y < bounds.min_y - WorldBounds::DESPAWN_MARGIN
            || position.y > bounds.max_y + WorldBounds::DESPAWN_MARGIN;

        if out_of_bounds {
            let projectile_id = registry.get_component::<Projectile>(entity).unwrap().projectile_id;
            to_destroy.push((entity, projectile_id, position));
        }
    }

    for (entity, projectile_id, position) in to_destroy {
        events.push(GameEvent::ProjectileDestroy { projectile_id, x: position.x, y: position.y });
        let _ = registry.destroy_entity(entity);
    }
}

/// Clamp every `ClampToBounds`-tagged entity's position so its collider
/// stays fully inside the world rect.
pub fn clamp_to_world_bounds(registry: &mut Registry, bounds: WorldBounds) {
    let clamp_sig = registry.component_bit::<ClampToBounds>().unwrap();
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let collider_sig = registry.component_bit::<Collider>().unwrap();
    let required = (1 << clamp_sig) | (1 << pos_sig) | (1 << collider_sig);

    for entity in registry.entities_matching(required) {
        let (half_x, half_y) = {
            let collider = registry.get_component::<Collider>(entity).unwrap();
            (collider.half_x, collider.half_y)
        };
        let position = registry.get_component_mut::<Position>(entity).unwrap();
        position.x = position.x.clamp(bounds.min_x + half_x, bounds.max_x - half_x);
        position.y = position.y.clamp(bounds.min_y + half_y, bounds.max_y - half_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_common::wire::ProjectileType;

    fn new_registry() -> Registry {
        let mut reg = Registry::new(16);
        reg.register_component::<Projectile>().unwrap();
        reg.register_component::<Position>().unwrap();
        reg.register_component::<Velocity>().unwrap();
        reg.register_component::<Collider>().unwrap();
        reg.register_component::<ClampToBounds>().unwrap();
        reg
    }

    fn bounds() -> WorldBounds {
        WorldBounds { min_x: 0.0, min_y: 0.0, max_x: 800.0, max_y: 600.0 }
    }

    #[test]
    fn projectile_moves_by_velocity_times_dt() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(e, Velocity { vx: 100.0, vy: 0.0 }).unwrap();
        reg.add_component(e, Projectile { projectile_id: 1, projectile_type: ProjectileType::PlayerBasic, owner_id: 0, damage: 1, seq: 0, destroyed: false }).unwrap();

        integrate_projectiles(&mut reg, &EventQueue::new(), 0.5, bounds());

        let pos = *reg.get_component::<Position>(e).unwrap();
        assert_eq!(pos.x, 50.0);
    }

    #[test]
    fn projectile_outside_margin_is_destroyed() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Position { x: 900.0, y: 0.0 }).unwrap();
        reg.add_component(e, Velocity { vx: 1000.0, vy: 0.0 }).unwrap();
        reg.add_component(e, Projectile { projectile_id: 7, projectile_type: ProjectileType::PlayerBasic, owner_id: 0, damage: 1, seq: 0, destroyed: false }).unwrap();

        let events = EventQueue::new();
        integrate_projectiles(&mut reg, &events, 0.1, bounds());

        assert!(!reg.is_alive(e));
        let drained = events.drain();
        assert!(matches!(drained[0], GameEvent::ProjectileDestroy { projectile_id: 7, .. }));
    }

    #[test]
    fn integrate_actors_moves_non_projectile_entities() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Position { x: 10.0, y: 10.0 }).unwrap();
        reg.add_component(e, Velocity { vx: 20.0, vy: -5.0 }).unwrap();

        integrate_actors(&mut reg, 0.5);

        let pos = *reg.get_component::<Position>(e).unwrap();
        assert_eq!(pos.x, 20.0);
        assert_eq!(pos.y, 7.5);
    }

    #[test]
    fn integrate_actors_skips_projectiles() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(e, Velocity { vx: 100.0, vy: 0.0 }).unwrap();
        reg.add_component(e, Projectile { projectile_id: 1, projectile_type: ProjectileType::PlayerBasic, owner_id: 0, damage: 1, seq: 0, destroyed: false }).unwrap();

        integrate_actors(&mut reg, 1.0);

        let pos = *reg.get_component::<Position>(e).unwrap();
        assert_eq!(pos.x, 0.0, "projectiles move only in integrate_projectiles");
    }

    #[test]
    fn sync_colliders_follows_position() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Position { x: 30.0, y: -4.0 }).unwrap();
        reg.add_component(e, Collider { center_x: 0.0, center_y: 0.0, half_x: 2.0, half_y: 2.0 }).unwrap();

        sync_colliders_to_position(&mut reg);

        let collider = *reg.get_component::<Collider>(e).unwrap();
        assert_eq!(collider.center_x, 30.0);
        assert_eq!(collider.center_y, -4.0);
    }

    #[test]
    fn clamp_keeps_collider_inside_bounds() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Position { x: -50.0, y: 610.0 }).unwrap();
        reg.add_component(e, Collider { center_x: 0.0, center_y: 0.0, half_x: 10.0, half_y: 10.0 }).unwrap();
        reg.add_component(e, ClampToBounds).unwrap();

        clamp_to_world_bounds(&mut reg, bounds());

        let pos = *reg.get_component::<Position>(e).unwrap();
        assert_eq!(pos.x, 10.0);
        assert_eq!(pos.y, 590.0);
    }
}
