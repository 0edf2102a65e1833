// ai.rs — enemy behavior. `BASIC_FIGHTER` is the only enemy type this core
// implements, via a closed `EnemyType` enum with one variant; grounded in
// the shape of the prior implementation's `g_ai.rs` `ai_*` functions (a
// free function per behavior, taking the live context and the acting
// entity) rather than a trait-object "AI brain" per enemy.

use wingman_ecs::components::{Collider, Enemy, Position, Projectile, Shoot, Velocity};
use wingman_ecs::{Entity, Registry};
use wingman_common::wire::ProjectileType;

use crate::events::{EventQueue, GameEvent};

/// `BASIC_FIGHTER` drifts left at this speed regardless of tuning config —
/// concrete gameplay tuning lives with the caller, but a default is
/// needed for tests and the bundled config.
pub const DEFAULT_ENEMY_SPEED: f32 = 40.0;
pub const DEFAULT_ENEMY_PROJECTILE_SPEED: f32 = 220.0;
pub const DEFAULT_ENEMY_PROJECTILE_DAMAGE: u32 = 10;
pub const DEFAULT_ENEMY_COLLIDER_HALF: f32 = 8.0;
pub const DEFAULT_PROJECTILE_COLLIDER_HALF: f32 = 4.0;

pub struct AiTuning {
    pub enemy_speed: f32,
    pub projectile_speed: f32,
    pub projectile_damage: u32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            enemy_speed: DEFAULT_ENEMY_SPEED,
            projectile_speed: DEFAULT_ENEMY_PROJECTILE_SPEED,
            projectile_damage: DEFAULT_ENEMY_PROJECTILE_DAMAGE,
        }
    }
}

/// Drive every live enemy for one tick: set its drift velocity, advance its
/// shoot cooldown, and fire at the nearest live player when ready.
/// `next_projectile_id` is the room's monotonic projectile-id counter.
pub fn run_enemy_ai(
    registry: &mut Registry,
    events: &EventQueue,
    dt: f32,
    tuning: &AiTuning,
    next_projectile_id: &mut u32,
) {
    let enemy_sig = registry.component_bit::<Enemy>().unwrap();
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let vel_sig = registry.component_bit::<Velocity>().unwrap();
    let shoot_sig = registry.component_bit::<Shoot>().unwrap();
    let required = (1 << enemy_sig) | (1 << pos_sig) | (1 << vel_sig) | (1 << shoot_sig);

    for entity in registry.entities_matching(required) {
        let alive = registry.get_component::<Enemy>(entity).map(|e| e.alive).unwrap_or(false);
        if !alive {
            continue;
        }

        if let Ok(velocity) = registry.get_component_mut::<Velocity>(entity) {
            velocity.vx = -tuning.enemy_speed;
            velocity.vy = 0.0;
        }

        let ready = {
            let shoot = registry.get_component_mut::<Shoot>(entity).unwrap();
            shoot.tick(dt);
            shoot.can_shoot
        };
        if !ready {
            continue;
        }

        let Some(target) = nearest_live_player(registry, entity) else { continue };
        let enemy_pos = *registry.get_component::<Position>(entity).unwrap();
        let target_pos = *registry.get_component::<Position>(target).unwrap();

        let dx = target_pos.x - enemy_pos.x;
        let dy = target_pos.y - enemy_pos.y;
        let len = (dx * dx + dy * dy).sqrt();
        let (dir_x, dir_y) = if len > 0.0 { (dx / len, dy / len) } else { (-1.0, 0.0) };
        let vx = dir_x * tuning.projectile_speed;
        let vy = dir_y * tuning.projectile_speed;

        let enemy_id = registry.get_component::<Enemy>(entity).unwrap().enemy_id;
        spawn_enemy_projectile(
            registry,
            events,
            next_projectile_id,
            enemy_id,
            enemy_pos,
            vx,
            vy,
            tuning.projectile_speed,
            tuning.projectile_damage,
        );

        registry.get_component_mut::<Shoot>(entity).unwrap().consume();
    }
}

fn nearest_live_player(registry: &Registry, from_enemy: Entity) -> Option<Entity> {
    use wingman_ecs::components::Player;

    let player_sig = registry.component_bit::<Player>().ok()?;
    let pos_sig = registry.component_bit::<Position>().ok()?;
    let required = (1 << player_sig) | (1 << pos_sig);

    let enemy_pos = *registry.get_component::<Position>(from_enemy).ok()?;
    registry
        .entities_matching(required)
        .into_iter()
        .filter(|&e| registry.get_component::<Player>(e).map(|p| p.alive).unwrap_or(false))
        .min_by(|&a, &b| {
            let dist = |e: Entity| {
                let p = registry.get_component::<Position>(e).unwrap();
                (p.x - enemy_pos.x).powi(2) + (p.y - enemy_pos.y).powi(2)
            };
            dist(a).partial_cmp(&dist(b)).unwrap()
        })
}

#[allow(clippy::too_many_arguments)]
fn spawn_enemy_projectile(
    registry: &mut Registry,
    events: &EventQueue,
    next_projectile_id: &mut u32,
    owner_id: u32,
    origin: Position,
    vx: f32,
    vy: f32,
    speed: f32,
    damage: u32,
) {
    let projectile_id = *next_projectile_id;
    *next_projectile_id += 1;

    let entity = match registry.create_entity() {
        Ok(entity) => entity,
        Err(err) => {
            if let Some(resource_err) = err.as_resource_error() {
                tracing::error!(error = %resource_err, "room resource exhausted, enemy projectile spawn aborted");
                events.push(GameEvent::ResourceExhausted { resource_err });
            }
            return;
        }
    };
    let _ = registry.add_component(entity, origin);
    let _ = registry.add_component(entity, Velocity { vx, vy });
    let _ = registry.add_component(
        entity,
        Collider {
            center_x: origin.x,
            center_y: origin.y,
            half_x: DEFAULT_PROJECTILE_COLLIDER_HALF,
            half_y: DEFAULT_PROJECTILE_COLLIDER_HALF,
        },
    );
    let _ = registry.add_component(
        entity,
        Projectile {
            projectile_id,
            projectile_type: ProjectileType::EnemyBasic,
            owner_id,
            damage,
            seq: 0,
            destroyed: false,
        },
    );

    events.push(GameEvent::ProjectileSpawn {
        projectile_id,
        owner_id,
        is_enemy_projectile: true,
        x: origin.x,
        y: origin.y,
        vx,
        vy,
        speed,
        damage,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_ecs::components::{Collider, Enemy, Player, Position, Projectile, Shoot, Velocity};

    fn new_registry() -> Registry {
        let mut reg = Registry::new(32);
        reg.register_component::<Enemy>().unwrap();
        reg.register_component::<Position>().unwrap();
        reg.register_component::<Velocity>().unwrap();
        reg.register_component::<Shoot>().unwrap();
        reg.register_component::<Player>().unwrap();
        reg.register_component::<Collider>().unwrap();
        reg.register_component::<Projectile>().unwrap();
        reg
    }

    #[test]
    fn enemy_drifts_left() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Enemy { enemy_id: 1, enemy_type: wingman_common::wire::EnemyType::BasicFighter, alive: true, score: 10 }).unwrap();
        reg.add_component(e, Position { x: 100.0, y: 0.0 }).unwrap();
        reg.add_component(e, Velocity::default()).unwrap();
        reg.add_component(e, Shoot { timer: 0.0, interval: 10.0, can_shoot: false }).unwrap();

        let mut next_id = 0;
        run_enemy_ai(&mut reg, &EventQueue::new(), 0.016, &AiTuning::default(), &mut next_id);

        let vel = *reg.get_component::<Velocity>(e).unwrap();
        assert_eq!(vel.vx, -DEFAULT_ENEMY_SPEED);
    }

    #[test]
    fn enemy_fires_at_nearest_player_when_ready() {
        let mut reg = new_registry();
        let enemy = reg.create_entity().unwrap();
        reg.add_component(enemy, Enemy { enemy_id: 1, enemy_type: wingman_common::wire::EnemyType::BasicFighter, alive: true, score: 10 }).unwrap();
        reg.add_component(enemy, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(enemy, Velocity::default()).unwrap();
        reg.add_component(enemy, Shoot { timer: 0.0, interval: 1.0, can_shoot: true }).unwrap();

        let near = reg.create_entity().unwrap();
        reg.add_component(near, Player { name: "near".into(), seq: 0, alive: true, connected: true, player_id: 1 }).unwrap();
        reg.add_component(near, Position { x: 10.0, y: 0.0 }).unwrap();

        let far = reg.create_entity().unwrap();
        reg.add_component(far, Player { name: "far".into(), seq: 0, alive: true, connected: true, player_id: 2 }).unwrap();
        reg.add_component(far, Position { x: 1000.0, y: 0.0 }).unwrap();

        let events = EventQueue::new();
        let mut next_id = 0;
        run_enemy_ai(&mut reg, &events, 0.016, &AiTuning::default(), &mut next_id);

        let drained = events.drain();
        assert_eq!(drained.len(), 1);
        match &drained[0] {
            GameEvent::ProjectileSpawn { vx, is_enemy_projectile, .. } => {
                assert!(*is_enemy_projectile);
                assert!(*vx > 0.0, "should aim toward the +x player");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(next_id, 1);
    }

    #[test]
    fn dead_enemies_do_not_act() {
        let mut reg = new_registry();
        let e = reg.create_entity().unwrap();
        reg.add_component(e, Enemy { enemy_id: 1, enemy_type: wingman_common::wire::EnemyType::BasicFighter, alive: false, score: 10 }).unwrap();
        reg.add_component(e, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(e, Velocity { vx: 5.0, vy: 5.0 }).unwrap();
        reg.add_component(e, Shoot { timer: 0.0, interval: 1.0, can_shoot: true }).unwrap();

        let mut next_id = 0;
        run_enemy_ai(&mut reg, &EventQueue::new(), 0.016, &AiTuning::default(), &mut next_id);

        let vel = *reg.get_component::<Velocity>(e).unwrap();
        assert_eq!(vel.vx, 5.0, "dead enemy velocity should be untouched");
    }
}
