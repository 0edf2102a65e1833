// collision.rs — AABB-vs-AABB collision resolution, the collide step of
// the per-tick pipeline. Only three pair kinds have effects; every other
// overlapping pair is ignored. Mirrors the shape of
// `g_combat.rs::t_damage` (health mutation, death branch, event/effect
// emission) adapted to an AABB/Collider model instead of quake2's BSP
// trace-based `can_damage`.

use wingman_common::wire::ProjectileType;
use wingman_ecs::components::{Collider, Enemy, Health, Player, Position, Projectile, Score};
use wingman_ecs::{Entity, Registry};

use crate::events::{EventQueue, GameEvent};

/// Flat damage both sides take on a direct player/enemy body collision.
pub const COLLISION_DAMAGE: u32 = 10;

/// Resolve every `Collider`+`Position` pair this tick. Entities destroyed
/// by this pass are removed from the registry before returning.
pub fn resolve_collisions(registry: &mut Registry, events: &EventQueue, collision_damage: u32) {
    let player_projectiles = projectiles_of_type(registry, ProjectileType::PlayerBasic);
    let enemy_projectiles = projectiles_of_type(registry, ProjectileType::EnemyBasic);
    let enemies = alive_enemies(registry);
    let players = alive_players(registry);

    let mut to_destroy: Vec<Entity> = Vec::new();

    for &proj in &player_projectiles {
        let Some(proj_collider) = collider_of(registry, proj) else { continue };
        for &enemy in &enemies {
            if to_destroy.contains(&proj) {
                break;
            }
            let Some(enemy_collider) = collider_of(registry, enemy) else { continue };
            if !proj_collider.overlaps(&enemy_collider) {
                continue;
            }
            hit_enemy(registry, events, proj, enemy, &mut to_destroy);
            to_destroy.push(proj);
        }
    }

    for &proj in &enemy_projectiles {
        if to_destroy.contains(&proj) {
            continue;
        }
        let Some(proj_collider) = collider_of(registry, proj) else { continue };
        for &player in &players {
            if to_destroy.contains(&proj) {
                break;
            }
            let Some(player_collider) = collider_of(registry, player) else { continue };
            if !proj_collider.overlaps(&player_collider) {
                continue;
            }
            hit_player(registry, events, proj, player, &mut to_destroy);
            to_destroy.push(proj);
        }
    }

    for &player in &players {
        if to_destroy.contains(&player) {
            continue;
        }
        let Some(player_collider) = collider_of(registry, player) else { continue };
        for &enemy in &enemies {
            if to_destroy.contains(&player) || to_destroy.contains(&enemy) {
                continue;
            }
            let Some(enemy_collider) = collider_of(registry, enemy) else { continue };
            if !player_collider.overlaps(&enemy_collider) {
                continue;
            }
            body_collision(registry, events, player, enemy, collision_damage, &mut to_destroy);
        }
    }

    for entity in to_destroy {
        if registry.is_alive(entity) {
            let _ = registry.destroy_entity(entity);
        }
    }
}

fn collider_of(registry: &Registry, entity: Entity) -> Option<Collider> {
    registry.get_component::<Collider>(entity).ok().copied()
}

fn projectiles_of_type(registry: &Registry, kind: ProjectileType) -> Vec<Entity> {
    let proj_sig = registry.component_bit::<Projectile>().unwrap();
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let collider_sig = registry.component_bit::<Collider>().unwrap();
    let required = (1 << proj_sig) | (1 << pos_sig) | (1 << collider_sig);

    registry
        .entities_matching(required)
        .into_iter()
        .filter(|&e| {
            registry
                .get_component::<Projectile>(e)
                .map(|p| !p.destroyed && p.projectile_type == kind)
                .unwrap_or(false)
        })
        .collect()
}

fn alive_enemies(registry: &Registry) -> Vec<Entity> {
    let enemy_sig = registry.component_bit::<Enemy>().unwrap();
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let collider_sig = registry.component_bit::<Collider>().unwrap();
    let required = (1 << enemy_sig) | (1 << pos_sig) | (1 << collider_sig);

    registry
        .entities_matching(required)
        .into_iter()
        .filter(|&e| registry.get_component::<Enemy>(e).map(|en| en.alive).unwrap_or(false))
        .collect()
}

fn alive_players(registry: &Registry) -> Vec<Entity> {
    let player_sig = registry.component_bit::<Player>().unwrap();
    let pos_sig = registry.component_bit::<Position>().unwrap();
    let collider_sig = registry.component_bit::<Collider>().unwrap();
    let required = (1 << player_sig) | (1 << pos_sig) | (1 << collider_sig);

    registry
        .entities_matching(required)
        .into_iter()
        .filter(|&e| registry.get_component::<Player>(e).map(|p| p.alive).unwrap_or(false))
        .collect()
}

/// Player projectile vs enemy: enemy takes `projectile.damage`. On kill,
/// the shooter's `Score` increases by the enemy's reward value and an
/// `EnemyDestroy` event fires; otherwise an `EnemyHit` event fires. The
/// projectile is always destroyed by the caller.
fn hit_enemy(registry: &mut Registry, events: &EventQueue, proj: Entity, enemy: Entity, to_destroy: &mut Vec<Entity>) {
    let damage = registry.get_component::<Projectile>(proj).unwrap().damage;
    let owner_id = registry.get_component::<Projectile>(proj).unwrap().owner_id;
    let (x, y) = {
        let pos = registry.get_component::<Position>(enemy).unwrap();
        (pos.x, pos.y)
    };

    let killed = match registry.get_component_mut::<Health>(enemy) {
        Ok(health) => health.apply_damage(damage),
        Err(_) => false,
    };

    if killed {
        let (enemy_id, score) = {
            let enemy_data = registry.get_component_mut::<Enemy>(enemy).unwrap();
            enemy_data.alive = false;
            (enemy_data.enemy_id, enemy_data.score)
        };
        award_score(registry, owner_id, score);
        events.push(GameEvent::EnemyDestroy { enemy_id, x, y, killer_player_id: owner_id, score });
        to_destroy.push(enemy);
    } else {
        let enemy_id = registry.get_component::<Enemy>(enemy).unwrap().enemy_id;
        events.push(GameEvent::EnemyHit { enemy_id, x, y, damage: damage as f32, seq: 0 });
    }
}

/// Enemy projectile vs player: symmetric to [`hit_enemy`]. On death emits
/// `PlayerDied` then `PlayerDestroy`.
fn hit_player(registry: &mut Registry, events: &EventQueue, proj: Entity, player: Entity, to_destroy: &mut Vec<Entity>) {
    let damage = registry.get_component::<Projectile>(proj).unwrap().damage;
    let (x, y) = {
        let pos = registry.get_component::<Position>(player).unwrap();
        (pos.x, pos.y)
    };

    let killed = match registry.get_component_mut::<Health>(player) {
        Ok(health) => health.apply_damage(damage),
        Err(_) => false,
    };

    let player_id = registry.get_component::<Player>(player).unwrap().player_id;
    if killed {
        kill_player(registry, events, player, player_id, x, y, to_destroy);
    } else {
        events.push(GameEvent::PlayerHit { player_id, x, y, damage, seq: 0 });
    }
}

/// Player vs enemy body collision: both take a flat `collision_damage`;
/// both death branches are handled exactly as their projectile-hit
/// counterparts.
fn body_collision(
    registry: &mut Registry,
    events: &EventQueue,
    player: Entity,
    enemy: Entity,
    collision_damage: u32,
    to_destroy: &mut Vec<Entity>,
) {
    let (px, py) = {
        let pos = registry.get_component::<Position>(player).unwrap();
        (pos.x, pos.y)
    };
    let (ex, ey) = {
        let pos = registry.get_component::<Position>(enemy).unwrap();
        (pos.x, pos.y)
    };

    let player_killed = registry
        .get_component_mut::<Health>(player)
        .map(|h| h.apply_damage(collision_damage))
        .unwrap_or(false);
    let enemy_killed = registry
        .get_component_mut::<Health>(enemy)
        .map(|h| h.apply_damage(collision_damage))
        .unwrap_or(false);

    let player_id = registry.get_component::<Player>(player).unwrap().player_id;
    if player_killed {
        kill_player(registry, events, player, player_id, px, py, to_destroy);
    } else {
        events.push(GameEvent::PlayerHit { player_id, x: px, y: py, damage: collision_damage, seq: 0 });
    }

    if enemy_killed {
        let (enemy_id, score) = {
            let enemy_data = registry.get_component_mut::<Enemy>(enemy).unwrap();
            enemy_data.alive = false;
            (enemy_data.enemy_id, enemy_data.score)
        };
        award_score(registry, player_id, score);
        events.push(GameEvent::EnemyDestroy { enemy_id, x: ex, y: ey, killer_player_id: player_id, score });
        to_destroy.push(enemy);
    } else {
        let enemy_id = registry.get_component::<Enemy>(enemy).unwrap().enemy_id;
        events.push(GameEvent::EnemyHit { enemy_id, x: ex, y: ey, damage: collision_damage as f32, seq: 0 });
    }
}

fn kill_player(
    registry: &mut Registry,
    events: &EventQueue,
    player: Entity,
    player_id: u32,
    x: f32,
    y: f32,
    to_destroy: &mut Vec<Entity>,
) {
    if let Ok(player_data) = registry.get_component_mut::<Player>(player) {
        player_data.alive = false;
    }
    events.push(GameEvent::PlayerDied { player_id, x, y });
    events.push(GameEvent::PlayerDestroy { player_id });
    to_destroy.push(player);
}

fn award_score(registry: &mut Registry, player_id: u32, amount: u32) {
    let score_sig = registry.component_bit::<Score>().unwrap();
    let required = 1 << score_sig;
    for entity in registry.entities_matching(required) {
        if let Ok(score) = registry.get_component_mut::<Score>(entity) {
            if score.player_id == player_id {
                score.score += amount;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_registry() -> Registry {
        let mut reg = Registry::new(32);
        reg.register_component::<Position>().unwrap();
        reg.register_component::<Collider>().unwrap();
        reg.register_component::<Health>().unwrap();
        reg.register_component::<Player>().unwrap();
        reg.register_component::<Enemy>().unwrap();
        reg.register_component::<Projectile>().unwrap();
        reg.register_component::<Score>().unwrap();
        reg
    }

    #[test]
    fn player_projectile_kills_enemy_and_awards_score() {
        let mut reg = new_registry();

        let shooter = reg.create_entity().unwrap();
        reg.add_component(shooter, Player { name: "p".into(), seq: 0, alive: true, connected: true, player_id: 1 }).unwrap();
        reg.add_component(shooter, Position { x: -100.0, y: 0.0 }).unwrap();
        reg.add_component(shooter, Collider { center_x: -100.0, center_y: 0.0, half_x: 4.0, half_y: 4.0 }).unwrap();
        reg.add_component(shooter, Score { player_id: 1, score: 0 }).unwrap();

        let enemy = reg.create_entity().unwrap();
        reg.add_component(enemy, Enemy { enemy_id: 9, enemy_type: wingman_common::wire::EnemyType::BasicFighter, alive: true, score: 50 }).unwrap();
        reg.add_component(enemy, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(enemy, Collider { center_x: 0.0, center_y: 0.0, half_x: 4.0, half_y: 4.0 }).unwrap();
        reg.add_component(enemy, Health::new(5)).unwrap();

        let proj = reg.create_entity().unwrap();
        reg.add_component(proj, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(proj, Collider { center_x: 0.0, center_y: 0.0, half_x: 2.0, half_y: 2.0 }).unwrap();
        reg.add_component(proj, Projectile { projectile_id: 1, projectile_type: ProjectileType::PlayerBasic, owner_id: 1, damage: 100, seq: 0, destroyed: false }).unwrap();

        let events = EventQueue::new();
        resolve_collisions(&mut reg, &events, COLLISION_DAMAGE);

        assert!(!reg.is_alive(enemy));
        assert!(!reg.is_alive(proj));
        assert_eq!(reg.get_component::<Score>(shooter).unwrap().score, 50);

        let drained = events.drain();
        assert!(drained.iter().any(|e| matches!(e, GameEvent::EnemyDestroy { enemy_id: 9, .. })));
    }

    #[test]
    fn enemy_projectile_hit_without_kill_emits_player_hit() {
        let mut reg = new_registry();

        let player = reg.create_entity().unwrap();
        reg.add_component(player, Player { name: "p".into(), seq: 0, alive: true, connected: true, player_id: 1 }).unwrap();
        reg.add_component(player, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(player, Collider { center_x: 0.0, center_y: 0.0, half_x: 4.0, half_y: 4.0 }).unwrap();
        reg.add_component(player, Health::new(100)).unwrap();

        let proj = reg.create_entity().unwrap();
        reg.add_component(proj, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(proj, Collider { center_x: 0.0, center_y: 0.0, half_x: 2.0, half_y: 2.0 }).unwrap();
        reg.add_component(proj, Projectile { projectile_id: 2, projectile_type: ProjectileType::EnemyBasic, owner_id: 9, damage: 10, seq: 0, destroyed: false }).unwrap();

        let events = EventQueue::new();
        resolve_collisions(&mut reg, &events, COLLISION_DAMAGE);

        assert!(reg.is_alive(player));
        assert!(!reg.is_alive(proj));
        assert_eq!(reg.get_component::<Health>(player).unwrap().cur, 90);

        let drained = events.drain();
        assert!(drained.iter().any(|e| matches!(e, GameEvent::PlayerHit { player_id: 1, .. })));
    }

    #[test]
    fn non_colliding_entities_are_untouched() {
        let mut reg = new_registry();
        let player = reg.create_entity().unwrap();
        reg.add_component(player, Player { name: "p".into(), seq: 0, alive: true, connected: true, player_id: 1 }).unwrap();
        reg.add_component(player, Position { x: 0.0, y: 0.0 }).unwrap();
        reg.add_component(player, Collider { center_x: 0.0, center_y: 0.0, half_x: 4.0, half_y: 4.0 }).unwrap();
        reg.add_component(player, Health::new(100)).unwrap();

        let enemy = reg.create_entity().unwrap();
        reg.add_component(enemy, Enemy { enemy_id: 1, enemy_type: wingman_common::wire::EnemyType::BasicFighter, alive: true, score: 10 }).unwrap();
        reg.add_component(enemy, Position { x: 1000.0, y: 1000.0 }).unwrap();
        reg.add_component(enemy, Collider { center_x: 1000.0, center_y: 1000.0, half_x: 4.0, half_y: 4.0 }).unwrap();
        reg.add_component(enemy, Health::new(10)).unwrap();

        let events = EventQueue::new();
        resolve_collisions(&mut reg, &events, COLLISION_DAMAGE);

        assert!(reg.is_alive(player));
        assert!(reg.is_alive(enemy));
        assert!(events.is_empty());
    }
}
