// simulation.rs — ties together input, AI, physics, and collision into the
// per-room fixed-step tick. Owned by one `RoomHandle`'s game thread in
// `wingman-server`; never touches the network layer directly — every
// consequence of a tick lands in the `EventQueue` for the broadcast step
// to drain.

use wingman_common::wire::{EnemyType, ProjectileType};
use wingman_ecs::components::{
    ClampToBounds, Collider, Enemy, Health, LocalPlayerTag, Player, Projectile, Position,
    RemoteEntityTag, Score, Shoot, Speed, StateHistory, Velocity,
};
use wingman_ecs::{EcsError, Entity, Registry};

use crate::ai::{self, AiTuning};
use crate::collision::{self, COLLISION_DAMAGE};
use crate::events::{EventQueue, GameEvent};
use crate::input::PendingInputs;
use crate::physics::{self, WorldBounds};

/// Default per-tick step, ~16 ms.
pub const DEFAULT_TICK_DT: f32 = 1.0 / 60.0;

pub const DEFAULT_PLAYER_COLLIDER_HALF: f32 = 12.0;
pub const DEFAULT_PLAYER_MAX_HEALTH: u32 = 100;
pub const DEFAULT_PLAYER_SPEED: f32 = 180.0;
pub const DEFAULT_SHOOT_INTERVAL: f32 = 2.0;

/// Caller-supplied policy deciding when/how many enemies to spawn. Kept
/// out of the tick loop itself: concrete spawn cadence is gameplay tuning
/// the simulation core deliberately doesn't own, though it still owns the
/// mechanics (entity creation, AI, collision) once an enemy exists.
pub trait EnemySpawnPolicy: Send {
    fn on_tick(&mut self, dt: f32, registry: &mut Registry, events: &EventQueue, next_enemy_id: &mut u32);
}

/// A policy that never spawns anything — the default for rooms that spawn
/// enemies through some other caller-driven mechanism (e.g. a room-start
/// script), and the policy used throughout this crate's own tests.
pub struct NoSpawning;

impl EnemySpawnPolicy for NoSpawning {
    fn on_tick(&mut self, _dt: f32, _registry: &mut Registry, _events: &EventQueue, _next_enemy_id: &mut u32) {}
}

#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub world_bounds: WorldBounds,
    pub collision_damage: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_bounds: WorldBounds { min_x: 0.0, min_y: 0.0, max_x: 1280.0, max_y: 720.0 },
            collision_damage: COLLISION_DAMAGE,
        }
    }
}

pub struct Simulation {
    pub registry: Registry,
    pub events: EventQueue,
    config: SimulationConfig,
    ai_tuning: AiTuning,
    pending_inputs: PendingInputs,
    spawn_policy: Box<dyn EnemySpawnPolicy>,
    next_projectile_id: u32,
    next_enemy_id: u32,
    next_enemy_move_seq: u32,
    player_entities: std::collections::HashMap<u32, Entity>,
}

impl Simulation {
    pub fn new(capacity: u32, config: SimulationConfig, spawn_policy: Box<dyn EnemySpawnPolicy>) -> Self {
        let mut registry = Registry::new(capacity);
        registry.register_component::<Position>().unwrap();
        registry.register_component::<Velocity>().unwrap();
        registry.register_component::<Speed>().unwrap();
        registry.register_component::<Health>().unwrap();
        registry.register_component::<Player>().unwrap();
        registry.register_component::<Enemy>().unwrap();
        registry.register_component::<Projectile>().unwrap();
        registry.register_component::<Collider>().unwrap();
        registry.register_component::<Score>().unwrap();
        registry.register_component::<Shoot>().unwrap();
        registry.register_component::<StateHistory>().unwrap();
        registry.register_component::<RemoteEntityTag>().unwrap();
        registry.register_component::<LocalPlayerTag>().unwrap();
        registry.register_component::<ClampToBounds>().unwrap();

        Self {
            registry,
            events: EventQueue::new(),
            config,
            ai_tuning: AiTuning::default(),
            pending_inputs: PendingInputs::new(),
            spawn_policy,
            next_projectile_id: 0,
            next_enemy_id: 0,
            next_enemy_move_seq: 0,
            player_entities: std::collections::HashMap::new(),
        }
    }

    /// Pushes a `GameEvent::ResourceExhausted` when `result` failed with
    /// an `EcsError` that maps onto a room-fatal `ResourceError` (entity
    /// capacity or component-budget exhaustion), then returns the error
    /// unchanged so the caller's `?` still short-circuits. The network
    /// layer drains this event and ends the room per the resource error
    /// taxonomy.
    fn note_spawn_failure<T>(&self, result: Result<T, EcsError>) -> Result<T, EcsError> {
        if let Err(err) = &result {
            if let Some(resource_err) = err.as_resource_error() {
                tracing::error!(error = %resource_err, "room resource exhausted");
                self.events.push(GameEvent::ResourceExhausted { resource_err });
            }
        }
        result
    }

    /// Create a Player entity for a newly-joined client, at the room's
    /// spawn point. Pushes no event itself — the caller (room join flow)
    /// is responsible for the `NewPlayer` broadcast.
    pub fn spawn_player(
        &mut self,
        player_id: u32,
        name: String,
        x: f32,
        y: f32,
        speed: f32,
        max_health: u32,
    ) -> Result<Entity, EcsError> {
        let result = self.registry.create_entity();
        let entity = self.note_spawn_failure(result)?;
        self.registry.add_component(entity, Position { x, y })?;
        self.registry.add_component(entity, Velocity::default())?;
        self.registry.add_component(entity, Speed { value: speed })?;
        self.registry.add_component(entity, Health::new(max_health))?;
        self.registry.add_component(
            entity,
            Player { name, seq: 0, alive: true, connected: true, player_id },
        )?;
        self.registry.add_component(
            entity,
            Collider {
                center_x: x,
                center_y: y,
                half_x: DEFAULT_PLAYER_COLLIDER_HALF,
                half_y: DEFAULT_PLAYER_COLLIDER_HALF,
            },
        )?;
        self.registry.add_component(entity, Score { player_id, score: 0 })?;
        self.registry.add_component(entity, ClampToBounds)?;
        self.player_entities.insert(player_id, entity);
        Ok(entity)
    }

    /// Remove a disconnected/left player's entity and bookkeeping.
    pub fn despawn_player(&mut self, player_id: u32) {
        if let Some(entity) = self.player_entities.remove(&player_id) {
            let _ = self.registry.destroy_entity(entity);
        }
    }

    pub fn player_entity(&self, player_id: u32) -> Option<Entity> {
        self.player_entities.get(&player_id).copied()
    }

    /// Create an enemy entity directly — used by tests and by spawn
    /// policies that want the simulation to own id/event bookkeeping.
    pub fn spawn_enemy(&mut self, x: f32, y: f32, health: u32) -> Result<Entity, EcsError> {
        let enemy_id = self.next_enemy_id;
        self.next_enemy_id += 1;

        let result = self.registry.create_entity();
        let entity = self.note_spawn_failure(result)?;
        self.registry.add_component(entity, Position { x, y })?;
        self.registry.add_component(entity, Velocity::default())?;
        self.registry.add_component(entity, Health::new(health))?;
        self.registry.add_component(
            entity,
            Enemy { enemy_id, enemy_type: EnemyType::BasicFighter, alive: true, score: 50 },
        )?;
        self.registry.add_component(
            entity,
            Collider { center_x: x, center_y: y, half_x: ai::DEFAULT_ENEMY_COLLIDER_HALF, half_y: ai::DEFAULT_ENEMY_COLLIDER_HALF },
        )?;
        self.registry.add_component(
            entity,
            Shoot { timer: 0.0, interval: DEFAULT_SHOOT_INTERVAL, can_shoot: false },
        )?;

        self.events.push(GameEvent::EnemySpawn {
            enemy_id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            health,
            max_health: health,
        });
        Ok(entity)
    }

    /// Queue a `PlayerShoot` as a projectile spawn, aimed by the caller
    /// (client already supplied a direction via `x,y` — the spawn origin —
    /// and the simulation assigns the velocity from `aim_x, aim_y`).
    pub fn spawn_player_projectile(
        &mut self,
        owner_id: u32,
        x: f32,
        y: f32,
        aim_x: f32,
        aim_y: f32,
        speed: f32,
        damage: u32,
    ) -> Result<Entity, EcsError> {
        let projectile_id = self.next_projectile_id;
        self.next_projectile_id += 1;

        let len = (aim_x * aim_x + aim_y * aim_y).sqrt();
        let (vx, vy) = if len > 0.0 { (aim_x / len * speed, aim_y / len * speed) } else { (speed, 0.0) };

        let result = self.registry.create_entity();
        let entity = self.note_spawn_failure(result)?;
        self.registry.add_component(entity, Position { x, y })?;
        self.registry.add_component(entity, Velocity { vx, vy })?;
        self.registry.add_component(
            entity,
            Collider {
                center_x: x,
                center_y: y,
                half_x: ai::DEFAULT_PROJECTILE_COLLIDER_HALF,
                half_y: ai::DEFAULT_PROJECTILE_COLLIDER_HALF,
            },
        )?;
        self.registry.add_component(
            entity,
            Projectile {
                projectile_id,
                projectile_type: ProjectileType::PlayerBasic,
                owner_id,
                damage,
                seq: 0,
                destroyed: false,
            },
        )?;

        self.events.push(GameEvent::ProjectileSpawn {
            projectile_id,
            owner_id,
            is_enemy_projectile: false,
            x,
            y,
            vx,
            vy,
            speed,
            damage,
        });
        Ok(entity)
    }

    /// Record a `PlayerInput{bitmask, seq}` arrival; applied on the next
    /// [`Simulation::tick`].
    pub fn record_input(&mut self, player_id: u32, bitmask: u8, seq: u32) {
        if let Some(&entity) = self.player_entities.get(&player_id) {
            self.pending_inputs.record(entity, bitmask, seq);
        }
    }

    /// Run one fixed-step tick: drain input, enemy AI, movement
    /// integration, collision resolution, boundary clamp. All consequences
    /// land in `self.events`.
    pub fn tick(&mut self, dt: f32) {
        let applied = self.pending_inputs.drain_apply(&mut self.registry);

        self.spawn_policy.on_tick(dt, &mut self.registry, &self.events, &mut self.next_enemy_id);
        ai::run_enemy_ai(&mut self.registry, &self.events, dt, &self.ai_tuning, &mut self.next_projectile_id);

        // Position += velocity * dt for every moving entity. Projectiles get
        // their own pass (it also applies the despawn-margin rule), so
        // players and enemies are integrated first here.
        physics::integrate_actors(&mut self.registry, dt);
        physics::integrate_projectiles(&mut self.registry, &self.events, dt, self.config.world_bounds);
        physics::sync_colliders_to_position(&mut self.registry);

        collision::resolve_collisions(&mut self.registry, &self.events, self.config.collision_damage);
        physics::clamp_to_world_bounds(&mut self.registry, self.config.world_bounds);

        for (entity, seq) in applied {
            if !self.registry.is_alive(entity) {
                continue;
            }
            if let Ok(player) = self.registry.get_component::<Player>(entity) {
                let player_id = player.player_id;
                if let Ok(pos) = self.registry.get_component::<Position>(entity) {
                    self.events.push(GameEvent::PositionUpdate { player_id, x: pos.x, y: pos.y, seq });
                }
            }
        }

        self.emit_enemy_moves();
    }

    /// Broadcast every still-alive enemy's post-tick position/velocity as
    /// `EnemyMove` events. Sequenced by a room-wide counter
    /// (enemies have no per-entity sequence field of their own).
    fn emit_enemy_moves(&mut self) {
        let enemy_sig = self.registry.component_bit::<Enemy>().unwrap();
        let pos_sig = self.registry.component_bit::<Position>().unwrap();
        let vel_sig = self.registry.component_bit::<Velocity>().unwrap();
        let required = (1 << enemy_sig) | (1 << pos_sig) | (1 << vel_sig);

        for entity in self.registry.entities_matching(required) {
            let Ok(enemy) = self.registry.get_component::<Enemy>(entity) else { continue };
            if !enemy.alive {
                continue;
            }
            let enemy_id = enemy.enemy_id;
            let position = *self.registry.get_component::<Position>(entity).unwrap();
            let velocity = *self.registry.get_component::<Velocity>(entity).unwrap();

            self.next_enemy_move_seq += 1;
            self.events.push(GameEvent::EnemyMove {
                enemy_id,
                x: position.x,
                y: position.y,
                vx: velocity.vx,
                vy: velocity.vy,
                seq: self.next_enemy_move_seq,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sim() -> Simulation {
        Simulation::new(256, SimulationConfig::default(), Box::new(NoSpawning))
    }

    #[test]
    fn tick_applies_input_and_moves_player() {
        let mut sim = new_sim();
        let _entity = sim.spawn_player(1, "Alice".into(), 100.0, 100.0, DEFAULT_PLAYER_SPEED, DEFAULT_PLAYER_MAX_HEALTH).unwrap();

        sim.record_input(1, wingman_common::wire::input_bits::RIGHT, 1);
        sim.tick(1.0);

        let entity = sim.player_entity(1).unwrap();
        let pos = *sim.registry.get_component::<Position>(entity).unwrap();
        assert!(pos.x > 100.0);
    }

    #[test]
    fn tick_emits_position_update_for_applied_input() {
        let mut sim = new_sim();
        sim.spawn_player(1, "Alice".into(), 100.0, 100.0, DEFAULT_PLAYER_SPEED, DEFAULT_PLAYER_MAX_HEALTH).unwrap();
        sim.record_input(1, wingman_common::wire::input_bits::UP, 7);

        sim.tick(0.1);

        let drained = sim.events.drain();
        assert!(drained.iter().any(|e| matches!(e, GameEvent::PositionUpdate { player_id: 1, seq: 7, .. })));
    }

    #[test]
    fn player_projectile_destroys_enemy_end_to_end() {
        let mut sim = new_sim();
        sim.spawn_player(1, "Alice".into(), 0.0, 0.0, DEFAULT_PLAYER_SPEED, DEFAULT_PLAYER_MAX_HEALTH).unwrap();
        sim.spawn_enemy(50.0, 0.0, 5).unwrap();
        sim.events.drain();

        sim.spawn_player_projectile(1, 40.0, 0.0, 1.0, 0.0, 500.0, 100).unwrap();

        // A short dt: the two colliders already overlap at spawn (center
        // distance 10 < half-extent sum 12), so a tiny step keeps them
        // overlapping post-integration without the projectile tunnelling
        // past the enemy first.
        sim.tick(0.001);

        let drained = sim.events.drain();
        assert!(drained.iter().any(|e| matches!(e, GameEvent::EnemyDestroy { .. })));
    }

    #[test]
    fn spawn_player_past_capacity_emits_resource_exhausted_event() {
        let mut sim = Simulation::new(1, SimulationConfig::default(), Box::new(NoSpawning));
        sim.spawn_player(1, "Alice".into(), 0.0, 0.0, DEFAULT_PLAYER_SPEED, DEFAULT_PLAYER_MAX_HEALTH).unwrap();
        sim.events.drain();

        let err = sim.spawn_player(2, "Bob".into(), 0.0, 0.0, DEFAULT_PLAYER_SPEED, DEFAULT_PLAYER_MAX_HEALTH).unwrap_err();
        assert!(matches!(err, EcsError::CapacityExhausted { capacity: 1 }));

        let drained = sim.events.drain();
        assert!(drained.iter().any(|e| matches!(
            e,
            GameEvent::ResourceExhausted {
                resource_err: wingman_common::ResourceError::EntityCapacityExhausted { capacity: 1 }
            }
        )));
    }

    #[test]
    fn tick_emits_enemy_move_for_live_enemies() {
        let mut sim = new_sim();
        sim.spawn_enemy(200.0, 50.0, 10).unwrap();
        sim.events.drain();

        sim.tick(0.016);

        let drained = sim.events.drain();
        assert!(drained.iter().any(|e| matches!(e, GameEvent::EnemyMove { enemy_id: 0, .. })));
    }

    #[test]
    fn despawn_player_removes_entity() {
        let mut sim = new_sim();
        sim.spawn_player(1, "Alice".into(), 0.0, 0.0, DEFAULT_PLAYER_SPEED, DEFAULT_PLAYER_MAX_HEALTH).unwrap();
        let entity = sim.player_entity(1).unwrap();
        sim.despawn_player(1);
        assert!(!sim.registry.is_alive(entity));
        assert!(sim.player_entity(1).is_none());
    }
}
