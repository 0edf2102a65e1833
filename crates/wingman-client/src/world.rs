// world.rs — the client's own entity-component registry: a mirror of
// server state built entirely from inbound packets, never simulated
// authoritatively. Registers a narrower component set than
// `wingman_game::Simulation` — `ClampToBounds` clamps to world bounds,
// which only the authoritative side enforces — but reuses the same
// dense-registry machinery and, for projectiles, the same
// `wingman_game::physics::integrate_projectiles` dead-reckoning the
// server itself runs, since no packet exists to broadcast a projectile's
// position every tick.

use std::collections::HashMap;

use wingman_common::wire::{EnemyType, ProjectileType};
use wingman_ecs::components::{
    Collider, Enemy, Health, LocalPlayerTag, Player, Projectile, Position, RemoteEntityTag, Score,
    Shoot, Speed, StateHistory, StateSample, Velocity,
};
use wingman_ecs::{Entity, Registry};

use wingman_game::events::{EventQueue, GameEvent};
use wingman_game::physics::{self, WorldBounds};
use wingman_game::simulation::{DEFAULT_PLAYER_COLLIDER_HALF, DEFAULT_SHOOT_INTERVAL};

/// Registry capacity. Far smaller than a room's server-side default
/// ([`wingman_ecs::registry::DEFAULT_CAPACITY`]) since a client only ever
/// mirrors the handful of entities visible in its own room.
pub const CLIENT_REGISTRY_CAPACITY: u32 = 512;

const ENEMY_COLLIDER_HALF: f32 = 8.0;
const PROJECTILE_COLLIDER_HALF: f32 = 4.0;

/// Local mirror of one room's entity state, kept current by
/// [`crate::session::GameClient`] as packets arrive.
pub struct ClientWorld {
    pub registry: Registry,
    bounds: WorldBounds,
    projectile_events: EventQueue,
    players: HashMap<u32, Entity>,
    enemies: HashMap<u32, Entity>,
    projectiles: HashMap<u32, Entity>,
    local_player_id: Option<u32>,
}

impl ClientWorld {
    pub fn new() -> Self {
        let mut registry = Registry::new(CLIENT_REGISTRY_CAPACITY);
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

        Self {
            registry,
            bounds: wingman_game::SimulationConfig::default().world_bounds,
            projectile_events: EventQueue::new(),
            players: HashMap::new(),
            enemies: HashMap::new(),
            projectiles: HashMap::new(),
            local_player_id: None,
        }
    }

    pub fn local_player_id(&self) -> Option<u32> {
        self.local_player_id
    }

    pub fn player_entity(&self, player_id: u32) -> Option<Entity> {
        self.players.get(&player_id).copied()
    }

    pub fn local_player_entity(&self) -> Option<Entity> {
        self.local_player_id.and_then(|id| self.player_entity(id))
    }

    /// Mirror a `NewPlayer` broadcast. `is_local` tags the entity as the
    /// one driven by local prediction rather than interpolation.
    pub fn spawn_player(&mut self, player_id: u32, name: String, x: f32, y: f32, speed: f32, max_health: u32, is_local: bool) -> Entity {
        if let Some(&existing) = self.players.get(&player_id) {
            return existing;
        }
        let entity = self.registry.create_entity().expect("client registry capacity exhausted");
        self.registry.add_component(entity, Position { x, y }).unwrap();
        self.registry.add_component(entity, Velocity::default()).unwrap();
        self.registry.add_component(entity, Speed { value: speed }).unwrap();
        self.registry.add_component(entity, Health::new(max_health)).unwrap();
        self.registry
            .add_component(entity, Player { name, seq: 0, alive: true, connected: true, player_id })
            .unwrap();
        self.registry
            .add_component(entity, Collider { center_x: x, center_y: y, half_x: DEFAULT_PLAYER_COLLIDER_HALF, half_y: DEFAULT_PLAYER_COLLIDER_HALF })
            .unwrap();
        self.registry.add_component(entity, Score { player_id, score: 0 }).unwrap();
        self.registry.add_component(entity, StateHistory::new()).unwrap();
        if is_local {
            self.registry.add_component(entity, LocalPlayerTag).unwrap();
            self.local_player_id = Some(player_id);
        } else {
            self.registry.add_component(entity, RemoteEntityTag).unwrap();
        }

        self.players.insert(player_id, entity);
        entity
    }

    /// Mirror `PlayerDisconnected`/leaving a room.
    pub fn remove_player(&mut self, player_id: u32) {
        if let Some(entity) = self.players.remove(&player_id) {
            let _ = self.registry.destroy_entity(entity);
        }
        if self.local_player_id == Some(player_id) {
            self.local_player_id = None;
        }
    }

    /// Mirror a remote player's `PlayerMove`: push a fresh sample into its
    /// `StateHistory` for [`crate::interpolation::interpolate`] to consume.
    /// Never called for the local player — its position comes from
    /// [`crate::prediction::Predictor`] instead.
    pub fn record_remote_player_move(&mut self, player_id: u32, x: f32, y: f32, seq: u32, now: f64) {
        let Some(&entity) = self.players.get(&player_id) else { return };
        if let Ok(history) = self.registry.get_component::<StateHistory>(entity) {
            history.push(StateSample { x, y, t: now });
        }
        if let Ok(player) = self.registry.get_component_mut::<Player>(entity) {
            player.seq = seq;
        }
    }

    pub fn enemy_entity(&self, enemy_id: u32) -> Option<Entity> {
        self.enemies.get(&enemy_id).copied()
    }

    pub fn spawn_enemy(&mut self, enemy_id: u32, enemy_type: EnemyType, x: f32, y: f32, vx: f32, vy: f32, health: u32, max_health: u32) {
        if self.enemies.contains_key(&enemy_id) {
            return;
        }
        let entity = self.registry.create_entity().expect("client registry capacity exhausted");
        self.registry.add_component(entity, Position { x, y }).unwrap();
        self.registry.add_component(entity, Velocity { vx, vy }).unwrap();
        self.registry.add_component(entity, Health { cur: health, max: max_health }).unwrap();
        self.registry.add_component(entity, Enemy { enemy_id, enemy_type, alive: true, score: 0 }).unwrap();
        self.registry
            .add_component(entity, Collider { center_x: x, center_y: y, half_x: ENEMY_COLLIDER_HALF, half_y: ENEMY_COLLIDER_HALF })
            .unwrap();
        self.registry.add_component(entity, Shoot { timer: 0.0, interval: DEFAULT_SHOOT_INTERVAL, can_shoot: false }).unwrap();
        self.registry.add_component(entity, StateHistory::new()).unwrap();
        self.registry.add_component(entity, RemoteEntityTag).unwrap();
        self.enemies.insert(enemy_id, entity);
    }

    pub fn record_enemy_move(&mut self, enemy_id: u32, x: f32, y: f32, vx: f32, vy: f32, now: f64) {
        let Some(&entity) = self.enemies.get(&enemy_id) else { return };
        if let Ok(velocity) = self.registry.get_component_mut::<Velocity>(entity) {
            velocity.vx = vx;
            velocity.vy = vy;
        }
        if let Ok(history) = self.registry.get_component::<StateHistory>(entity) {
            history.push(StateSample { x, y, t: now });
        }
    }

    pub fn remove_enemy(&mut self, enemy_id: u32) {
        if let Some(entity) = self.enemies.remove(&enemy_id) {
            let _ = self.registry.destroy_entity(entity);
        }
    }

    pub fn spawn_projectile(
        &mut self,
        projectile_id: u32,
        projectile_type: ProjectileType,
        owner_id: u32,
        x: f32,
        y: f32,
        vx: f32,
        vy: f32,
        damage: u32,
    ) {
        if self.projectiles.contains_key(&projectile_id) {
            return;
        }
        let entity = self.registry.create_entity().expect("client registry capacity exhausted");
        self.registry.add_component(entity, Position { x, y }).unwrap();
        self.registry.add_component(entity, Velocity { vx, vy }).unwrap();
        self.registry
            .add_component(entity, Projectile { projectile_id, projectile_type, owner_id, damage, seq: 0, destroyed: false })
            .unwrap();
        self.registry
            .add_component(entity, Collider { center_x: x, center_y: y, half_x: PROJECTILE_COLLIDER_HALF, half_y: PROJECTILE_COLLIDER_HALF })
            .unwrap();
        self.projectiles.insert(projectile_id, entity);
    }

    /// Mirror `ProjectileHit`/`ProjectileDestroy`: the server is
    /// authoritative on when a projectile disappears, this only removes
    /// the local mirror.
    pub fn remove_projectile(&mut self, projectile_id: u32) {
        if let Some(entity) = self.projectiles.remove(&projectile_id) {
            let _ = self.registry.destroy_entity(entity);
        }
    }

    /// Dead-reckon every projectile forward by `dt` between position
    /// updates (there is none, on the wire, per projectile — see the
    /// module doc). Projectiles that drift far enough past the world
    /// bounds are locally despawned too, in case the server's
    /// `ProjectileDestroy` was lost.
    pub fn tick(&mut self, dt: f32) {
        physics::integrate_projectiles(&mut self.registry, &self.projectile_events, dt, self.bounds);
        for event in self.projectile_events.drain() {
            if let GameEvent::ProjectileDestroy { projectile_id, .. } = event {
                self.projectiles.remove(&projectile_id);
            }
        }
    }
}

impl Default for ClientWorld {
    fn default() -> Self {
        Self::new()
    }
}
