// events.rs — the simulation's FIFO output. Gameplay never talks to the
// network layer directly; every consequence of a tick becomes one of
// these records, and the broadcast step (owned by `wingman-server`) drains
// the queue at the end of the tick and translates records into packets.

use std::collections::VecDeque;

use parking_lot::Mutex;
use wingman_common::ResourceError;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemySpawn { enemy_id: u32, x: f32, y: f32, vx: f32, vy: f32, health: u32, max_health: u32 },
    EnemyMove { enemy_id: u32, x: f32, y: f32, vx: f32, vy: f32, seq: u32 },
    EnemyDestroy { enemy_id: u32, x: f32, y: f32, killer_player_id: u32, score: u32 },
    EnemyHit { enemy_id: u32, x: f32, y: f32, damage: f32, seq: u32 },
    PlayerHit { player_id: u32, x: f32, y: f32, damage: u32, seq: u32 },
    PlayerDied { player_id: u32, x: f32, y: f32 },
    PlayerDestroy { player_id: u32 },
    PositionUpdate { player_id: u32, x: f32, y: f32, seq: u32 },
    ProjectileSpawn {
        projectile_id: u32,
        owner_id: u32,
        is_enemy_projectile: bool,
        x: f32,
        y: f32,
        vx: f32,
        vy: f32,
        speed: f32,
        damage: u32,
    },
    ProjectileHit { projectile_id: u32, target_id: u32, target_is_player: bool, x: f32, y: f32 },
    ProjectileDestroy { projectile_id: u32, x: f32, y: f32 },
    /// A spawn inside the tick/join path hit entity-capacity or
    /// component-budget exhaustion. Fatal to the room per the resource
    /// error taxonomy: the network layer translates this into
    /// `Packet::GameEnd` and the room transitions to `Finished`.
    ResourceExhausted { resource_err: ResourceError },
}

/// FIFO queue of events produced within a tick. Ordering within a tick is
/// stable (push order); ordering across ticks is monotonic since the
/// queue is only ever drained, never reordered.
#[derive(Default)]
pub struct EventQueue {
    queue: Mutex<VecDeque<GameEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { queue: Mutex::new(VecDeque::new()) }
    }

    pub fn push(&self, event: GameEvent) {
        self.queue.lock().push_back(event);
    }

    /// Drain every event accumulated since the last drain, in push order.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.queue.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_fifo_order() {
        let q = EventQueue::new();
        q.push(GameEvent::PlayerDied { player_id: 1, x: 0.0, y: 0.0 });
        q.push(GameEvent::PlayerDestroy { player_id: 1 });

        let drained = q.drain();
        assert_eq!(
            drained,
            vec![
                GameEvent::PlayerDied { player_id: 1, x: 0.0, y: 0.0 },
                GameEvent::PlayerDestroy { player_id: 1 },
            ]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn drain_empties_the_queue() {
        let q = EventQueue::new();
        q.push(GameEvent::EnemyHit { enemy_id: 1, x: 0.0, y: 0.0, damage: 5.0, seq: 1 });
        assert_eq!(q.len(), 1);
        q.drain();
        assert_eq!(q.len(), 0);
    }
}
