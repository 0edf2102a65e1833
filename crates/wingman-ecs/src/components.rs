// components.rs — concrete component types, plus the marker tags used for
// client-side system dispatch.

use std::collections::VecDeque;

use parking_lot::Mutex;
use wingman_common::wire::{EnemyType, ProjectileType};

#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Speed {
    pub value: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub cur: u32,
    pub max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { cur: max, max }
    }

    /// Apply damage, clamped at zero. Returns true if this hit killed.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.cur = self.cur.saturating_sub(amount);
        self.cur == 0
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub seq: u32,
    pub alive: bool,
    pub connected: bool,
    pub player_id: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub enemy_id: u32,
    pub enemy_type: EnemyType,
    pub alive: bool,
    /// Score awarded to the killer's `Score` component on death.
    pub score: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub projectile_id: u32,
    pub projectile_type: ProjectileType,
    pub owner_id: u32,
    pub damage: u32,
    pub seq: u32,
    pub destroyed: bool,
}

/// Axis-aligned bounding box, defined by center and half-extent.
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub center_x: f32,
    pub center_y: f32,
    pub half_x: f32,
    pub half_y: f32,
}

impl Collider {
    pub fn min(&self) -> (f32, f32) {
        (self.center_x - self.half_x, self.center_y - self.half_y)
    }

    pub fn max(&self) -> (f32, f32) {
        (self.center_x + self.half_x, self.center_y + self.half_y)
    }

    /// Standard AABB-overlap test.
    pub fn overlaps(&self, other: &Collider) -> bool {
        let (a_min_x, a_min_y) = self.min();
        let (a_max_x, a_max_y) = self.max();
        let (b_min_x, b_min_y) = other.min();
        let (b_max_x, b_max_y) = other.max();
        a_min_x <= b_max_x && a_max_x >= b_min_x && a_min_y <= b_max_y && a_max_y >= b_min_y
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Score {
    pub player_id: u32,
    pub score: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Shoot {
    pub timer: f32,
    pub interval: f32,
    pub can_shoot: bool,
}

impl Shoot {
    /// Advance the cooldown by `dt` seconds; flips `can_shoot` once the
    /// interval elapses.
    pub fn tick(&mut self, dt: f32) {
        if !self.can_shoot {
            self.timer += dt;
            if self.timer >= self.interval {
                self.timer = 0.0;
                self.can_shoot = true;
            }
        }
    }

    pub fn consume(&mut self) {
        self.can_shoot = false;
        self.timer = 0.0;
    }
}

/// One sample in a [`StateHistory`] ring: position at a server timestamp
/// (seconds, monotonic within the room).
#[derive(Debug, Clone, Copy)]
pub struct StateSample {
    pub x: f32,
    pub y: f32,
    pub t: f64,
}

/// Ring buffer of up to 10 recent position samples, used by the client's
/// interpolation system. Internally mutexed because samples may be pushed
/// from the network thread while the render thread reads a snapshot.
pub struct StateHistory {
    samples: Mutex<VecDeque<StateSample>>,
}

impl StateHistory {
    pub const CAPACITY: usize = 10;

    pub fn new() -> Self {
        Self { samples: Mutex::new(VecDeque::with_capacity(Self::CAPACITY)) }
    }

    pub fn push(&self, sample: StateSample) {
        let mut samples = self.samples.lock();
        if samples.len() == Self::CAPACITY {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    pub fn snapshot(&self) -> Vec<StateSample> {
        self.samples.lock().iter().copied().collect()
    }
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Marker: this entity mirrors another room member's player, driven by
/// interpolated network state rather than local input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteEntityTag;

/// Marker: this entity is the local player, driven by predicted input.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPlayerTag;

/// Marker: this entity's position is constrained to the world rect minus
/// its collider half-size every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClampToBounds;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_apply_damage_clamps_and_reports_death() {
        let mut hp = Health::new(10);
        assert!(!hp.apply_damage(4));
        assert_eq!(hp.cur, 6);
        assert!(hp.apply_damage(100));
        assert_eq!(hp.cur, 0);
    }

    #[test]
    fn collider_overlap() {
        let a = Collider { center_x: 0.0, center_y: 0.0, half_x: 1.0, half_y: 1.0 };
        let b = Collider { center_x: 1.5, center_y: 0.0, half_x: 1.0, half_y: 1.0 };
        let c = Collider { center_x: 5.0, center_y: 0.0, half_x: 1.0, half_y: 1.0 };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn shoot_cooldown_cycles() {
        let mut shoot = Shoot { timer: 0.0, interval: 1.0, can_shoot: false };
        shoot.tick(0.5);
        assert!(!shoot.can_shoot);
        shoot.tick(0.6);
        assert!(shoot.can_shoot);
        shoot.consume();
        assert!(!shoot.can_shoot);
    }

    #[test]
    fn state_history_caps_at_capacity() {
        let history = StateHistory::new();
        for i in 0..15 {
            history.push(StateSample { x: i as f32, y: 0.0, t: i as f64 });
        }
        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), StateHistory::CAPACITY);
        assert_eq!(snapshot.first().unwrap().x, 5.0);
        assert_eq!(snapshot.last().unwrap().x, 14.0);
    }
}
