//! Hit points with clamped mutation and delay-gated passive regen.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for one entity's health record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthConfig {
    pub max_hp: f32,
    /// HP restored per second once regen is active. 0 disables regen.
    pub regen_per_sec: f32,
    /// Quiet time required after the last damage before regen resumes.
    pub regen_delay: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            regen_per_sec: 0.0,
            regen_delay: Duration::from_secs(1),
        }
    }
}

/// Events emitted by health mutations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthEvent {
    /// Current or maximum HP changed. Presentation subscribes to this for
    /// health bars.
    Changed { current: f32, max: f32 },
    /// HP reached zero. Fired exactly once per drop to zero; hits on a
    /// dead entity are no-ops.
    Died,
}

/// Current/maximum hit points plus the regen bookkeeping.
///
/// Invariant: `0 <= current <= max`. Regen advances only through
/// [`tick`](Health::tick), so a stopped simulation clock pauses regen by
/// construction.
#[derive(Debug, Clone)]
pub struct Health {
    hp: f32,
    max_hp: f32,
    regen_per_sec: f32,
    regen_delay: Duration,
    /// Time since the last damage. Starts saturated so a fresh entity
    /// regens without waiting out the delay.
    since_damage: Duration,
}

impl Health {
    pub fn new(config: HealthConfig) -> Self {
        let max_hp = config.max_hp.max(1.0);
        Self {
            hp: max_hp,
            max_hp,
            regen_per_sec: config.regen_per_sec.max(0.0),
            regen_delay: config.regen_delay,
            since_damage: config.regen_delay,
        }
    }

    /// Applies damage, clamped at zero.
    ///
    /// Resets the regen-delay window. Emits `Changed`, plus `Died` when
    /// this hit is the one that reached zero. Non-positive amounts and
    /// hits on an already-dead entity are no-ops.
    pub fn hit(&mut self, amount: f32) -> Vec<HealthEvent> {
        if amount <= 0.0 || self.hp <= 0.0 {
            return Vec::new();
        }
        self.hp = (self.hp - amount).max(0.0);
        self.since_damage = Duration::ZERO;

        let mut events = vec![self.changed()];
        if self.hp <= 0.0 {
            events.push(HealthEvent::Died);
        }
        events
    }

    /// Restores HP, clamped at the maximum. No-op on a dead entity.
    pub fn heal(&mut self, amount: f32) -> Vec<HealthEvent> {
        if amount <= 0.0 || self.hp <= 0.0 || self.hp >= self.max_hp {
            return Vec::new();
        }
        self.hp = (self.hp + amount).min(self.max_hp);
        vec![self.changed()]
    }

    /// Restores HP to the maximum unconditionally. This is the revive
    /// path, so it works on dead entities too.
    pub fn full_heal(&mut self) -> Vec<HealthEvent> {
        self.hp = self.max_hp;
        vec![self.changed()]
    }

    /// Replaces the maximum and fully heals.
    pub fn set_max_hp(&mut self, value: f32) -> Vec<HealthEvent> {
        self.max_hp = value.max(1.0);
        self.full_heal()
    }

    /// Shifts the maximum by `delta` (floored at 1) and fully heals.
    pub fn add_max_hp(&mut self, delta: f32) -> Vec<HealthEvent> {
        if delta.abs() < f32::EPSILON {
            return Vec::new();
        }
        self.max_hp = (self.max_hp + delta).max(1.0);
        self.full_heal()
    }

    /// Raises the regen rate (floored at 0).
    pub fn add_regen(&mut self, delta: f32) {
        self.regen_per_sec = (self.regen_per_sec + delta).max(0.0);
    }

    /// Advances regen by one simulation tick.
    pub fn tick(&mut self, dt: Duration) -> Vec<HealthEvent> {
        self.since_damage = self.since_damage.saturating_add(dt);

        if self.regen_per_sec <= 0.0
            || self.hp <= 0.0
            || self.hp >= self.max_hp
            || self.since_damage < self.regen_delay
        {
            return Vec::new();
        }

        let restored = (self.hp + self.regen_per_sec * dt.as_secs_f32()).min(self.max_hp);
        if restored == self.hp {
            return Vec::new();
        }
        self.hp = restored;
        vec![self.changed()]
    }

    pub fn current(&self) -> f32 {
        self.hp
    }

    pub fn max(&self) -> f32 {
        self.max_hp
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    fn changed(&self) -> HealthEvent {
        HealthEvent::Changed { current: self.hp, max: self.max_hp }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(max: f32, regen: f32) -> Health {
        Health::new(HealthConfig {
            max_hp: max,
            regen_per_sec: regen,
            regen_delay: Duration::from_secs(1),
        })
    }

    fn died(events: &[HealthEvent]) -> bool {
        events.contains(&HealthEvent::Died)
    }

    #[test]
    fn test_hit_clamps_at_zero_and_dies_once() {
        let mut h = health(30.0, 0.0);
        let events = h.hit(50.0);
        assert_eq!(h.current(), 0.0);
        assert!(died(&events));

        // Further hits on a dead entity are no-ops.
        let events = h.hit(10.0);
        assert!(events.is_empty());
        assert_eq!(h.current(), 0.0);
    }

    #[test]
    fn test_hit_ignores_non_positive_amounts() {
        let mut h = health(30.0, 0.0);
        assert!(h.hit(0.0).is_empty());
        assert!(h.hit(-5.0).is_empty());
        assert_eq!(h.current(), 30.0);
    }

    #[test]
    fn test_heal_clamps_at_max_and_skips_dead() {
        let mut h = health(30.0, 0.0);
        h.hit(10.0);
        h.heal(100.0);
        assert_eq!(h.current(), 30.0);

        h.hit(100.0);
        assert!(h.heal(5.0).is_empty(), "heal on dead entity is a no-op");
        assert!(h.is_dead());
    }

    #[test]
    fn test_full_heal_revives_hp() {
        let mut h = health(30.0, 0.0);
        h.hit(100.0);
        h.full_heal();
        assert_eq!(h.current(), 30.0);
    }

    #[test]
    fn test_regen_waits_out_the_delay() {
        let mut h = health(30.0, 10.0);
        h.hit(20.0);
        assert_eq!(h.current(), 10.0);

        // Half the delay: still quiet.
        assert!(h.tick(Duration::from_millis(500)).is_empty());
        assert_eq!(h.current(), 10.0);

        // Delay elapsed: regen resumes at 10 HP/s.
        h.tick(Duration::from_millis(500));
        let events = h.tick(Duration::from_millis(500));
        assert!(!events.is_empty());
        assert!(h.current() > 10.0);
    }

    #[test]
    fn test_regen_never_exceeds_max() {
        let mut h = health(30.0, 1000.0);
        h.hit(1.0);
        h.tick(Duration::from_secs(5));
        assert_eq!(h.current(), 30.0);
    }

    #[test]
    fn test_new_hits_to_zero_fire_died_again_after_revive() {
        let mut h = health(30.0, 0.0);
        assert!(died(&h.hit(30.0)));
        h.full_heal();
        assert!(died(&h.hit(30.0)), "each drop to zero fires its own death");
    }

    #[test]
    fn test_set_max_hp_floors_at_one() {
        let mut h = health(30.0, 0.0);
        h.set_max_hp(0.0);
        assert_eq!(h.max(), 1.0);
        assert_eq!(h.current(), 1.0);
    }
}
