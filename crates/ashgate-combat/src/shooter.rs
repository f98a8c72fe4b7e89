//! The player's automatic shooter.
//!
//! Enemies entering the detection radius (trigger notifications from the
//! spatial layer) join the target set; the shooter fires at the closest
//! valid target on a cooldown and emits a [`ShotCommand`] for the physics
//! layer to resolve. Projectile flight and collision are external — damage
//! comes back through the session's hit entry point.

use std::time::Duration;

use ashgate_defs::{EnemyId, Vec2};
use serde::{Deserialize, Serialize};

use crate::{TargetCaps, TargetSet};

/// Settings for one player's shooter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShooterConfig {
    pub detection_radius: f32,
    /// Widening factor on the exit radius (hysteresis epsilon).
    pub hysteresis: f32,
    pub shot_interval: Duration,
    /// Fire at a target the moment it enters the radius, cooldown
    /// permitting.
    pub fire_on_enter: bool,
    pub damage: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: Duration,
    pub piercing: u32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            detection_radius: 10.0,
            hysteresis: 0.1,
            shot_interval: Duration::from_millis(400),
            fire_on_enter: true,
            damage: 10.0,
            projectile_speed: 20.0,
            projectile_lifetime: Duration::from_secs(5),
            piercing: 0,
        }
    }
}

/// One shot for the physics layer to resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotCommand {
    pub target: EnemyId,
    pub origin: Vec2,
    /// Unit direction from origin toward the aim point.
    pub dir: Vec2,
    pub damage: f32,
    pub speed: f32,
    pub lifetime: Duration,
    pub piercing: u32,
}

/// Tracks enemies in range and fires at the closest one on a cooldown.
#[derive(Debug, Clone)]
pub struct AutoShooter {
    config: ShooterConfig,
    targets: TargetSet<EnemyId>,
    cooldown_left: Duration,
}

impl AutoShooter {
    pub fn new(config: ShooterConfig) -> Self {
        Self {
            config,
            targets: TargetSet::new(),
            cooldown_left: Duration::ZERO,
        }
    }

    /// Trigger-enter notification from the spatial layer. May fire
    /// immediately when configured to and the cooldown allows.
    pub fn on_enter(
        &mut self,
        enemy: EnemyId,
        origin: Vec2,
        caps: &impl TargetCaps<EnemyId>,
    ) -> Option<ShotCommand> {
        if !self.targets.insert(enemy) {
            return None;
        }
        if self.config.fire_on_enter && self.cooldown_left.is_zero() && caps.valid(enemy) {
            return self.fire_at(enemy, origin, caps);
        }
        None
    }

    /// Trigger-exit notification from the spatial layer.
    pub fn on_exit(&mut self, enemy: EnemyId) {
        self.targets.remove(enemy);
    }

    /// Advances the cooldown, re-evaluates membership once, and fires at
    /// the closest target when ready.
    pub fn tick(
        &mut self,
        dt: Duration,
        origin: Vec2,
        caps: &impl TargetCaps<EnemyId>,
    ) -> Option<ShotCommand> {
        self.cooldown_left = self.cooldown_left.saturating_sub(dt);
        self.targets.cull(
            origin,
            self.config.detection_radius,
            self.config.hysteresis,
            caps,
        );

        if !self.cooldown_left.is_zero() || self.targets.is_empty() {
            return None;
        }
        let target = self.targets.closest(origin, caps)?;
        self.fire_at(target, origin, caps)
    }

    pub fn targets_in_range(&self) -> usize {
        self.targets.len()
    }

    pub fn config(&self) -> &ShooterConfig {
        &self.config
    }

    // ---------------- Upgrades ----------------

    pub fn decrease_shot_interval(&mut self, amount: Duration) {
        self.config.shot_interval = self
            .config
            .shot_interval
            .saturating_sub(amount)
            .max(Duration::from_millis(10));
    }

    pub fn increase_damage(&mut self, amount: f32) {
        self.config.damage += amount;
    }

    pub fn increase_projectile_speed(&mut self, amount: f32) {
        self.config.projectile_speed += amount;
    }

    pub fn increase_piercing(&mut self, amount: u32) {
        self.config.piercing += amount;
    }

    pub fn increase_projectile_lifetime(&mut self, amount: Duration) {
        self.config.projectile_lifetime += amount;
    }

    pub fn increase_range(&mut self, amount: f32) {
        self.config.detection_radius += amount;
    }

    fn fire_at(
        &mut self,
        target: EnemyId,
        origin: Vec2,
        caps: &impl TargetCaps<EnemyId>,
    ) -> Option<ShotCommand> {
        let aim = caps.position(target)?;
        let mut dir = (aim - origin).normalized();
        if dir == Vec2::ZERO {
            // Degenerate overlap: fall back to +X.
            dir = Vec2::new(1.0, 0.0);
        }
        self.cooldown_left = self.config.shot_interval;
        Some(ShotCommand {
            target,
            origin,
            dir,
            damage: self.config.damage,
            speed: self.config.projectile_speed,
            lifetime: self.config.projectile_lifetime,
            piercing: self.config.piercing,
        })
    }
}
