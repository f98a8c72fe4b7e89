//! Named upgrades applied to one player by the input layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single upgrade choice (from a shop room or a level-up menu).
///
/// Applied through [`Session::apply_upgrade`](crate::Session::apply_upgrade);
/// every variant maps onto one mutator of the owning player's health,
/// revive or shooter state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Upgrade {
    /// Raise maximum HP (fully heals, like every max-HP change).
    MaxHp(f32),
    /// Raise passive regen, in HP per second.
    HealthRegen(f32),
    /// Shorten the auto-revive countdown.
    ReviveTime(Duration),
    /// Shorten the interval between shots.
    FireRate(Duration),
    /// Raise per-shot damage.
    Damage(f32),
    ProjectileSpeed(f32),
    Piercing(u32),
    ProjectileLifetime(Duration),
    /// Widen the shooter's detection radius.
    Range(f32),
}
