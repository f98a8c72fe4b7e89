//! Room and enemy definitions — the immutable data that deck building and
//! wave planning consume.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EnemyKindId, Side, Vec2};

// ---------------------------------------------------------------------------
// Enemy definitions
// ---------------------------------------------------------------------------

/// Baseline stats for one enemy kind. Scaled per spawn by the wave
/// director's difficulty multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDef {
    pub kind: EnemyKindId,
    /// Human-readable name, used in logs only.
    pub name: String,
    pub max_health: f32,
    pub move_speed: f32,
    /// Damage dealt per strike when within attack range.
    pub contact_damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: Duration,
    /// Body extent, used as the closest-point approximation for
    /// radius-hysteresis culling.
    pub body_radius: f32,
}

impl EnemyDef {
    /// Stats scaled linearly with effective difficulty:
    /// `base * (1 + step * difficulty)`.
    pub fn scaled(&self, difficulty: u32, step: f32) -> ScaledStats {
        let mult = 1.0 + step * difficulty as f32;
        ScaledStats {
            max_health: self.max_health * mult,
            move_speed: self.move_speed * mult,
            contact_damage: self.contact_damage,
        }
    }
}

/// A difficulty-scaled stat block applied to a freshly spawned instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledStats {
    pub max_health: f32,
    pub move_speed: f32,
    pub contact_damage: f32,
}

/// How many of one enemy kind a room's wave must spawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyQuota {
    pub kind: EnemyKindId,
    pub count: u32,
}

// ---------------------------------------------------------------------------
// Room definitions
// ---------------------------------------------------------------------------

/// Category of a room inside the deck. Deck construction guarantees a
/// per-category quota (see `ashgate-room`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Standard,
    Shop,
    Elite,
    Boss,
    Starter,
}

impl std::fmt::Display for RoomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomKind::Standard => write!(f, "standard"),
            RoomKind::Shop => write!(f, "shop"),
            RoomKind::Elite => write!(f, "elite"),
            RoomKind::Boss => write!(f, "boss"),
            RoomKind::Starter => write!(f, "starter"),
        }
    }
}

/// Anchor points of a room, authored in world space.
///
/// Anchors are explicit typed fields — a room registers its spawn points
/// and door sides up front, and nothing searches by name at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Reference point of the room; the absolute placement fallback.
    pub origin: Vec2,
    /// Where players are placed on entry, in player order. A single anchor
    /// serves both players with a fixed lateral offset for the second.
    pub player_spawns: Vec<Vec2>,
    /// Eligible enemy spawn points for the wave director.
    pub enemy_spawns: Vec<Vec2>,
    /// Sides that carry an outgoing door.
    pub doors: Vec<Side>,
}

/// One room definition from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDef {
    pub name: String,
    pub kind: RoomKind,
    /// Enemies to spawn when this room's wave begins.
    #[serde(default)]
    pub quotas: Vec<EnemyQuota>,
    pub layout: RoomLayout,
}

impl RoomDef {
    /// Total enemies across all quotas.
    pub fn total_enemy_count(&self) -> u32 {
        self.quotas.iter().map(|q| q.count).sum()
    }
}
