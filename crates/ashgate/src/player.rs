//! Per-player state and the capability views combat reads through.

use std::collections::BTreeMap;

use ashgate_combat::{
    AutoShooter, Health, LifeState, Revive, TargetCaps,
};
use ashgate_defs::{EnemyId, PlayerId, Pose, Vec2};

use crate::enemy::Enemy;

/// Everything the session owns for one registered player.
///
/// The spatial layer feeds `pose` through commands; `ready` flips when
/// the player is first placed into a room, and gates enemy targeting.
#[derive(Debug)]
pub(crate) struct PlayerActor {
    pub(crate) pose: Pose,
    pub(crate) ready: bool,
    pub(crate) health: Health,
    pub(crate) revive: Revive,
    pub(crate) shooter: AutoShooter,
}

impl PlayerActor {
    pub(crate) fn is_alive(&self) -> bool {
        self.revive.state() == LifeState::Alive
    }
}

/// Read-only view of the player registry for enemy chasers.
///
/// Downed players remain valid targets (hits on a dead entity no-op);
/// players that have not been placed yet are skipped via `ready`.
pub(crate) struct PlayerView<'a>(pub(crate) &'a BTreeMap<PlayerId, PlayerActor>);

impl TargetCaps<PlayerId> for PlayerView<'_> {
    fn position(&self, key: PlayerId) -> Option<Vec2> {
        self.0.get(&key).map(|p| p.pose.pos)
    }

    fn valid(&self, key: PlayerId) -> bool {
        self.0.contains_key(&key)
    }

    fn ready(&self, key: PlayerId) -> bool {
        self.0.get(&key).is_some_and(|p| p.ready)
    }
}

/// Read-only view of the live enemies for player shooters.
pub(crate) struct EnemyView<'a>(pub(crate) &'a BTreeMap<EnemyId, Enemy>);

impl TargetCaps<EnemyId> for EnemyView<'_> {
    fn position(&self, key: EnemyId) -> Option<Vec2> {
        self.0.get(&key).map(|e| e.pose.pos)
    }

    fn valid(&self, key: EnemyId) -> bool {
        self.0.contains_key(&key)
    }

    fn closest_point(&self, key: EnemyId, to: Vec2) -> Option<Vec2> {
        let enemy = self.0.get(&key)?;
        let center = enemy.pose.pos;
        // Point on the body's bounding circle nearest to `to`.
        let toward = (to - center).normalized();
        Some(center + toward * enemy.body_radius())
    }
}
