//! Chaser enemy logic: retarget the closest ready player, close in, and
//! strike on a cooldown.
//!
//! Movement integration is external — the chaser only emits an approach
//! intent toward its target. Strikes apply contact damage through the
//! session.

use std::time::Duration;

use ashgate_defs::{PlayerId, Vec2};
use serde::{Deserialize, Serialize};

use crate::{TargetCaps, TargetSet};

/// Settings for one chaser, partly sourced from the enemy definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChaserConfig {
    /// How often the closest-target choice is re-evaluated.
    pub retarget_interval: Duration,
    pub attack_range: f32,
    pub attack_cooldown: Duration,
    pub damage: f32,
    pub move_speed: f32,
}

impl Default for ChaserConfig {
    fn default() -> Self {
        Self {
            retarget_interval: Duration::from_millis(250),
            attack_range: 1.5,
            attack_cooldown: Duration::from_secs(1),
            damage: 10.0,
            move_speed: 3.5,
        }
    }
}

/// What the chaser wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChaseAction {
    /// No target (or in range, waiting out the attack cooldown).
    Hold,
    /// Move toward the target's position at the given speed.
    Approach { toward: Vec2, speed: f32 },
    /// In range with the cooldown elapsed: deal contact damage.
    Strike { target: PlayerId, damage: f32 },
}

/// Per-enemy chase state.
#[derive(Debug, Clone)]
pub struct Chaser {
    config: ChaserConfig,
    targets: TargetSet<PlayerId>,
    current: Option<PlayerId>,
    retarget_in: Duration,
    attack_in: Duration,
}

impl Chaser {
    pub fn new(config: ChaserConfig) -> Self {
        Self {
            config,
            targets: TargetSet::new(),
            current: None,
            retarget_in: Duration::ZERO,
            attack_in: Duration::ZERO,
        }
    }

    /// Registers a player as a potential target (player joined, or enemy
    /// freshly spawned into a running session).
    pub fn add_target(&mut self, player: PlayerId) {
        self.targets.insert(player);
    }

    /// Drops a player (left the session).
    pub fn remove_target(&mut self, player: PlayerId) {
        self.targets.remove(player);
        if self.current == Some(player) {
            self.current = None;
        }
    }

    /// Applies difficulty-scaled stats on spawn.
    pub fn set_move_speed(&mut self, speed: f32) {
        self.config.move_speed = speed;
    }

    /// Clears all transient state when the owning instance returns to the
    /// pool.
    pub fn reset(&mut self) {
        self.targets.clear();
        self.current = None;
        self.retarget_in = Duration::ZERO;
        self.attack_in = Duration::ZERO;
    }

    /// Advances retarget/attack timers and decides this tick's action.
    pub fn tick(
        &mut self,
        dt: Duration,
        my_pos: Vec2,
        caps: &impl TargetCaps<PlayerId>,
    ) -> ChaseAction {
        self.attack_in = self.attack_in.saturating_sub(dt);

        if let Some(current) = self.current {
            if !caps.valid(current) {
                self.current = None;
            }
        }

        self.retarget_in = self.retarget_in.saturating_sub(dt);
        if self.retarget_in.is_zero() {
            self.current = self.targets.closest(my_pos, caps);
            self.retarget_in = self.config.retarget_interval;
        }

        let Some(target) = self.current else {
            return ChaseAction::Hold;
        };
        let Some(target_pos) = caps.position(target) else {
            self.current = None;
            return ChaseAction::Hold;
        };

        let range_sq = self.config.attack_range * self.config.attack_range;
        if my_pos.distance_sq(target_pos) > range_sq {
            return ChaseAction::Approach {
                toward: target_pos,
                speed: self.config.move_speed,
            };
        }

        if self.attack_in.is_zero() {
            self.attack_in = self.config.attack_cooldown;
            return ChaseAction::Strike { target, damage: self.config.damage };
        }
        ChaseAction::Hold
    }

    pub fn current_target(&self) -> Option<PlayerId> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Players {
        positions: HashMap<PlayerId, Vec2>,
        not_ready: Vec<PlayerId>,
    }

    impl TargetCaps<PlayerId> for Players {
        fn position(&self, key: PlayerId) -> Option<Vec2> {
            self.positions.get(&key).copied()
        }
        fn valid(&self, key: PlayerId) -> bool {
            self.positions.contains_key(&key)
        }
        fn ready(&self, key: PlayerId) -> bool {
            !self.not_ready.contains(&key)
        }
    }

    fn players(entries: &[(u64, Vec2)]) -> Players {
        Players {
            positions: entries.iter().map(|(id, p)| (PlayerId(*id), *p)).collect(),
            not_ready: Vec::new(),
        }
    }

    fn chaser_with(players: &Players) -> Chaser {
        let mut c = Chaser::new(ChaserConfig::default());
        for id in players.positions.keys() {
            c.add_target(*id);
        }
        c
    }

    const DT: Duration = Duration::from_millis(100);

    #[test]
    fn test_approaches_closest_player() {
        let map = players(&[(1, Vec2::new(10.0, 0.0)), (2, Vec2::new(4.0, 0.0))]);
        let mut c = chaser_with(&map);

        match c.tick(DT, Vec2::ZERO, &map) {
            ChaseAction::Approach { toward, .. } => assert_eq!(toward, Vec2::new(4.0, 0.0)),
            other => panic!("expected approach, got {other:?}"),
        }
        assert_eq!(c.current_target(), Some(PlayerId(2)));
    }

    #[test]
    fn test_strikes_in_range_on_cooldown() {
        let map = players(&[(1, Vec2::new(1.0, 0.0))]);
        let mut c = chaser_with(&map);

        match c.tick(DT, Vec2::ZERO, &map) {
            ChaseAction::Strike { target, damage } => {
                assert_eq!(target, PlayerId(1));
                assert_eq!(damage, 10.0);
            }
            other => panic!("expected strike, got {other:?}"),
        }

        // Cooldown not yet elapsed: hold.
        assert_eq!(c.tick(DT, Vec2::ZERO, &map), ChaseAction::Hold);

        // After the cooldown: strike again.
        assert!(matches!(
            c.tick(Duration::from_secs(1), Vec2::ZERO, &map),
            ChaseAction::Strike { .. }
        ));
    }

    #[test]
    fn test_skips_not_ready_players() {
        let mut map = players(&[(1, Vec2::new(1.0, 0.0)), (2, Vec2::new(6.0, 0.0))]);
        map.not_ready.push(PlayerId(1));
        let mut c = chaser_with(&map);

        match c.tick(DT, Vec2::ZERO, &map) {
            ChaseAction::Approach { toward, .. } => assert_eq!(toward, Vec2::new(6.0, 0.0)),
            other => panic!("expected approach to the ready player, got {other:?}"),
        }
    }

    #[test]
    fn test_holds_with_no_targets() {
        let map = players(&[]);
        let mut c = Chaser::new(ChaserConfig::default());
        assert_eq!(c.tick(DT, Vec2::ZERO, &map), ChaseAction::Hold);
    }

    #[test]
    fn test_removed_target_clears_current() {
        let map = players(&[(1, Vec2::new(5.0, 0.0))]);
        let mut c = chaser_with(&map);
        c.tick(DT, Vec2::ZERO, &map);
        assert_eq!(c.current_target(), Some(PlayerId(1)));

        c.remove_target(PlayerId(1));
        assert_eq!(c.current_target(), None);
    }

    #[test]
    fn test_reset_clears_transient_state() {
        let map = players(&[(1, Vec2::new(5.0, 0.0))]);
        let mut c = chaser_with(&map);
        c.tick(DT, Vec2::ZERO, &map);
        c.reset();
        assert_eq!(c.current_target(), None);
        assert_eq!(c.tick(DT, Vec2::ZERO, &map), ChaseAction::Hold);
    }
}
