//! The player life-state machine: `Alive ⇄ Downed` with auto-revive.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Life state of a player-controlled entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Downed,
}

impl std::fmt::Display for LifeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifeState::Alive => write!(f, "alive"),
            LifeState::Downed => write!(f, "downed"),
        }
    }
}

/// Settings for the revive state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReviveConfig {
    /// How long a downed player waits before being forced back up.
    pub auto_revive: Duration,
}

impl Default for ReviveConfig {
    fn default() -> Self {
        Self { auto_revive: Duration::from_secs(60) }
    }
}

/// Events emitted by life-state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEvent {
    StateChanged { prev: LifeState, next: LifeState },
}

/// Tracks one player's `Alive ⇄ Downed` state and the auto-revive
/// countdown.
///
/// Every transition cancels a pending countdown. The owning session is
/// expected to fully heal and re-enable movement when it routes a
/// `Downed → Alive` transition.
#[derive(Debug, Clone)]
pub struct Revive {
    state: LifeState,
    auto_revive: Duration,
    /// Remaining countdown while downed.
    countdown: Option<Duration>,
}

impl Revive {
    pub fn new(config: ReviveConfig) -> Self {
        Self {
            state: LifeState::Alive,
            auto_revive: config.auto_revive,
            countdown: None,
        }
    }

    /// Enters `Downed` and starts the auto-revive countdown. Idempotent
    /// when already downed.
    pub fn down(&mut self) -> Vec<LifeEvent> {
        if self.state == LifeState::Downed {
            return Vec::new();
        }
        self.countdown = Some(self.auto_revive);
        self.transition(LifeState::Downed)
    }

    /// Returns to `Alive`, cancelling any pending countdown. Idempotent
    /// when already alive.
    pub fn revive(&mut self) -> Vec<LifeEvent> {
        if self.state == LifeState::Alive {
            return Vec::new();
        }
        self.countdown = None;
        self.transition(LifeState::Alive)
    }

    /// Advances the countdown. Elapsing while still downed forces the
    /// transition back to `Alive`.
    pub fn tick(&mut self, dt: Duration) -> Vec<LifeEvent> {
        if self.state != LifeState::Downed {
            return Vec::new();
        }
        let Some(left) = self.countdown else {
            return Vec::new();
        };
        let left = left.saturating_sub(dt);
        if left.is_zero() {
            return self.revive();
        }
        self.countdown = Some(left);
        Vec::new()
    }

    pub fn state(&self) -> LifeState {
        self.state
    }

    /// Countdown progress in `0.0..=1.0` while downed, for the revive
    /// bar. `None` while alive.
    pub fn revive_progress(&self) -> Option<f32> {
        let left = self.countdown?;
        if self.auto_revive.is_zero() {
            return Some(1.0);
        }
        Some(1.0 - (left.as_secs_f32() / self.auto_revive.as_secs_f32()).clamp(0.0, 1.0))
    }

    /// Shortens the auto-revive duration (an upgrade), floored at zero.
    pub fn decrease_auto_revive(&mut self, amount: Duration) {
        self.auto_revive = self.auto_revive.saturating_sub(amount);
    }

    fn transition(&mut self, next: LifeState) -> Vec<LifeEvent> {
        let prev = self.state;
        self.state = next;
        vec![LifeEvent::StateChanged { prev, next }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revive(secs: u64) -> Revive {
        Revive::new(ReviveConfig { auto_revive: Duration::from_secs(secs) })
    }

    #[test]
    fn test_down_emits_transition_once() {
        let mut r = revive(10);
        let events = r.down();
        assert_eq!(
            events,
            vec![LifeEvent::StateChanged { prev: LifeState::Alive, next: LifeState::Downed }]
        );
        assert!(r.down().is_empty(), "already downed is a no-op");
    }

    #[test]
    fn test_countdown_elapse_forces_alive() {
        let mut r = revive(10);
        r.down();

        assert!(r.tick(Duration::from_secs(9)).is_empty());
        assert_eq!(r.state(), LifeState::Downed);

        let events = r.tick(Duration::from_secs(1));
        assert_eq!(
            events,
            vec![LifeEvent::StateChanged { prev: LifeState::Downed, next: LifeState::Alive }]
        );
    }

    #[test]
    fn test_early_revive_cancels_countdown() {
        let mut r = revive(10);
        r.down();
        r.revive();
        assert_eq!(r.state(), LifeState::Alive);

        // No residual transition from the cancelled countdown.
        assert!(r.tick(Duration::from_secs(60)).is_empty());
        assert_eq!(r.state(), LifeState::Alive);
    }

    #[test]
    fn test_revive_when_alive_is_noop() {
        let mut r = revive(10);
        assert!(r.revive().is_empty());
    }

    #[test]
    fn test_progress_runs_zero_to_one() {
        let mut r = revive(10);
        assert_eq!(r.revive_progress(), None);
        r.down();
        assert_eq!(r.revive_progress(), Some(0.0));
        r.tick(Duration::from_secs(5));
        let p = r.revive_progress().unwrap();
        assert!((p - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_decrease_auto_revive_floors_at_zero() {
        let mut r = revive(10);
        r.decrease_auto_revive(Duration::from_secs(60));
        r.down();
        // Zero countdown: first tick forces the revive.
        let events = r.tick(Duration::from_millis(1));
        assert!(!events.is_empty());
        assert_eq!(r.state(), LifeState::Alive);
    }
}
