//! Race-condition-safe detection of an all-players-downed team wipe.

use std::collections::HashMap;

use ashgate_defs::PlayerId;
use tracing::{debug, info};

use crate::LifeState;

/// Observes every player's life state and fires the terminal wipe event
/// when all of them are simultaneously downed.
///
/// The watcher keeps an incremental alive count fed by state-changed
/// events. When the count reaches zero it *arms* a confirmation instead of
/// firing immediately; [`confirm_tick`](TeamWipeWatcher::confirm_tick) —
/// called once at the top of the next simulation tick — re-verifies that
/// every tracked player is still downed before firing. A player revived in
/// the same tick another went down therefore never produces a false wipe.
#[derive(Debug, Default)]
pub struct TeamWipeWatcher {
    states: HashMap<PlayerId, LifeState>,
    alive: usize,
    confirm_armed: bool,
    fired: bool,
}

impl TeamWipeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a player. Registering an already-tracked player is
    /// a no-op.
    pub fn register(&mut self, player: PlayerId, state: LifeState) {
        if self.states.contains_key(&player) {
            return;
        }
        if state == LifeState::Alive {
            self.alive += 1;
        }
        self.states.insert(player, state);
        debug!(%player, alive = self.alive, "team watcher registered player");
    }

    /// Stops tracking a player (leaving mid-run) and re-checks the wipe
    /// condition against the remaining team.
    pub fn unregister(&mut self, player: PlayerId) {
        let Some(state) = self.states.remove(&player) else {
            return;
        };
        if state == LifeState::Alive {
            self.alive = self.alive.saturating_sub(1);
        }
        debug!(%player, alive = self.alive, "team watcher unregistered player");
        if self.alive == 0 && !self.states.is_empty() {
            self.arm();
        }
    }

    /// Feeds one life-state transition into the count.
    pub fn on_state_changed(&mut self, player: PlayerId, prev: LifeState, next: LifeState) {
        let Some(tracked) = self.states.get_mut(&player) else {
            return;
        };
        *tracked = next;

        match (prev, next) {
            (LifeState::Alive, LifeState::Downed) => self.alive = self.alive.saturating_sub(1),
            (LifeState::Downed, LifeState::Alive) => self.alive += 1,
            _ => {}
        }

        if self.alive == 0 {
            self.arm();
        } else {
            self.disarm();
        }
    }

    /// Runs the deferred confirmation. Call exactly once at the top of
    /// each simulation tick; returns `true` the one time the wipe is
    /// confirmed.
    pub fn confirm_tick(&mut self) -> bool {
        if !self.confirm_armed {
            return false;
        }
        self.confirm_armed = false;

        let all_downed = !self.states.is_empty()
            && self.states.values().all(|s| *s == LifeState::Downed);
        if all_downed && !self.fired {
            self.fired = true;
            info!(players = self.states.len(), "team wipe confirmed");
            return true;
        }
        false
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    pub fn tracked_count(&self) -> usize {
        self.states.len()
    }

    fn arm(&mut self) {
        if !self.confirm_armed && !self.fired {
            self.confirm_armed = true;
            debug!("team wipe confirmation armed");
        }
    }

    fn disarm(&mut self) {
        self.confirm_armed = false;
    }
}
