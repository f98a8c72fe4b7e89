//! The room director: deck lifecycle, transitions, and win detection.

use ashgate_defs::{PlayerId, RoomDef, RoomKind, Side, Vec2};
use ashgate_pipeline::{CancelToken, SetupContext, SetupError, SetupStage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{DeckEntry, build_deck};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for the room director.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomDirectorConfig {
    /// Deck size for the session.
    pub room_count: usize,
    /// Lateral offset for the second player when a room registered only
    /// one spawn anchor.
    pub coop_separation: f32,
    /// Next-room options offered after a cleared wave.
    pub max_choices: usize,
}

impl Default for RoomDirectorConfig {
    fn default() -> Self {
        Self { room_count: 10, coop_separation: 1.5, max_choices: 3 }
    }
}

// ---------------------------------------------------------------------------
// State machine & events
// ---------------------------------------------------------------------------

/// Lifecycle of the director as a whole.
///
/// ```text
/// Idle → AwaitingPlay → Entering → RoomActive → ChoosingNext
///                           ↑__________________________|        → Won
/// ```
///
/// `Entering` is the one-tick settle suspension between activating a room
/// and declaring it live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorState {
    Idle,
    AwaitingPlay,
    Entering,
    RoomActive,
    ChoosingNext,
    Won,
}

impl DirectorState {
    /// Whether a run is in progress (a room entered, session not won).
    pub fn in_run(&self) -> bool {
        matches!(
            self,
            DirectorState::Entering | DirectorState::RoomActive | DirectorState::ChoosingNext
        )
    }
}

impl std::fmt::Display for DirectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectorState::Idle => write!(f, "idle"),
            DirectorState::AwaitingPlay => write!(f, "awaiting-play"),
            DirectorState::Entering => write!(f, "entering"),
            DirectorState::RoomActive => write!(f, "room-active"),
            DirectorState::ChoosingNext => write!(f, "choosing-next"),
            DirectorState::Won => write!(f, "won"),
        }
    }
}

/// One entry on the next-room menu, bound to a door of the active room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomChoice {
    /// Menu index the input layer passes back.
    pub index: usize,
    /// Deck index of the offered entry.
    pub entry: usize,
    /// Door side this choice is presented on.
    pub door: Side,
    pub kind: RoomKind,
    pub name: String,
}

/// Notifications fired by the room director.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// A room became active. Placements relocate the registered players
    /// onto the room's spawn anchors; the wave should start now.
    Entered {
        entry: usize,
        kind: RoomKind,
        name: String,
        difficulty: u32,
        placements: Vec<(PlayerId, Vec2)>,
    },
    /// The one-tick settle after activation elapsed.
    Live { entry: usize },
    /// The cleared wave produced a next-room menu.
    ChoicesOffered { choices: Vec<RoomChoice> },
    /// No unused rooms remain: terminal win.
    Won,
}

// ---------------------------------------------------------------------------
// Director
// ---------------------------------------------------------------------------

/// Owns the deck and the active-room pointer.
///
/// Single-owner by design: the session constructs one director and every
/// transition goes through it, so the active pointer is reassigned only
/// between ticks.
#[derive(Debug)]
pub struct RoomDirector {
    config: RoomDirectorConfig,
    state: DirectorState,
    deck: Vec<DeckEntry>,
    active: Option<usize>,
    /// Deck indices currently on the next-room menu.
    options: Vec<usize>,
    /// Side the players entered the active room from; its door is
    /// excluded from outgoing options to prevent trivial backtracking.
    entered_from: Option<Side>,
    /// Count of rooms entered so far; doubles as the difficulty level.
    /// Starts at -1 so the starter room is difficulty 0.
    rooms_entered: i32,
}

impl RoomDirector {
    pub fn new(config: RoomDirectorConfig) -> Self {
        Self {
            config,
            state: DirectorState::Idle,
            deck: Vec::new(),
            active: None,
            options: Vec::new(),
            entered_from: None,
            rooms_entered: -1,
        }
    }

    /// Play signal: enter the starter room (first unused entry when the
    /// deck holds no starter).
    pub fn begin(&mut self, players: &[PlayerId]) -> Vec<RoomEvent> {
        if self.state != DirectorState::AwaitingPlay {
            warn!(state = %self.state, "begin ignored outside awaiting-play");
            return Vec::new();
        }
        let starter = self
            .deck
            .iter()
            .position(|e| !e.used && e.def.kind == RoomKind::Starter)
            .or_else(|| self.deck.iter().position(|e| !e.used));
        match starter {
            Some(index) => self.enter_internal(index, players),
            None => {
                warn!("deck has no unused entries to begin with");
                Vec::new()
            }
        }
    }

    /// Resolves the one-tick settle suspension after a room activates.
    pub fn tick(&mut self) -> Vec<RoomEvent> {
        if self.state != DirectorState::Entering {
            return Vec::new();
        }
        self.state = DirectorState::RoomActive;
        let entry = self.active.expect("entering implies an active entry");
        debug!(entry, "room live");
        vec![RoomEvent::Live { entry }]
    }

    /// Wave-cleared notification: sample the next-room menu, or win.
    pub fn on_wave_cleared(&mut self, rng: &mut impl Rng) -> Vec<RoomEvent> {
        if self.state != DirectorState::RoomActive {
            warn!(state = %self.state, "wave-cleared ignored outside room-active");
            return Vec::new();
        }

        let mut candidates: Vec<usize> = (0..self.deck.len())
            .filter(|i| !self.deck[*i].used && Some(*i) != self.active)
            .collect();
        candidates.shuffle(rng);
        candidates.truncate(self.config.max_choices);

        if candidates.is_empty() {
            info!("deck exhausted, session won");
            self.state = DirectorState::Won;
            return vec![RoomEvent::Won];
        }

        let doors = self.usable_doors();
        if doors.is_empty() {
            warn!("active room has no doors to present choices on");
        }
        let choices: Vec<RoomChoice> = candidates
            .iter()
            .zip(doors.iter())
            .enumerate()
            .map(|(index, (&entry, &door))| RoomChoice {
                index,
                entry,
                door,
                kind: self.deck[entry].def.kind,
                name: self.deck[entry].def.name.clone(),
            })
            .collect();

        if choices.is_empty() {
            // No door to hang a menu on; treat like exhaustion rather
            // than soft-locking the run.
            warn!("no presentable choices, declaring the session won");
            self.state = DirectorState::Won;
            return vec![RoomEvent::Won];
        }

        self.options = choices.iter().map(|c| c.entry).collect();
        self.state = DirectorState::ChoosingNext;
        vec![RoomEvent::ChoicesOffered { choices }]
    }

    /// Player-triggered transition through a door.
    ///
    /// `choice` is the menu index; an out-of-range index degrades to the
    /// first offered option. `exited_through` is the door side the
    /// players used — the next room's reciprocal entry side is excluded
    /// from its own outgoing options.
    pub fn enter_choice(
        &mut self,
        choice: usize,
        exited_through: Side,
        players: &[PlayerId],
    ) -> Vec<RoomEvent> {
        if self.state != DirectorState::ChoosingNext {
            warn!(state = %self.state, "transition ignored outside choosing-next");
            return Vec::new();
        }
        let entry = match self.options.get(choice) {
            Some(entry) => *entry,
            None => {
                warn!(
                    requested = choice,
                    available = self.options.len(),
                    "choice out of range, falling back to the first option"
                );
                match self.options.first() {
                    Some(entry) => *entry,
                    None => return Vec::new(),
                }
            }
        };
        self.entered_from = Some(exited_through.opposite());
        self.enter_internal(entry, players)
    }

    pub fn state(&self) -> DirectorState {
        self.state
    }

    /// Definition of the active room.
    pub fn active_def(&self) -> Option<&RoomDef> {
        self.active.map(|i| &self.deck[i].def)
    }

    /// Enemy spawn anchors of the active instance (deduplicated at
    /// instantiation).
    pub fn active_enemy_spawns(&self) -> &[Vec2] {
        self.active
            .and_then(|i| self.deck[i].instance.as_ref())
            .map(|inst| inst.enemy_spawns.as_slice())
            .unwrap_or(&[])
    }

    /// Origin of the active instance — the spawn fallback point.
    pub fn active_origin(&self) -> Vec2 {
        self.active
            .and_then(|i| self.deck[i].instance.as_ref())
            .map(|inst| inst.origin)
            .unwrap_or(Vec2::ZERO)
    }

    /// Current difficulty: rooms entered so far, starter = 0.
    pub fn difficulty(&self) -> u32 {
        self.rooms_entered.max(0) as u32
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn unused_count(&self) -> usize {
        self.deck.iter().filter(|e| !e.used).count()
    }

    // ---------------- Internals ----------------

    fn enter_internal(&mut self, index: usize, players: &[PlayerId]) -> Vec<RoomEvent> {
        // Destroy the previous active instance first. This ordering is
        // intentional: a cancelled entry leaves the previous room already
        // gone.
        if let Some(prev) = self.active.take() {
            let entry = &mut self.deck[prev];
            entry.used = true;
            entry.instance = None;
            debug!(entry = prev, name = %entry.def.name, "previous room destroyed");
        }

        self.active = Some(index);
        let instance_exists = match self.deck[index].instance.as_mut() {
            Some(instance) => {
                instance.activate();
                true
            }
            None => false,
        };
        if !instance_exists {
            warn!(entry = index, "entering a room whose instance is gone");
        }

        let placements = self.placements(players);
        self.rooms_entered += 1;
        self.state = DirectorState::Entering;
        self.options.clear();

        let def = &self.deck[index].def;
        info!(
            entry = index,
            name = %def.name,
            kind = %def.kind,
            difficulty = self.difficulty(),
            "room entered"
        );
        vec![RoomEvent::Entered {
            entry: index,
            kind: def.kind,
            name: def.name.clone(),
            difficulty: self.difficulty(),
            placements,
        }]
    }

    /// Spawn placements for the registered players: dedicated anchors in
    /// order, then the first anchor with a lateral offset, then the room
    /// origin with the same offset.
    fn placements(&self, players: &[PlayerId]) -> Vec<(PlayerId, Vec2)> {
        let Some(instance) = self.active.and_then(|i| self.deck[i].instance.as_ref()) else {
            return players.iter().map(|p| (*p, Vec2::ZERO)).collect();
        };
        let offset = Vec2::new(self.config.coop_separation, 0.0);
        players
            .iter()
            .enumerate()
            .map(|(i, player)| {
                let pos = match instance.player_spawns.get(i) {
                    Some(anchor) => *anchor,
                    None => {
                        let base =
                            instance.player_spawns.first().copied().unwrap_or(instance.origin);
                        base + offset * i as f32
                    }
                };
                (*player, pos)
            })
            .collect()
    }

    /// Doors of the active room minus the reciprocal of the side the
    /// players came in through.
    fn usable_doors(&self) -> Vec<Side> {
        let Some(instance) = self.active.and_then(|i| self.deck[i].instance.as_ref()) else {
            return Vec::new();
        };
        instance
            .doors
            .iter()
            .copied()
            .filter(|door| Some(*door) != self.entered_from)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Setup stage
// ---------------------------------------------------------------------------

impl SetupStage for RoomDirector {
    fn name(&self) -> &'static str {
        "room-deck"
    }

    /// Builds the deck and pre-instantiates every entry disabled, one
    /// scheduling yield per entry.
    async fn setup(
        &mut self,
        ctx: &SetupContext,
        cancel: &CancelToken,
    ) -> Result<(), SetupError> {
        let mut rng = StdRng::seed_from_u64(ctx.seed);
        let defs = build_deck(&ctx.catalog.rooms, self.config.room_count, &mut rng)
            .map_err(|e| SetupError::stage("room-deck", e))?;

        for def in defs {
            if cancel.is_cancelled() {
                debug!(built = self.deck.len(), "deck instantiation cancelled");
                return Err(SetupError::Cancelled);
            }
            self.deck.push(DeckEntry::new(def));
            tokio::task::yield_now().await;
        }

        info!(size = self.deck.len(), "room deck ready");
        self.state = DirectorState::AwaitingPlay;
        Ok(())
    }
}
