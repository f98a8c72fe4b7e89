//! The wave director state machine.

use std::time::Duration;

use ashgate_defs::{Catalog, EnemyKindId, RoomDef, ScaledStats, Vec2};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::WavePlan;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Pacing settings for a wave.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay between the start notification and the first spawn, giving a
    /// late-joining cooperator time to arrive.
    pub start_grace: Duration,
    /// Interval between the first few spawns.
    pub initial_interval: Duration,
    /// Interval between the last few spawns (faster = smaller).
    pub final_interval: Duration,
    /// Shuffle the whole plan instead of spawning in quota order.
    pub randomize_order: bool,
    /// Divide the inter-spawn interval by the alive-player count (floored
    /// at one) and scale enemy stats by it. Intentional co-op scaling —
    /// a tunable, not a hidden constant.
    pub scale_with_players: bool,
    /// Linear stat-multiplier step per difficulty level:
    /// `mult = 1 + step * difficulty`.
    pub difficulty_step: f32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            start_grace: Duration::from_secs(5),
            initial_interval: Duration::from_secs(2),
            final_interval: Duration::from_millis(500),
            randomize_order: false,
            scale_with_players: true,
            difficulty_step: 0.25,
        }
    }
}

impl PacingConfig {
    /// Clamps inconsistent values so pacing stays monotonically
    /// non-increasing across the wave.
    pub fn validated(mut self) -> Self {
        if self.final_interval > self.initial_interval {
            warn!(
                initial_ms = self.initial_interval.as_millis(),
                final_ms = self.final_interval.as_millis(),
                "final_interval exceeds initial_interval, clamping"
            );
            self.final_interval = self.initial_interval;
        }
        if self.difficulty_step < 0.0 {
            self.difficulty_step = 0.0;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Phase & events
// ---------------------------------------------------------------------------

/// Lifecycle of one wave.
///
/// ```text
/// Idle → Spawning → Draining → Cleared
/// ```
///
/// `Spawning` covers the grace delay and the paced spawn sequence;
/// `Draining` waits for the alive counter to reach zero. `stop` returns to
/// `Idle` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    Idle,
    Spawning,
    Draining,
    Cleared,
}

impl WavePhase {
    /// Whether a wave is currently in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, WavePhase::Spawning | WavePhase::Draining)
    }
}

impl std::fmt::Display for WavePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WavePhase::Idle => write!(f, "idle"),
            WavePhase::Spawning => write!(f, "spawning"),
            WavePhase::Draining => write!(f, "draining"),
            WavePhase::Cleared => write!(f, "cleared"),
        }
    }
}

/// Notifications fired by the wave director.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveEvent {
    Started { total: u32 },
    /// One plan entry spawned. `index` counts from 1 to `total`.
    Spawned { kind: EnemyKindId, index: u32, total: u32 },
    Cleared,
}

/// One spawn for the session to realize: check an instance out of the
/// pool, apply the stats, place it at the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrder {
    pub kind: EnemyKindId,
    pub stats: ScaledStats,
    pub at: Vec2,
}

// ---------------------------------------------------------------------------
// Director
// ---------------------------------------------------------------------------

/// Paces enemy spawns for the active room and detects wave completion.
#[derive(Debug)]
pub struct WaveDirector {
    config: PacingConfig,
    phase: WavePhase,
    plan: WavePlan,
    cursor: usize,
    spawned: u32,
    alive: u32,
    grace_left: Duration,
    next_spawn_in: Duration,
    spawn_points: Vec<Vec2>,
    fallback_point: Vec2,
    difficulty: u32,
}

impl WaveDirector {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config: config.validated(),
            phase: WavePhase::Idle,
            plan: WavePlan::default(),
            cursor: 0,
            spawned: 0,
            alive: 0,
            grace_left: Duration::ZERO,
            next_spawn_in: Duration::ZERO,
            spawn_points: Vec::new(),
            fallback_point: Vec2::ZERO,
            difficulty: 0,
        }
    }

    /// Starts spawning for a room, cancelling any in-flight wave first.
    ///
    /// `spawn_points` are the room's registered anchors (deduplicated
    /// here); `fallback` is used — with a warning — when the room
    /// registered none. An empty plan clears immediately: the start and
    /// cleared notifications fire back-to-back with no spawns.
    pub fn start(
        &mut self,
        room: &RoomDef,
        difficulty: u32,
        spawn_points: &[Vec2],
        fallback: Vec2,
        rng: &mut impl Rng,
    ) -> Vec<WaveEvent> {
        self.stop();

        let mut plan = WavePlan::from_quotas(&room.quotas);
        if self.config.randomize_order {
            plan = plan.shuffled(rng);
        }

        let mut points: Vec<Vec2> = Vec::with_capacity(spawn_points.len());
        for p in spawn_points {
            if !points.contains(p) {
                points.push(*p);
            }
        }

        let total = plan.len() as u32;
        if total == 0 {
            // Empty-room fast path.
            info!(room = %room.name, "wave has no enemies, clearing immediately");
            self.phase = WavePhase::Cleared;
            return vec![WaveEvent::Started { total: 0 }, WaveEvent::Cleared];
        }

        if points.is_empty() {
            warn!(room = %room.name, "no spawn points registered, using fallback point");
        }

        self.plan = plan;
        self.spawn_points = points;
        self.fallback_point = fallback;
        self.difficulty = difficulty;
        self.phase = WavePhase::Spawning;
        self.grace_left = self.config.start_grace;
        self.next_spawn_in = Duration::ZERO;

        info!(room = %room.name, total, difficulty, "wave started");
        vec![WaveEvent::Started { total }]
    }

    /// Cancels an in-flight spawn sequence and returns to `Idle`.
    ///
    /// Safe to call with no active wave. Enemies already spawned stay
    /// alive — only the remaining plan is abandoned.
    pub fn stop(&mut self) {
        if self.phase.is_active() {
            debug!(
                spawned = self.spawned,
                remaining = self.plan.len() - self.cursor,
                "wave stopped mid-flight"
            );
        }
        self.phase = WavePhase::Idle;
        self.plan = WavePlan::default();
        self.cursor = 0;
        self.spawned = 0;
        self.alive = 0;
        self.grace_left = Duration::ZERO;
        self.next_spawn_in = Duration::ZERO;
        self.spawn_points.clear();
    }

    /// Advances the wave by one simulation tick.
    ///
    /// Returns the notifications fired plus the spawn orders for the
    /// session to realize this tick.
    pub fn advance(
        &mut self,
        dt: Duration,
        alive_players: u32,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> (Vec<WaveEvent>, Vec<SpawnOrder>) {
        let mut events = Vec::new();
        let mut orders = Vec::new();

        match self.phase {
            WavePhase::Spawning => {
                if !self.grace_left.is_zero() {
                    self.grace_left = self.grace_left.saturating_sub(dt);
                    return (events, orders);
                }

                let mut budget = dt;
                loop {
                    if self.next_spawn_in > budget {
                        self.next_spawn_in -= budget;
                        break;
                    }
                    budget -= self.next_spawn_in;
                    self.next_spawn_in = Duration::ZERO;

                    let Some(kind) = self.plan.get(self.cursor) else {
                        break;
                    };
                    self.cursor += 1;
                    self.spawn_one(kind, alive_players, catalog, rng, &mut events, &mut orders);

                    if self.cursor >= self.plan.len() {
                        debug!(total = self.spawned, "plan exhausted, draining");
                        self.phase = WavePhase::Draining;
                        break;
                    }

                    let delay = self.inter_spawn_delay(alive_players);
                    if delay.is_zero() {
                        // Zero interval still yields one tick per spawn.
                        break;
                    }
                    self.next_spawn_in = delay;
                }

                if self.phase == WavePhase::Draining && self.alive == 0 {
                    events.extend(self.clear());
                }
            }
            WavePhase::Draining => {
                if self.alive == 0 {
                    events.extend(self.clear());
                }
            }
            WavePhase::Idle | WavePhase::Cleared => {}
        }

        (events, orders)
    }

    /// One-shot death observer feedback: an enemy spawned by this wave
    /// died.
    pub fn note_enemy_died(&mut self) -> Vec<WaveEvent> {
        self.alive = self.alive.saturating_sub(1);
        if self.phase == WavePhase::Draining && self.alive == 0 {
            return self.clear();
        }
        Vec::new()
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn alive(&self) -> u32 {
        self.alive
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn total(&self) -> u32 {
        self.plan.len() as u32
    }

    // ---------------- Internals ----------------

    fn spawn_one(
        &mut self,
        kind: EnemyKindId,
        alive_players: u32,
        catalog: &Catalog,
        rng: &mut impl Rng,
        events: &mut Vec<WaveEvent>,
        orders: &mut Vec<SpawnOrder>,
    ) {
        let Some(def) = catalog.enemy(kind) else {
            // Validation should have caught this; degrade by skipping the
            // entry.
            warn!(%kind, "no definition for planned enemy kind, skipping spawn");
            return;
        };

        let at = self
            .spawn_points
            .choose(rng)
            .copied()
            .unwrap_or(self.fallback_point);

        let effective = if self.config.scale_with_players {
            self.difficulty * alive_players.max(1)
        } else {
            self.difficulty
        };
        let stats = def.scaled(effective, self.config.difficulty_step);

        self.alive += 1;
        self.spawned += 1;
        events.push(WaveEvent::Spawned {
            kind,
            index: self.spawned,
            total: self.plan.len() as u32,
        });
        orders.push(SpawnOrder { kind, stats, at });
    }

    /// Interval before the next spawn: lerp from initial to final across
    /// spawn progress, divided by the alive-player count.
    fn inter_spawn_delay(&self, alive_players: u32) -> Duration {
        let total = self.plan.len();
        let t = if total > 1 {
            self.spawned as f32 / total as f32
        } else {
            1.0
        };
        let initial = self.config.initial_interval.as_secs_f32();
        let final_ = self.config.final_interval.as_secs_f32();
        let mut delay = initial + (final_ - initial) * t.clamp(0.0, 1.0);
        if self.config.scale_with_players {
            delay /= alive_players.max(1) as f32;
        }
        Duration::from_secs_f32(delay.max(0.0))
    }

    fn clear(&mut self) -> Vec<WaveEvent> {
        self.phase = WavePhase::Cleared;
        info!(total = self.spawned, "wave cleared");
        vec![WaveEvent::Cleared]
    }
}
