//! The session: single owner of every subsystem, advanced by the tick.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ashgate_combat::{
    AutoShooter, ChaseAction, Health, HealthConfig, HealthEvent, LifeEvent,
    LifeState, Revive, ReviveConfig, ShooterConfig, TeamWipeWatcher,
};
use ashgate_defs::{Catalog, EnemyId, PlayerId, Pose, Side};
use ashgate_pipeline::{CancelToken, SetupContext, SetupError, SetupStage};
use ashgate_pool::PoolConfig;
use ashgate_room::{DirectorState, RoomDirector, RoomDirectorConfig, RoomEvent};
use ashgate_tick::ClockConfig;
use ashgate_wave::{PacingConfig, SpawnOrder, WaveDirector, WaveEvent, WavePhase};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::enemy::{Enemy, EnemyPools};
use crate::events::SessionEvent;
use crate::player::{EnemyView, PlayerActor, PlayerView};
use crate::progress::LevelTrack;
use crate::upgrade::Upgrade;
use crate::AshgateError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for a whole session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Seed for every random decision in the session (deck sampling,
    /// wave shuffles, spawn points). `None` draws one at construction.
    pub seed: Option<u64>,
    pub tick: ClockConfig,
    pub pacing: PacingConfig,
    pub rooms: RoomDirectorConfig,
    /// Pool settings applied to every enemy kind from the catalog.
    pub enemy_pool: PoolConfig,
    pub player_health: HealthConfig,
    pub revive: ReviveConfig,
    pub shooter: ShooterConfig,
    pub max_players: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick: ClockConfig::default(),
            pacing: PacingConfig::default(),
            rooms: RoomDirectorConfig::default(),
            enemy_pool: PoolConfig::default(),
            player_health: HealthConfig {
                max_hp: 100.0,
                regen_per_sec: 1.0,
                regen_delay: Duration::from_secs(1),
            },
            revive: ReviveConfig::default(),
            shooter: ShooterConfig::default(),
            max_players: 2,
        }
    }
}

/// Lifecycle of the session as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// The setup pipeline has not finished yet.
    Setup,
    /// Every stage completed; waiting for the play signal.
    Ready,
    /// A run is in progress.
    Playing,
    /// Terminal: the deck was exhausted.
    Won,
    /// Terminal: all players were simultaneously downed.
    Wiped,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Setup => write!(f, "setup"),
            SessionPhase::Ready => write!(f, "ready"),
            SessionPhase::Playing => write!(f, "playing"),
            SessionPhase::Won => write!(f, "won"),
            SessionPhase::Wiped => write!(f, "wiped"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Point-in-time view of one player for queries and UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub life: LifeState,
    pub hp: f32,
    pub max_hp: f32,
    pub ready: bool,
}

/// Point-in-time view of the whole session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub director: DirectorState,
    pub wave: WavePhase,
    pub difficulty: u32,
    pub enemies_alive: u32,
    pub level: u32,
    pub kills: u32,
    pub kill_total: u32,
    pub players: Vec<PlayerSnapshot>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The session-context object: constructed once at startup and the sole
/// owner of every subsystem. There are no globals — anything that needs
/// the pool, the directors or the player registry reaches them through
/// this value.
pub struct Session {
    config: SessionConfig,
    catalog: Arc<Catalog>,
    seed: u64,
    rng: StdRng,
    phase: SessionPhase,

    pools: EnemyPools,
    rooms: RoomDirector,
    wave: WaveDirector,
    watcher: TeamWipeWatcher,
    level: LevelTrack,

    players: BTreeMap<PlayerId, PlayerActor>,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_player_id: u64,
    next_enemy_id: u64,

    /// Events produced since the last drain, in emission order.
    events: Vec<SessionEvent>,
}

impl Session {
    /// Validates the catalog and builds the (un-initialized) session.
    pub fn new(config: SessionConfig, catalog: Catalog) -> Result<Self, AshgateError> {
        catalog.validate()?;
        let catalog = Arc::new(catalog);
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "session created");

        Ok(Self {
            config,
            pools: EnemyPools::new(Arc::clone(&catalog), config.enemy_pool),
            rooms: RoomDirector::new(config.rooms),
            wave: WaveDirector::new(config.pacing),
            watcher: TeamWipeWatcher::new(),
            level: LevelTrack::new(),
            catalog,
            seed,
            rng: StdRng::seed_from_u64(seed),
            phase: SessionPhase::Setup,
            players: BTreeMap::new(),
            enemies: BTreeMap::new(),
            next_player_id: 1,
            next_enemy_id: 1,
            events: Vec::new(),
        })
    }

    /// Runs the setup pipeline: enemy pools (prewarm), then the room
    /// deck. Each stage is awaited to completion before the next starts;
    /// cancellation unwinds at the stage's next yield point. Completion
    /// fires [`SessionEvent::Ready`].
    pub async fn initialize(&mut self, cancel: &CancelToken) -> Result<(), SetupError> {
        if self.phase != SessionPhase::Setup {
            debug!(phase = %self.phase, "initialize called twice, ignoring");
            return Ok(());
        }
        let ctx = SetupContext {
            catalog: Arc::clone(&self.catalog),
            seed: self.seed,
        };

        info!(stage = self.pools.name(), "setup stage starting");
        self.pools.setup(&ctx, cancel).await?;
        info!(stage = self.rooms.name(), "setup stage starting");
        self.rooms.setup(&ctx, cancel).await?;

        self.phase = SessionPhase::Ready;
        self.events.push(SessionEvent::Ready);
        info!("setup pipeline complete");
        Ok(())
    }

    /// The play signal: gameplay begins and the room director enters the
    /// starter room. Ignored (with a warning) before the pipeline is
    /// done.
    pub fn play(&mut self) {
        if self.phase != SessionPhase::Ready {
            warn!(phase = %self.phase, "play ignored");
            return;
        }
        self.phase = SessionPhase::Playing;
        self.events.push(SessionEvent::Playing);
        info!(players = self.players.len(), "session playing");

        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        let events = self.rooms.begin(&ids);
        self.route_room_events(events);
    }

    // -----------------------------------------------------------------
    // Player registry
    // -----------------------------------------------------------------

    /// Registers a new player and wires it into targeting and the team
    /// watcher. A join mid-run drops the player at the active room's
    /// origin, ready immediately.
    pub fn add_player(&mut self) -> Result<PlayerId, AshgateError> {
        if self.players.len() >= self.config.max_players {
            return Err(AshgateError::SessionFull { max: self.config.max_players });
        }
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;

        let mut actor = PlayerActor {
            pose: Pose::default(),
            ready: false,
            health: Health::new(self.config.player_health),
            revive: Revive::new(self.config.revive),
            shooter: AutoShooter::new(self.config.shooter),
        };

        let mut placed_at = None;
        if self.rooms.state().in_run() {
            let at = self.rooms.active_origin();
            actor.pose.pos = at;
            actor.ready = true;
            placed_at = Some(at);
        }

        self.watcher.register(id, LifeState::Alive);
        for enemy in self.enemies.values_mut() {
            enemy.chaser.add_target(id);
        }
        self.players.insert(id, actor);

        info!(player = %id, total = self.players.len(), "player joined");
        self.events.push(SessionEvent::PlayerJoined { player: id });
        if let Some(at) = placed_at {
            self.events.push(SessionEvent::PlayerPlaced { player: id, at });
        }
        Ok(id)
    }

    /// Unregisters a player. The team watcher re-checks the wipe
    /// condition against the remaining team.
    pub fn remove_player(&mut self, id: PlayerId) {
        if self.players.remove(&id).is_none() {
            debug!(player = %id, "remove of unknown player ignored");
            return;
        }
        self.watcher.unregister(id);
        for enemy in self.enemies.values_mut() {
            enemy.chaser.remove_target(id);
        }
        info!(player = %id, total = self.players.len(), "player left");
        self.events.push(SessionEvent::PlayerLeft { player: id });
    }

    // -----------------------------------------------------------------
    // Input-layer entry points
    // -----------------------------------------------------------------

    /// Player-triggered room transition: menu index plus the door side
    /// the players exited through.
    pub fn choose_room(&mut self, choice: usize, through: Side) {
        if self.phase != SessionPhase::Playing {
            warn!(phase = %self.phase, "room choice ignored");
            return;
        }
        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        let events = self.rooms.enter_choice(choice, through, &ids);
        self.route_room_events(events);
    }

    /// Explicit external revive (a teammate interaction). Idempotent
    /// when the player is already alive.
    pub fn revive_player(&mut self, id: PlayerId) {
        let Some(actor) = self.players.get_mut(&id) else {
            debug!(player = %id, "revive of unknown player ignored");
            return;
        };
        let events = actor.revive.revive();
        self.route_player_life(id, events);
    }

    /// Applies a named upgrade to one player's stats.
    pub fn apply_upgrade(&mut self, id: PlayerId, upgrade: Upgrade) {
        let Some(actor) = self.players.get_mut(&id) else {
            warn!(player = %id, "upgrade for unknown player ignored");
            return;
        };
        debug!(player = %id, ?upgrade, "upgrade applied");
        let health_events = match upgrade {
            Upgrade::MaxHp(delta) => actor.health.add_max_hp(delta),
            Upgrade::HealthRegen(delta) => {
                actor.health.add_regen(delta);
                Vec::new()
            }
            Upgrade::ReviveTime(amount) => {
                actor.revive.decrease_auto_revive(amount);
                Vec::new()
            }
            Upgrade::FireRate(amount) => {
                actor.shooter.decrease_shot_interval(amount);
                Vec::new()
            }
            Upgrade::Damage(amount) => {
                actor.shooter.increase_damage(amount);
                Vec::new()
            }
            Upgrade::ProjectileSpeed(amount) => {
                actor.shooter.increase_projectile_speed(amount);
                Vec::new()
            }
            Upgrade::Piercing(amount) => {
                actor.shooter.increase_piercing(amount);
                Vec::new()
            }
            Upgrade::ProjectileLifetime(amount) => {
                actor.shooter.increase_projectile_lifetime(amount);
                Vec::new()
            }
            Upgrade::Range(amount) => {
                actor.shooter.increase_range(amount);
                Vec::new()
            }
        };
        self.route_player_health(id, health_events);
    }

    // -----------------------------------------------------------------
    // Spatial-layer entry points
    // -----------------------------------------------------------------

    /// Position update from the physics integration.
    pub fn set_player_pose(&mut self, id: PlayerId, pose: Pose) {
        if let Some(actor) = self.players.get_mut(&id) {
            actor.pose = pose;
        }
    }

    /// Position update from the physics integration.
    pub fn set_enemy_pose(&mut self, id: EnemyId, pose: Pose) {
        if let Some(enemy) = self.enemies.get_mut(&id) {
            enemy.pose = pose;
        }
    }

    /// Trigger-enter notification: an enemy entered a player's detection
    /// radius. May fire immediately.
    pub fn report_range_enter(&mut self, player: PlayerId, enemy: EnemyId) {
        let view = EnemyView(&self.enemies);
        let Some(actor) = self.players.get_mut(&player) else {
            return;
        };
        if !actor.ready || !actor.is_alive() {
            return;
        }
        let origin = actor.pose.pos;
        if let Some(shot) = actor.shooter.on_enter(enemy, origin, &view) {
            self.events.push(SessionEvent::ShotFired { player, shot });
        }
    }

    /// Trigger-exit notification.
    pub fn report_range_exit(&mut self, player: PlayerId, enemy: EnemyId) {
        if let Some(actor) = self.players.get_mut(&player) {
            actor.shooter.on_exit(enemy);
        }
    }

    /// Damage report from the physics layer (projectile connected,
    /// hazard, …). Unknown ids are idempotent no-ops: the enemy already
    /// died and was recycled.
    pub fn hit_enemy(&mut self, id: EnemyId, amount: f32) {
        let Some(enemy) = self.enemies.get_mut(&id) else {
            debug!(enemy = %id, "hit on unknown enemy ignored");
            return;
        };
        let events = enemy.health.hit(amount);
        self.route_enemy_health(id, events);
    }

    /// Damage report against a player (environmental hazards; enemy
    /// strikes use the same path internally).
    pub fn hit_player(&mut self, id: PlayerId, amount: f32) {
        let Some(actor) = self.players.get_mut(&id) else {
            debug!(player = %id, "hit on unknown player ignored");
            return;
        };
        let events = actor.health.hit(amount);
        self.route_player_health(id, events);
    }

    // -----------------------------------------------------------------
    // The simulation tick
    // -----------------------------------------------------------------

    /// Advances every state machine by one fixed step.
    ///
    /// Tick order (documented, race-free):
    /// 1. deferred team-wipe confirmation (coalesces last tick's downs);
    /// 2. room settle (`Entering → RoomActive`, wave starts on settle);
    /// 3. wave pacing and spawning;
    /// 4. enemy AI (approach intents, contact strikes);
    /// 5. player auto-shooters;
    /// 6. health regen and revive countdowns.
    ///
    /// All events are routed after the emitting mutation completes;
    /// nothing re-enters a state machine from inside its own callback.
    pub fn tick(&mut self, dt: Duration) {
        if self.phase != SessionPhase::Playing {
            return;
        }

        // 1. Team-wipe confirmation deferred from the previous tick.
        if self.watcher.confirm_tick() {
            self.on_team_wipe();
            return;
        }

        // 2. Room settle.
        let room_events = self.rooms.tick();
        self.route_room_events(room_events);
        if self.phase != SessionPhase::Playing {
            return;
        }

        // 3. Wave pacing & spawning.
        let alive_players = self.alive_player_count();
        let (wave_events, orders) =
            self.wave
                .advance(dt, alive_players, &self.catalog, &mut self.rng);
        for order in orders {
            self.spawn_enemy(order);
        }
        self.route_wave_events(wave_events);
        if self.phase != SessionPhase::Playing {
            return;
        }

        // 4. Enemy AI. Strikes are collected and applied after the
        // borrow on the enemy map ends.
        let mut strikes: Vec<(EnemyId, PlayerId, f32)> = Vec::new();
        {
            let view = PlayerView(&self.players);
            for (id, enemy) in self.enemies.iter_mut() {
                let my_pos = enemy.pose.pos;
                match enemy.chaser.tick(dt, my_pos, &view) {
                    ChaseAction::Hold => {}
                    ChaseAction::Approach { toward, speed } => {
                        self.events.push(SessionEvent::EnemyApproach {
                            id: *id,
                            toward,
                            speed,
                        });
                    }
                    ChaseAction::Strike { target, damage } => {
                        strikes.push((*id, target, damage));
                    }
                }
            }
        }
        for (enemy, player, damage) in strikes {
            self.events.push(SessionEvent::EnemyStruck { id: enemy, player });
            self.hit_player(player, damage);
        }

        // 5. Player shooters. Downed or unplaced players do not fire.
        let mut shots: Vec<(PlayerId, ashgate_combat::ShotCommand)> = Vec::new();
        {
            let view = EnemyView(&self.enemies);
            for (id, actor) in self.players.iter_mut() {
                if !actor.ready || !actor.is_alive() {
                    continue;
                }
                if let Some(shot) = actor.shooter.tick(dt, actor.pose.pos, &view) {
                    shots.push((*id, shot));
                }
            }
        }
        for (player, shot) in shots {
            self.events.push(SessionEvent::ShotFired { player, shot });
        }

        // 6. Health regen and revive countdowns.
        let mut health_events: Vec<(PlayerId, Vec<HealthEvent>)> = Vec::new();
        let mut life_events: Vec<(PlayerId, Vec<LifeEvent>)> = Vec::new();
        for (id, actor) in self.players.iter_mut() {
            health_events.push((*id, actor.health.tick(dt)));
            life_events.push((*id, actor.revive.tick(dt)));
        }
        for (id, events) in health_events {
            self.route_player_health(id, events);
        }
        for (id, events) in life_events {
            self.route_player_life(id, events);
        }
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            director: self.rooms.state(),
            wave: self.wave.phase(),
            difficulty: self.rooms.difficulty(),
            enemies_alive: self.enemies.len() as u32,
            level: self.level.level(),
            kills: self.level.kills(),
            kill_total: self.level.total(),
            players: self
                .players
                .iter()
                .map(|(id, actor)| PlayerSnapshot {
                    id: *id,
                    life: actor.revive.state(),
                    hp: actor.health.current(),
                    max_hp: actor.health.max(),
                    ready: actor.ready,
                })
                .collect(),
        }
    }

    /// Drains the events produced since the last call, in emission
    /// order.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------
    // Internals: spawning
    // -----------------------------------------------------------------

    fn spawn_enemy(&mut self, order: SpawnOrder) {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;

        let mut enemy = self.pools.acquire(order.kind, Pose::at(order.at));
        enemy.configure(id, order.stats);
        for player in self.players.keys() {
            enemy.chaser.add_target(*player);
        }
        self.enemies.insert(id, enemy);

        debug!(enemy = %id, kind = %order.kind, at = %order.at, "enemy spawned");
        self.events.push(SessionEvent::EnemySpawned {
            id,
            kind: order.kind,
            at: order.at,
        });
    }

    fn alive_player_count(&self) -> u32 {
        self.players.values().filter(|p| p.is_alive()).count() as u32
    }

    // -----------------------------------------------------------------
    // Internals: event routing
    // -----------------------------------------------------------------

    fn route_room_events(&mut self, events: Vec<RoomEvent>) {
        for event in events {
            match event {
                RoomEvent::Entered { entry, kind, name, difficulty, placements } => {
                    self.events.push(SessionEvent::RoomEntered {
                        entry,
                        kind,
                        name,
                        difficulty,
                    });
                    for (player, at) in placements {
                        if let Some(actor) = self.players.get_mut(&player) {
                            actor.pose.pos = at;
                            actor.ready = true;
                            self.events.push(SessionEvent::PlayerPlaced { player, at });
                        }
                    }
                }
                RoomEvent::Live { entry } => {
                    self.events.push(SessionEvent::RoomLive { entry });
                    // The settle tick elapsed; the room is live and its
                    // wave begins.
                    self.start_wave_for_active_room();
                }
                RoomEvent::ChoicesOffered { choices } => {
                    self.events.push(SessionEvent::ChoicesOffered { choices });
                }
                RoomEvent::Won => {
                    info!("session won");
                    self.wave.stop();
                    self.phase = SessionPhase::Won;
                    self.events.push(SessionEvent::Victory);
                }
            }
        }
    }

    fn start_wave_for_active_room(&mut self) {
        let Some(def) = self.rooms.active_def() else {
            warn!("no active room to start a wave for");
            return;
        };
        let def = def.clone();
        let points = self.rooms.active_enemy_spawns().to_vec();
        let fallback = self.rooms.active_origin();
        let difficulty = self.rooms.difficulty();

        let events = self
            .wave
            .start(&def, difficulty, &points, fallback, &mut self.rng);
        self.route_wave_events(events);
    }

    fn route_wave_events(&mut self, events: Vec<WaveEvent>) {
        for event in events {
            match event {
                WaveEvent::Started { total } => {
                    self.level.set_total(total);
                    self.events.push(SessionEvent::WaveStarted { total });
                    self.events.push(SessionEvent::ProgressChanged {
                        kills: 0,
                        total,
                    });
                }
                WaveEvent::Spawned { .. } => {
                    // Realized through the spawn orders; the session
                    // emits `EnemySpawned` with the instance id instead.
                }
                WaveEvent::Cleared => {
                    self.events.push(SessionEvent::WaveCleared);
                    let level = self.level.level_up();
                    self.events.push(SessionEvent::LevelUp { level });

                    let room_events = self.rooms.on_wave_cleared(&mut self.rng);
                    self.route_room_events(room_events);
                }
            }
        }
    }

    fn route_enemy_health(&mut self, id: EnemyId, events: Vec<HealthEvent>) {
        for event in events {
            match event {
                HealthEvent::Changed { current, max } => {
                    self.events.push(SessionEvent::EnemyHealthChanged {
                        id,
                        current,
                        max,
                    });
                }
                HealthEvent::Died => self.on_enemy_died(id),
            }
        }
    }

    fn on_enemy_died(&mut self, id: EnemyId) {
        let Some(enemy) = self.enemies.remove(&id) else {
            return;
        };
        let kind = enemy.kind();
        self.pools.release(kind, enemy);

        self.level.award_kill();
        self.events.push(SessionEvent::ProgressChanged {
            kills: self.level.kills(),
            total: self.level.total(),
        });
        self.events.push(SessionEvent::EnemyDied { id, kind });
        debug!(enemy = %id, alive = self.wave.alive().saturating_sub(1), "enemy died");

        let wave_events = self.wave.note_enemy_died();
        self.route_wave_events(wave_events);
    }

    fn route_player_health(&mut self, id: PlayerId, events: Vec<HealthEvent>) {
        for event in events {
            match event {
                HealthEvent::Changed { current, max } => {
                    self.events.push(SessionEvent::PlayerHealthChanged {
                        player: id,
                        current,
                        max,
                    });
                }
                HealthEvent::Died => {
                    let Some(actor) = self.players.get_mut(&id) else {
                        continue;
                    };
                    let life = actor.revive.down();
                    self.route_player_life(id, life);
                }
            }
        }
    }

    fn route_player_life(&mut self, id: PlayerId, events: Vec<LifeEvent>) {
        for event in events {
            let LifeEvent::StateChanged { prev, next } = event;
            self.watcher.on_state_changed(id, prev, next);
            match next {
                LifeState::Downed => {
                    info!(player = %id, "player downed");
                    self.events.push(SessionEvent::PlayerDowned { player: id });
                }
                LifeState::Alive => {
                    info!(player = %id, "player revived");
                    // Coming back up restores full health and movement.
                    let health_events = match self.players.get_mut(&id) {
                        Some(actor) => actor.health.full_heal(),
                        None => Vec::new(),
                    };
                    self.route_player_health(id, health_events);
                    self.events.push(SessionEvent::PlayerRevived { player: id });
                }
            }
        }
    }

    fn on_team_wipe(&mut self) {
        info!("team wiped, session over");
        self.wave.stop();
        self.phase = SessionPhase::Wiped;
        self.events.push(SessionEvent::TeamWiped);
    }
}
