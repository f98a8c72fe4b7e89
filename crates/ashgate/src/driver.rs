//! The session actor: an isolated Tokio task that owns the [`Session`].
//!
//! The task is driven by a `tokio::select!` over its command channel and
//! the fixed-step [`SimClock`]; all game state stays inside the task, so
//! there is no shared mutable state and no locking. Communication happens
//! through [`SessionHandle`] (commands in) and an unbounded event channel
//! (events out).

use ashgate_defs::{Catalog, EnemyId, PlayerId, Pose, Side};
use ashgate_pipeline::CancelToken;
use ashgate_tick::SimClock;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    AshgateError, Session, SessionConfig, SessionEvent, SessionSnapshot, Upgrade,
};

/// Command channel capacity. Senders briefly back-pressure when the
/// session falls behind.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// Commands sent to the session actor.
///
/// Variants with a `oneshot::Sender` are request/reply; the rest are
/// fire-and-forget.
#[derive(Debug)]
pub enum SessionCommand {
    Play,
    AddPlayer {
        reply: oneshot::Sender<Result<PlayerId, AshgateError>>,
    },
    RemovePlayer { player: PlayerId },
    ChooseRoom { choice: usize, through: Side },
    ApplyUpgrade { player: PlayerId, upgrade: Upgrade },
    RevivePlayer { player: PlayerId },
    HitEnemy { enemy: EnemyId, amount: f32 },
    HitPlayer { player: PlayerId, amount: f32 },
    RangeEnter { player: PlayerId, enemy: EnemyId },
    RangeExit { player: PlayerId, enemy: EnemyId },
    PlayerPose { player: PlayerId, pose: Pose },
    EnemyPose { enemy: EnemyId, pose: Pose },
    /// Freeze the simulation clock (menus). Regen, countdowns and
    /// pacing all stop with it.
    Pause,
    Resume,
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Handle to a running session actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Starts gameplay (fires the Play signal).
    pub async fn play(&self) -> Result<(), AshgateError> {
        self.send(SessionCommand::Play).await
    }

    /// Registers a new player.
    pub async fn add_player(&self) -> Result<PlayerId, AshgateError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::AddPlayer { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| AshgateError::Unavailable)?
    }

    pub async fn remove_player(&self, player: PlayerId) -> Result<(), AshgateError> {
        self.send(SessionCommand::RemovePlayer { player }).await
    }

    /// Chooses a next-room menu entry, leaving through the given door
    /// side.
    pub async fn choose_room(&self, choice: usize, through: Side) -> Result<(), AshgateError> {
        self.send(SessionCommand::ChooseRoom { choice, through }).await
    }

    pub async fn apply_upgrade(
        &self,
        player: PlayerId,
        upgrade: Upgrade,
    ) -> Result<(), AshgateError> {
        self.send(SessionCommand::ApplyUpgrade { player, upgrade }).await
    }

    pub async fn revive_player(&self, player: PlayerId) -> Result<(), AshgateError> {
        self.send(SessionCommand::RevivePlayer { player }).await
    }

    pub async fn hit_enemy(&self, enemy: EnemyId, amount: f32) -> Result<(), AshgateError> {
        self.send(SessionCommand::HitEnemy { enemy, amount }).await
    }

    pub async fn hit_player(&self, player: PlayerId, amount: f32) -> Result<(), AshgateError> {
        self.send(SessionCommand::HitPlayer { player, amount }).await
    }

    pub async fn range_enter(&self, player: PlayerId, enemy: EnemyId) -> Result<(), AshgateError> {
        self.send(SessionCommand::RangeEnter { player, enemy }).await
    }

    pub async fn range_exit(&self, player: PlayerId, enemy: EnemyId) -> Result<(), AshgateError> {
        self.send(SessionCommand::RangeExit { player, enemy }).await
    }

    pub async fn set_player_pose(&self, player: PlayerId, pose: Pose) -> Result<(), AshgateError> {
        self.send(SessionCommand::PlayerPose { player, pose }).await
    }

    pub async fn set_enemy_pose(&self, enemy: EnemyId, pose: Pose) -> Result<(), AshgateError> {
        self.send(SessionCommand::EnemyPose { enemy, pose }).await
    }

    pub async fn pause(&self) -> Result<(), AshgateError> {
        self.send(SessionCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), AshgateError> {
        self.send(SessionCommand::Resume).await
    }

    /// Requests a point-in-time snapshot of the session.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, AshgateError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| AshgateError::Unavailable)
    }

    /// Tells the session actor to stop.
    pub async fn shutdown(&self) -> Result<(), AshgateError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), AshgateError> {
        self.tx.send(cmd).await.map_err(|_| AshgateError::Unavailable)
    }
}

/// Builds the session, runs its setup pipeline to completion, then
/// spawns the actor task.
///
/// The returned handle is live once setup finished — [`SessionEvent::Ready`]
/// is already on the event channel. Cancelling `cancel` during setup
/// unwinds cleanly and returns the error instead of spawning.
pub async fn spawn_session(
    config: SessionConfig,
    catalog: Catalog,
    events: mpsc::UnboundedSender<SessionEvent>,
    cancel: CancelToken,
) -> Result<SessionHandle, AshgateError> {
    let tick = config.tick;
    let mut session = Session::new(config, catalog)?;
    session.initialize(&cancel).await?;
    drain(&mut session, &events);

    let (tx, mut rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

    tokio::spawn(async move {
        info!("session actor started");
        let mut clock = SimClock::new(tick);

        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else {
                        debug!("all handles dropped, session actor stopping");
                        break;
                    };
                    if handle_command(&mut session, &mut clock, cmd) {
                        break;
                    }
                }
                tick = clock.wait_for_tick() => {
                    session.tick(tick.dt);
                }
            }
            drain(&mut session, &events);
        }

        info!("session actor stopped");
    });

    Ok(SessionHandle { tx })
}

/// Applies one command. Returns `true` on shutdown.
fn handle_command(session: &mut Session, clock: &mut SimClock, cmd: SessionCommand) -> bool {
    match cmd {
        SessionCommand::Play => session.play(),
        SessionCommand::AddPlayer { reply } => {
            let _ = reply.send(session.add_player());
        }
        SessionCommand::RemovePlayer { player } => session.remove_player(player),
        SessionCommand::ChooseRoom { choice, through } => {
            session.choose_room(choice, through)
        }
        SessionCommand::ApplyUpgrade { player, upgrade } => {
            session.apply_upgrade(player, upgrade)
        }
        SessionCommand::RevivePlayer { player } => session.revive_player(player),
        SessionCommand::HitEnemy { enemy, amount } => session.hit_enemy(enemy, amount),
        SessionCommand::HitPlayer { player, amount } => session.hit_player(player, amount),
        SessionCommand::RangeEnter { player, enemy } => {
            session.report_range_enter(player, enemy)
        }
        SessionCommand::RangeExit { player, enemy } => {
            session.report_range_exit(player, enemy)
        }
        SessionCommand::PlayerPose { player, pose } => session.set_player_pose(player, pose),
        SessionCommand::EnemyPose { enemy, pose } => session.set_enemy_pose(enemy, pose),
        SessionCommand::Pause => clock.pause(),
        SessionCommand::Resume => clock.resume(),
        SessionCommand::Snapshot { reply } => {
            let _ = reply.send(session.snapshot());
        }
        SessionCommand::Shutdown => {
            info!("session shutting down");
            return true;
        }
    }
    false
}

/// Forwards buffered session events to the subscriber. A dropped
/// receiver is tolerated: the session keeps running headless.
fn drain(session: &mut Session, events: &mpsc::UnboundedSender<SessionEvent>) {
    for event in session.take_events() {
        if events.send(event).is_err() {
            warn!("event subscriber gone, dropping events");
            break;
        }
    }
}
