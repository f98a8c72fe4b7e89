//! Events the session fans out to subscribers.

use ashgate_combat::ShotCommand;
use ashgate_defs::{EnemyId, EnemyKindId, PlayerId, RoomKind, Vec2};
use ashgate_room::RoomChoice;

/// Everything the outside world can observe about a running session.
///
/// Events are emitted in mutation order within a tick (the tick order is
/// documented on [`Session::tick`](crate::Session::tick)) and delivered
/// after the mutation completes — a subscriber can never re-enter the
/// emitting state machine mid-change.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The setup pipeline finished; `play` may be called.
    Ready,
    /// Gameplay began: the room director is entering the starter room.
    Playing,

    // ---------------- Rooms ----------------
    RoomEntered {
        entry: usize,
        kind: RoomKind,
        name: String,
        difficulty: u32,
    },
    /// A registered player was relocated onto a spawn anchor. The
    /// spatial layer should move the body accordingly.
    PlayerPlaced { player: PlayerId, at: Vec2 },
    /// The entered room finished its one-tick settle.
    RoomLive { entry: usize },
    /// The cleared wave produced a next-room menu.
    ChoicesOffered { choices: Vec<RoomChoice> },
    /// The deck is exhausted: terminal win.
    Victory,

    // ---------------- Waves ----------------
    WaveStarted { total: u32 },
    WaveCleared,
    EnemySpawned { id: EnemyId, kind: EnemyKindId, at: Vec2 },
    EnemyDied { id: EnemyId, kind: EnemyKindId },
    EnemyHealthChanged { id: EnemyId, current: f32, max: f32 },

    // ---------------- Combat boundary ----------------
    /// Movement intent for the physics layer: this enemy wants to close
    /// in on its target.
    EnemyApproach { id: EnemyId, toward: Vec2, speed: f32 },
    /// Contact strike landed (damage is already applied); presentation
    /// may play the attack.
    EnemyStruck { id: EnemyId, player: PlayerId },
    /// A player's auto-shooter fired; the physics layer resolves the
    /// projectile and reports hits back through `hit_enemy`.
    ShotFired { player: PlayerId, shot: ShotCommand },

    // ---------------- Players ----------------
    PlayerJoined { player: PlayerId },
    PlayerLeft { player: PlayerId },
    PlayerHealthChanged { player: PlayerId, current: f32, max: f32 },
    PlayerDowned { player: PlayerId },
    PlayerRevived { player: PlayerId },

    // ---------------- Progress ----------------
    ProgressChanged { kills: u32, total: u32 },
    LevelUp { level: u32 },

    /// All players were simultaneously downed: terminal failure.
    TeamWiped,
}
