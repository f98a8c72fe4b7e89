//! # Ashgate
//!
//! A cooperative, room-based survival session core. Players move between
//! procedurally-selected rooms, each room triggers a timed wave of
//! enemies, and a team-wide downed state gates session failure.
//!
//! The crate ties the subsystem crates together behind one [`Session`]
//! value — no globals, no hidden coupling: the session owns the object
//! pools, the room and wave directors, every player's health/revive
//! machine and the team-wipe watcher, and advances all of them on a fixed
//! simulation tick. [`spawn_session`] wraps the session in a Tokio actor
//! driven by a command channel and the [`ashgate_tick::SimClock`];
//! presentation, input and physics stay outside and talk through
//! commands and [`SessionEvent`]s.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ashgate::prelude::*;
//!
//! # async fn run(catalog_json: &str) -> Result<(), AshgateError> {
//! let catalog = Catalog::from_json(catalog_json)?;
//! let (events_tx, mut events) = tokio::sync::mpsc::unbounded_channel();
//! let handle = spawn_session(
//!     SessionConfig::default(),
//!     catalog,
//!     events_tx,
//!     CancelToken::never(),
//! )
//! .await?;
//!
//! let player = handle.add_player().await?;
//! handle.play().await?;
//! while let Some(event) = events.recv().await {
//!     // drive presentation from events
//! }
//! # Ok(())
//! # }
//! ```

mod driver;
mod enemy;
mod error;
mod events;
mod player;
mod progress;
mod session;
mod upgrade;

pub use driver::{SessionCommand, SessionHandle, spawn_session};
pub use enemy::Enemy;
pub use error::AshgateError;
pub use events::SessionEvent;
pub use progress::LevelTrack;
pub use session::{
    PlayerSnapshot, Session, SessionConfig, SessionPhase, SessionSnapshot,
};
pub use upgrade::Upgrade;

// Re-exports so embedders can build configs and handle events without
// depending on the subsystem crates directly.
pub use ashgate_combat::{
    HealthConfig, LifeState, ReviveConfig, ShooterConfig, ShotCommand,
};
pub use ashgate_defs::{
    Catalog, DefsError, EnemyDef, EnemyId, EnemyKindId, EnemyQuota, PlayerId,
    Pose, RoomDef, RoomKind, RoomLayout, Side, Vec2,
};
pub use ashgate_pipeline::{CancelSource, CancelToken, SetupError};
pub use ashgate_pool::PoolConfig;
pub use ashgate_room::{DirectorState, RoomChoice, RoomDirectorConfig};
pub use ashgate_tick::ClockConfig;
pub use ashgate_wave::{PacingConfig, WavePhase};

/// One-stop imports for embedders.
pub mod prelude {
    pub use crate::{
        AshgateError, CancelToken, Catalog, EnemyId, EnemyKindId, LifeState,
        PlayerId, Pose, Session, SessionConfig, SessionEvent, SessionHandle,
        SessionPhase, ShotCommand, Side, Upgrade, Vec2, spawn_session,
    };
}
