//! Health, revive and team-wipe state machines plus the shared
//! proximity/targeting utility for Ashgate.
//!
//! Everything here is a synchronous state machine advanced by the session's
//! fixed simulation tick. Mutations return typed event lists; the session
//! routes them after the mutating borrow ends, so observers can never
//! re-enter the emitting machine.
//!
//! # Key types
//!
//! - [`Health`] — hit points, clamped damage/heal, delay-gated regen
//! - [`Revive`] — the `Alive ⇄ Downed` player life state machine
//! - [`TeamWipeWatcher`] — race-safe all-players-downed detection
//! - [`TargetSet`] / [`TargetCaps`] — closest-target selection and
//!   radius-hysteresis culling, shared by shooters and chasers
//! - [`AutoShooter`], [`Chaser`] — the two consumers of the targeting
//!   utility

mod chaser;
mod health;
mod revive;
mod shooter;
mod target;
mod team;

pub use chaser::{ChaseAction, Chaser, ChaserConfig};
pub use health::{Health, HealthConfig, HealthEvent};
pub use revive::{LifeEvent, LifeState, Revive, ReviveConfig};
pub use shooter::{AutoShooter, ShooterConfig, ShotCommand};
pub use target::{TargetCaps, TargetSet};
pub use team::TeamWipeWatcher;
