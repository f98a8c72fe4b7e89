//! Wave planning and spawn pacing for Ashgate.
//!
//! A room entry hands the [`WaveDirector`] a room definition; the director
//! expands its enemy quotas into a [`WavePlan`], waits out a grace delay,
//! then paces spawn orders one at a time with an interval that tightens as
//! the wave progresses (and with player count). Once the plan is exhausted
//! the director drains — waiting for the alive counter to reach zero —
//! and fires the cleared notification the room director advances on.
//!
//! The director is a synchronous state machine advanced by the session
//! tick; `stop` cancels an in-flight wave cooperatively and leaves
//! already-spawned enemies alive.

mod director;
mod plan;

pub use director::{PacingConfig, SpawnOrder, WaveDirector, WaveEvent, WavePhase};
pub use plan::WavePlan;
