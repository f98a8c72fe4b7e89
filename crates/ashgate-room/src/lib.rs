//! Room deck construction and the transition state machine for Ashgate.
//!
//! At setup the director samples a deck of room definitions from the
//! catalog under per-category quotas, pre-instantiates every entry
//! disabled, and waits for the play signal. During a run it enters rooms
//! (destroying the previous instance first), places players on explicit
//! spawn anchors, offers up to three next-room choices after each cleared
//! wave, and reaches the `Won` terminal state when the deck runs dry.
//!
//! # Key types
//!
//! - [`RoomDirector`] — the deck + transition state machine
//! - [`DirectorState`] — its lifecycle
//! - [`DeckEntry`] / [`RoomInstance`] — pre-instantiated deck entries
//! - [`RoomEvent`] / [`RoomChoice`] — notifications to the session

mod deck;
mod director;
mod error;

pub use deck::{DeckEntry, RoomInstance, build_deck};
pub use director::{
    DirectorState, RoomChoice, RoomDirector, RoomDirectorConfig, RoomEvent,
};
pub use error::DeckError;
