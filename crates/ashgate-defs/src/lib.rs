//! Shared identity types and the immutable definition catalog for Ashgate.
//!
//! Everything in this crate is plain data: id newtypes, 2-D math
//! primitives, and the room/enemy definitions that deck building and wave
//! planning consume read-only. Definitions are authored externally and
//! loaded once at startup; nothing here mutates after load.
//!
//! # Key types
//!
//! - [`PlayerId`], [`EnemyId`], [`EnemyKindId`] — identity newtypes
//! - [`Vec2`], [`Pose`], [`Side`] — spatial primitives
//! - [`EnemyDef`], [`RoomDef`], [`EnemyQuota`] — definitions
//! - [`Catalog`] — the loaded, validated definition set

mod catalog;
mod defs;
mod error;
mod types;

pub use catalog::Catalog;
pub use defs::{EnemyDef, EnemyQuota, RoomDef, RoomKind, RoomLayout, ScaledStats};
pub use error::DefsError;
pub use types::{EnemyId, EnemyKindId, PlayerId, Pose, Side, Vec2};
