//! Error types for definition loading and validation.

use crate::EnemyKindId;

/// Errors raised while loading or validating the definition catalog.
#[derive(Debug, thiserror::Error)]
pub enum DefsError {
    /// The catalog JSON could not be parsed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog contains no room definitions at all. Deck building
    /// cannot degrade past this one.
    #[error("catalog has no room definitions")]
    NoRooms,

    /// A room quota references an enemy kind with no definition.
    #[error("room '{room}' references unknown enemy kind {kind}")]
    UnknownEnemyKind { room: String, kind: EnemyKindId },

    /// Two enemy definitions share the same kind id.
    #[error("duplicate enemy kind {0} in catalog")]
    DuplicateEnemyKind(EnemyKindId),
}
