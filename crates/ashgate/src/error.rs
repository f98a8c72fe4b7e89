//! Unified error type for the Ashgate facade.

use ashgate_defs::DefsError;
use ashgate_pipeline::SetupError;

/// Top-level error for session construction and commands.
///
/// Sub-crate errors convert automatically through `#[from]`, so `?`
/// composes across the crates. Runtime degradation (missing spawn
/// points, out-of-range choices, double releases) never surfaces here —
/// those paths are logged no-ops by design.
#[derive(Debug, thiserror::Error)]
pub enum AshgateError {
    /// The definition catalog failed to load or validate.
    #[error(transparent)]
    Defs(#[from] DefsError),

    /// The setup pipeline failed or was cancelled.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// The session already holds its configured maximum of players.
    #[error("session is full ({max} players)")]
    SessionFull { max: usize },

    /// The session actor is gone (shut down or crashed).
    #[error("session is unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_defs_error() {
        let err: AshgateError = DefsError::NoRooms.into();
        assert!(matches!(err, AshgateError::Defs(_)));
        assert!(err.to_string().contains("no room definitions"));
    }

    #[test]
    fn test_from_setup_error() {
        let err: AshgateError = SetupError::Cancelled.into();
        assert!(matches!(err, AshgateError::Setup(_)));
    }

    #[test]
    fn test_session_full_message() {
        let err = AshgateError::SessionFull { max: 2 };
        assert_eq!(err.to_string(), "session is full (2 players)");
    }
}
