//! The per-subsystem initialization entry point.

use std::sync::Arc;

use ashgate_defs::Catalog;

use crate::CancelToken;

/// Shared context handed to every setup stage.
///
/// Carries the validated definition catalog and the session seed.
/// Stages that need randomness derive their own generator from the seed
/// so setup stays deterministic for a given seed regardless of stage
/// timing.
#[derive(Debug, Clone)]
pub struct SetupContext {
    pub catalog: Arc<Catalog>,
    pub seed: u64,
}

/// Errors surfaced from the setup pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Cancellation was requested at a yield point. Not a failure — the
    /// sequence unwound cleanly.
    #[error("setup cancelled")]
    Cancelled,

    /// A stage failed on a configuration error it cannot degrade past.
    #[error("setup stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SetupError {
    /// Wraps a stage-specific error with the stage name for logging.
    pub fn stage(
        stage: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> SetupError {
        SetupError::Stage { stage, source: Box::new(source) }
    }
}

/// One asynchronous initialization entry point per subsystem.
///
/// The pipeline awaits each registered stage to completion (or
/// cancellation) before the next starts; gameplay only begins once every
/// stage has finished. Implementations must check `cancel` at each of
/// their yield points.
pub trait SetupStage {
    /// Stage name for structured logging.
    fn name(&self) -> &'static str;

    /// Runs the stage to completion.
    async fn setup(
        &mut self,
        ctx: &SetupContext,
        cancel: &CancelToken,
    ) -> Result<(), SetupError>;
}
