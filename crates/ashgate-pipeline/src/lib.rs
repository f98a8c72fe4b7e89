//! Setup pipeline contract for Ashgate.
//!
//! Every subsystem that needs asynchronous initialization implements
//! [`SetupStage`]: one entry point taking a shared [`SetupContext`] and a
//! cooperative [`CancelToken`]. The session runs all stages in a fixed,
//! documented order, awaiting each to completion before gameplay begins.
//!
//! Long-running stages (pool prewarm, deck instantiation) yield to the
//! scheduler after each unit of work via `tokio::task::yield_now` and check
//! the token at every yield point, so cancellation unwinds cleanly without
//! partial side effects beyond the units already committed.

#![allow(async_fn_in_trait)]

mod cancel;
mod stage;

pub use cancel::{CancelSource, CancelToken};
pub use stage::{SetupContext, SetupError, SetupStage};
