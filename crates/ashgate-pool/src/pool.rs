//! A single-kind pool: free list, factory, acquire/release hooks.

use ashgate_defs::Pose;
use ashgate_pipeline::{CancelToken, SetupError};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Recyclable
// ---------------------------------------------------------------------------

/// Implemented by entities that live in a [`Pool`].
///
/// Hook contract:
/// - after [`on_acquire`](Recyclable::on_acquire) the instance reports
///   [`is_active`](Recyclable::is_active) `== true` and carries the given
///   pose with all per-use state reset;
/// - after [`on_release`](Recyclable::on_release) it reports inactive with
///   all transient state cleared.
///
/// The active flag is the double-release guard: releasing an instance
/// that is already inactive is a logged no-op, never an error.
pub trait Recyclable {
    /// Reset per-use state and place the instance at `pose`.
    fn on_acquire(&mut self, pose: Pose);

    /// Clear transient state before the instance goes idle.
    fn on_release(&mut self);

    /// Whether the instance is currently checked out.
    fn is_active(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for one pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Instances constructed and parked during setup, so early acquires
    /// skip construction latency.
    pub prewarm: usize,
    /// Maximum *idle* instances retained. Releases beyond this drop the
    /// instance instead of parking it. Checked-out instances are not
    /// counted — construction on demand is unbounded.
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { prewarm: 64, max_size: 256 }
    }
}

impl PoolConfig {
    /// Settings applied when an unregistered kind shows up at acquire
    /// time: nothing prewarmed, a modest idle cap.
    pub const LATE_REGISTRATION: PoolConfig = PoolConfig { prewarm: 0, max_size: 128 };

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.max_size == 0 {
            warn!("pool max_size of 0 clamped to 1");
            self.max_size = 1;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// A free-list pool for one entity kind.
///
/// Idle instances are owned here by value; a checked-out instance is owned
/// by the caller until released. All mutation happens on the session's
/// tick task, so there is no interior locking.
pub struct Pool<T> {
    factory: Box<dyn FnMut() -> T + Send>,
    free: Vec<T>,
    max_size: usize,
    created: u64,
    live: usize,
}

impl<T: Recyclable> Pool<T> {
    /// Creates an empty pool. Call [`prewarm`](Pool::prewarm) during setup
    /// to park instances ahead of demand.
    pub fn new(config: PoolConfig, factory: impl FnMut() -> T + Send + 'static) -> Self {
        let config = config.validated();
        Self {
            factory: Box::new(factory),
            free: Vec::with_capacity(config.max_size.min(config.prewarm.max(16))),
            max_size: config.max_size,
            created: 0,
            live: 0,
        }
    }

    /// Checks out a ready-to-use instance placed at `pose`.
    ///
    /// Reuses an idle instance when one is parked, otherwise constructs a
    /// fresh one.
    pub fn acquire(&mut self, pose: Pose) -> T {
        let mut item = match self.free.pop() {
            Some(item) => item,
            None => {
                self.created += 1;
                (self.factory)()
            }
        };
        item.on_acquire(pose);
        self.live += 1;
        item
    }

    /// Returns an instance to the free list.
    ///
    /// A release of an already-inactive instance is a no-op; a release
    /// past the idle cap drops the instance.
    pub fn release(&mut self, mut item: T) {
        if !item.is_active() {
            debug!("release of inactive instance ignored");
            return;
        }
        item.on_release();
        self.live = self.live.saturating_sub(1);
        if self.free.len() >= self.max_size {
            trace!(max_size = self.max_size, "idle list full, dropping instance");
            return;
        }
        self.free.push(item);
    }

    /// Constructs and parks `count` instances, yielding to the scheduler
    /// after each one.
    ///
    /// On cancellation the instances already constructed are parked
    /// synchronously (committed work stays committed) before the sequence
    /// unwinds with [`SetupError::Cancelled`].
    pub async fn prewarm(
        &mut self,
        count: usize,
        cancel: &CancelToken,
    ) -> Result<(), SetupError> {
        let mut batch = Vec::with_capacity(count);
        let mut cancelled = false;

        for _ in 0..count {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            batch.push(self.acquire(Pose::default()));
            tokio::task::yield_now().await;
        }

        let constructed = batch.len();
        for item in batch {
            self.release(item);
            if !cancelled {
                if cancel.is_cancelled() {
                    cancelled = true;
                } else {
                    tokio::task::yield_now().await;
                }
            }
        }

        if cancelled {
            debug!(constructed, requested = count, "prewarm cancelled");
            return Err(SetupError::Cancelled);
        }
        trace!(count, "prewarm complete");
        Ok(())
    }

    /// Instances currently parked in the free list.
    pub fn idle_count(&self) -> usize {
        self.free.len()
    }

    /// Instances currently checked out.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Total constructions since the pool was created.
    pub fn created_total(&self) -> u64 {
        self.created
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.free.len())
            .field("live", &self.live)
            .field("max_size", &self.max_size)
            .field("created", &self.created)
            .finish()
    }
}
