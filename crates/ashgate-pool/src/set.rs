//! A kind-keyed collection of pools.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use ashgate_defs::Pose;
use ashgate_pipeline::{CancelToken, SetupError};
use tracing::{debug, warn};

use crate::{Pool, PoolConfig, Recyclable};

/// One pool per entity kind.
///
/// Construction for every kind goes through a single shared `make`
/// capability, so an unregistered kind showing up at acquire time can be
/// auto-registered with [`PoolConfig::LATE_REGISTRATION`] instead of
/// failing — late registration is tolerated by design.
pub struct PoolSet<K, T> {
    make: Arc<dyn Fn(K) -> T + Send + Sync>,
    pools: HashMap<K, Pool<T>>,
    configs: HashMap<K, PoolConfig>,
}

impl<K, T> PoolSet<K, T>
where
    K: Eq + Ord + Hash + Copy + Display + Send + 'static,
    T: Recyclable + 'static,
{
    /// Creates an empty set. `make` constructs a fresh instance of the
    /// given kind; every per-kind pool derives its factory from it.
    pub fn new(make: impl Fn(K) -> T + Send + Sync + 'static) -> Self {
        Self {
            make: Arc::new(make),
            pools: HashMap::new(),
            configs: HashMap::new(),
        }
    }

    /// Registers a kind with explicit settings. Registering a kind twice
    /// keeps the first pool and is a logged no-op.
    pub fn register(&mut self, kind: K, config: PoolConfig) {
        if self.pools.contains_key(&kind) {
            debug!(%kind, "kind already registered, ignoring");
            return;
        }
        let make = Arc::clone(&self.make);
        self.pools.insert(kind, Pool::new(config, move || make(kind)));
        self.configs.insert(kind, config);
    }

    /// Checks out an instance of `kind` at `pose`.
    ///
    /// An unregistered kind auto-registers a default pool first.
    pub fn acquire(&mut self, kind: K, pose: Pose) -> T {
        if !self.pools.contains_key(&kind) {
            warn!(%kind, "acquire of unregistered kind, auto-registering default pool");
            self.register(kind, PoolConfig::LATE_REGISTRATION);
        }
        self.pools
            .get_mut(&kind)
            .expect("registered just above")
            .acquire(pose)
    }

    /// Returns an instance of `kind` to its pool. Same late-registration
    /// tolerance as [`acquire`](PoolSet::acquire).
    pub fn release(&mut self, kind: K, item: T) {
        if !self.pools.contains_key(&kind) {
            warn!(%kind, "release of unregistered kind, auto-registering default pool");
            self.register(kind, PoolConfig::LATE_REGISTRATION);
        }
        self.pools
            .get_mut(&kind)
            .expect("registered just above")
            .release(item);
    }

    /// Prewarms every registered pool to its configured count, yielding
    /// between units and honoring cancellation.
    pub async fn prewarm_all(&mut self, cancel: &CancelToken) -> Result<(), SetupError> {
        // Stable order keeps setup deterministic for a given registration
        // sequence.
        let mut kinds: Vec<K> = self.pools.keys().copied().collect();
        kinds.sort();

        for kind in kinds {
            let count = self.configs.get(&kind).map(|c| c.prewarm).unwrap_or(0);
            if count == 0 {
                continue;
            }
            debug!(%kind, count, "prewarming pool");
            self.pools
                .get_mut(&kind)
                .expect("key taken from the map")
                .prewarm(count, cancel)
                .await?;
        }
        Ok(())
    }

    /// Read access to one kind's pool, for counters and tests.
    pub fn pool(&self, kind: K) -> Option<&Pool<T>> {
        self.pools.get(&kind)
    }

    /// Registered kinds, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = K> + '_ {
        self.pools.keys().copied()
    }
}

impl<K, T> std::fmt::Debug for PoolSet<K, T>
where
    K: Eq + Hash + Copy + Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolSet")
            .field("kinds", &self.pools.len())
            .finish()
    }
}
