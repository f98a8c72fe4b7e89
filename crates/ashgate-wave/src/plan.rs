//! Quota expansion into an ordered spawn plan.

use ashgate_defs::{EnemyKindId, EnemyQuota};
use rand::Rng;
use rand::seq::SliceRandom;

/// An ordered sequence of enemy kinds to spawn, derived from a room's
/// quotas. Immutable once built; the wave director consumes it
/// left-to-right by cursor.
#[derive(Debug, Clone, Default)]
pub struct WavePlan {
    entries: Vec<EnemyKindId>,
}

impl WavePlan {
    /// Expands quotas: each kind repeated by its count, in quota order.
    pub fn from_quotas(quotas: &[EnemyQuota]) -> Self {
        let mut entries = Vec::new();
        for quota in quotas {
            for _ in 0..quota.count {
                entries.push(quota.kind);
            }
        }
        Self { entries }
    }

    /// Applies a uniform shuffle to the whole plan.
    pub fn shuffled(mut self, rng: &mut impl Rng) -> Self {
        if self.entries.len() > 1 {
            self.entries.shuffle(rng);
        }
        self
    }

    pub fn get(&self, index: usize) -> Option<EnemyKindId> {
        self.entries.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
