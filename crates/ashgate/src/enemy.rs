//! The pooled enemy entity and its pool stage.

use std::sync::Arc;

use ashgate_combat::{Chaser, ChaserConfig, Health, HealthConfig};
use ashgate_defs::{Catalog, EnemyId, EnemyKindId, Pose, ScaledStats};
use ashgate_pipeline::{CancelToken, SetupContext, SetupError, SetupStage};
use ashgate_pool::{PoolConfig, PoolSet, Recyclable};
use tracing::{debug, warn};

/// One recyclable enemy instance.
///
/// Base stats come from the catalog definition at construction; each
/// checkout re-applies a difficulty-scaled stat block through
/// [`configure`](Enemy::configure). The pool's hooks own the active flag
/// and transient-state reset.
#[derive(Debug)]
pub struct Enemy {
    kind: EnemyKindId,
    base_health: HealthConfig,
    base_chaser: ChaserConfig,
    body_radius: f32,
    /// Instance identity, reassigned at every checkout.
    id: EnemyId,
    pub(crate) pose: Pose,
    pub(crate) health: Health,
    pub(crate) chaser: Chaser,
    active: bool,
}

impl Enemy {
    /// Builds a fresh instance from the catalog definition. An unknown
    /// kind (late registration) falls back to default stats.
    pub(crate) fn from_catalog(catalog: &Catalog, kind: EnemyKindId) -> Self {
        let (base_health, base_chaser, body_radius) = match catalog.enemy(kind) {
            Some(def) => (
                HealthConfig {
                    max_hp: def.max_health,
                    regen_per_sec: 0.0,
                    ..HealthConfig::default()
                },
                ChaserConfig {
                    attack_range: def.attack_range,
                    attack_cooldown: def.attack_cooldown,
                    damage: def.contact_damage,
                    move_speed: def.move_speed,
                    ..ChaserConfig::default()
                },
                def.body_radius,
            ),
            None => {
                warn!(%kind, "constructing enemy for unknown kind with default stats");
                (HealthConfig::default(), ChaserConfig::default(), 0.5)
            }
        };
        Self {
            kind,
            base_health,
            base_chaser,
            body_radius,
            id: EnemyId(0),
            pose: Pose::default(),
            health: Health::new(base_health),
            chaser: Chaser::new(base_chaser),
            active: false,
        }
    }

    /// Applies identity and the difficulty-scaled stat block right after
    /// checkout.
    pub(crate) fn configure(&mut self, id: EnemyId, stats: ScaledStats) {
        self.id = id;
        self.health = Health::new(HealthConfig {
            max_hp: stats.max_health,
            ..self.base_health
        });
        self.chaser = Chaser::new(ChaserConfig {
            move_speed: stats.move_speed,
            damage: stats.contact_damage,
            ..self.base_chaser
        });
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn kind(&self) -> EnemyKindId {
        self.kind
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn body_radius(&self) -> f32 {
        self.body_radius
    }
}

impl Recyclable for Enemy {
    fn on_acquire(&mut self, pose: Pose) {
        self.pose = pose;
        self.active = true;
    }

    fn on_release(&mut self) {
        self.chaser.reset();
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ---------------------------------------------------------------------------
// Pool stage
// ---------------------------------------------------------------------------

/// The enemy pools and their setup stage.
///
/// Registers one pool per catalog enemy kind and prewarms them during
/// the pipeline, one yield per constructed instance.
pub(crate) struct EnemyPools {
    set: PoolSet<EnemyKindId, Enemy>,
    config: PoolConfig,
}

impl EnemyPools {
    pub(crate) fn new(catalog: Arc<Catalog>, config: PoolConfig) -> Self {
        let set = PoolSet::new(move |kind| Enemy::from_catalog(&catalog, kind));
        Self { set, config }
    }

    pub(crate) fn acquire(&mut self, kind: EnemyKindId, pose: Pose) -> Enemy {
        self.set.acquire(kind, pose)
    }

    pub(crate) fn release(&mut self, kind: EnemyKindId, enemy: Enemy) {
        self.set.release(kind, enemy);
    }
}

impl SetupStage for EnemyPools {
    fn name(&self) -> &'static str {
        "enemy-pools"
    }

    async fn setup(
        &mut self,
        ctx: &SetupContext,
        cancel: &CancelToken,
    ) -> Result<(), SetupError> {
        for def in &ctx.catalog.enemies {
            self.set.register(def.kind, self.config);
        }
        debug!(kinds = ctx.catalog.enemies.len(), "enemy pools registered");
        self.set.prewarm_all(cancel).await
    }
}
