//! Integration tests for the wave director using a small fixed catalog
//! and a seeded RNG.

use std::time::Duration;

use ashgate_defs::{
    Catalog, EnemyDef, EnemyKindId, EnemyQuota, RoomDef, RoomKind, RoomLayout, Vec2,
};
use ashgate_wave::{PacingConfig, SpawnOrder, WaveDirector, WaveEvent, WavePhase};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

const GOBLIN: EnemyKindId = EnemyKindId(1);
const OGRE: EnemyKindId = EnemyKindId(2);

fn enemy(kind: EnemyKindId, name: &str, max_health: f32) -> EnemyDef {
    EnemyDef {
        kind,
        name: name.into(),
        max_health,
        move_speed: 3.0,
        contact_damage: 10.0,
        attack_range: 1.5,
        attack_cooldown: Duration::from_secs(1),
        body_radius: 0.5,
    }
}

fn catalog() -> Catalog {
    Catalog {
        rooms: Vec::new(),
        enemies: vec![enemy(GOBLIN, "goblin", 25.0), enemy(OGRE, "ogre", 80.0)],
    }
}

fn room(quotas: Vec<EnemyQuota>) -> RoomDef {
    RoomDef {
        name: "arena".into(),
        kind: RoomKind::Standard,
        quotas,
        layout: RoomLayout {
            enemy_spawns: vec![Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)],
            ..RoomLayout::default()
        },
    }
}

fn goblins_and_ogre() -> RoomDef {
    room(vec![
        EnemyQuota { kind: GOBLIN, count: 3 },
        EnemyQuota { kind: OGRE, count: 1 },
    ])
}

fn fast_config() -> PacingConfig {
    PacingConfig {
        start_grace: Duration::ZERO,
        initial_interval: Duration::from_millis(200),
        final_interval: Duration::from_millis(50),
        ..PacingConfig::default()
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Ticks the director until either the phase leaves `Spawning` or the
/// step budget runs out. Returns all events and spawn orders seen.
fn run_to_drain(
    d: &mut WaveDirector,
    alive_players: u32,
    catalog: &Catalog,
    rng: &mut StdRng,
) -> (Vec<WaveEvent>, Vec<SpawnOrder>) {
    let dt = Duration::from_millis(50);
    let mut events = Vec::new();
    let mut orders = Vec::new();
    for _ in 0..10_000 {
        let (ev, or) = d.advance(dt, alive_players, catalog, rng);
        events.extend(ev);
        orders.extend(or);
        if d.phase() != WavePhase::Spawning {
            break;
        }
    }
    (events, orders)
}

fn spawned_count(events: &[WaveEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, WaveEvent::Spawned { .. }))
        .count()
}

// =========================================================================
// Empty-room fast path
// =========================================================================

#[test]
fn test_empty_quota_fires_started_then_cleared_with_no_spawns() {
    let mut d = WaveDirector::new(fast_config());
    let events = d.start(&room(Vec::new()), 0, &[], Vec2::ZERO, &mut rng());

    assert_eq!(
        events,
        vec![WaveEvent::Started { total: 0 }, WaveEvent::Cleared]
    );
    assert_eq!(d.phase(), WavePhase::Cleared);
    assert_eq!(d.spawned(), 0);
}

// =========================================================================
// Spawn counts
// =========================================================================

#[test]
fn test_spawn_count_equals_quota_sum() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    let events = d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    assert_eq!(events, vec![WaveEvent::Started { total: 4 }]);

    let (events, orders) = run_to_drain(&mut d, 1, &cat, &mut r);
    assert_eq!(spawned_count(&events), 4);
    assert_eq!(orders.len(), 4);
    assert_eq!(d.phase(), WavePhase::Draining);
    assert_eq!(d.alive(), 4);
}

#[test]
fn test_shuffle_preserves_spawn_count_and_kinds() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(PacingConfig {
        randomize_order: true,
        ..fast_config()
    });

    d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    let (_, orders) = run_to_drain(&mut d, 1, &cat, &mut r);

    assert_eq!(orders.len(), 4);
    let goblins = orders.iter().filter(|o| o.kind == GOBLIN).count();
    let ogres = orders.iter().filter(|o| o.kind == OGRE).count();
    assert_eq!(goblins, 3);
    assert_eq!(ogres, 1);
}

// =========================================================================
// Grace delay
// =========================================================================

#[test]
fn test_no_spawns_during_grace_delay() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(PacingConfig {
        start_grace: Duration::from_secs(5),
        ..fast_config()
    });
    d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);

    let (ev, orders) = d.advance(Duration::from_secs(4), 1, &cat, &mut r);
    assert!(ev.is_empty());
    assert!(orders.is_empty());

    // Grace elapses; the first spawn follows.
    d.advance(Duration::from_secs(1), 1, &cat, &mut r);
    let (ev, _) = d.advance(Duration::from_millis(1), 1, &cat, &mut r);
    assert_eq!(spawned_count(&ev), 1);
}

// =========================================================================
// Difficulty scaling
// =========================================================================

#[test]
fn test_difficulty_two_one_player_scales_all_kinds_by_same_multiplier() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    d.start(&goblins_and_ogre(), 2, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    let (events, orders) = run_to_drain(&mut d, 1, &cat, &mut r);

    assert_eq!(spawned_count(&events), 4);
    // difficulty 2, one player alive: mult = 1 + 0.25 * 2 = 1.5 for every
    // kind.
    for order in &orders {
        let base = cat.enemy(order.kind).unwrap().max_health;
        assert_eq!(order.stats.max_health, base * 1.5);
    }
}

#[test]
fn test_difficulty_zero_leaves_stats_at_baseline() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    let (_, orders) = run_to_drain(&mut d, 1, &cat, &mut r);
    for order in &orders {
        let base = cat.enemy(order.kind).unwrap().max_health;
        assert_eq!(order.stats.max_health, base);
    }
}

// =========================================================================
// Spawn points
// =========================================================================

#[test]
fn test_spawns_land_on_registered_points() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    let points = [Vec2::new(3.0, 0.0), Vec2::new(0.0, 3.0)];
    d.start(&goblins_and_ogre(), 0, &points, Vec2::ZERO, &mut r);
    let (_, orders) = run_to_drain(&mut d, 1, &cat, &mut r);
    for order in &orders {
        assert!(points.contains(&order.at));
    }
}

#[test]
fn test_missing_spawn_points_fall_back() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    let fallback = Vec2::new(7.0, 7.0);
    d.start(&goblins_and_ogre(), 0, &[], fallback, &mut r);
    let (_, orders) = run_to_drain(&mut d, 1, &cat, &mut r);
    assert!(!orders.is_empty());
    for order in &orders {
        assert_eq!(order.at, fallback);
    }
}

// =========================================================================
// Draining and clearing
// =========================================================================

#[test]
fn test_wave_clears_when_last_enemy_dies() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    run_to_drain(&mut d, 1, &cat, &mut r);
    assert_eq!(d.phase(), WavePhase::Draining);

    for _ in 0..3 {
        assert!(d.note_enemy_died().is_empty());
    }
    let events = d.note_enemy_died();
    assert_eq!(events, vec![WaveEvent::Cleared]);
    assert_eq!(d.phase(), WavePhase::Cleared);
}

#[test]
fn test_deaths_during_spawning_do_not_clear_early() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    // First spawn comes out, then dies immediately.
    let (ev, _) = d.advance(Duration::from_millis(1), 1, &cat, &mut r);
    assert_eq!(spawned_count(&ev), 1);
    assert!(d.note_enemy_died().is_empty());
    assert_eq!(d.phase(), WavePhase::Spawning, "plan not exhausted yet");
}

// =========================================================================
// Stop / restart
// =========================================================================

#[test]
fn test_stop_cancels_in_flight_wave() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    d.advance(Duration::from_millis(1), 1, &cat, &mut r);
    d.stop();

    assert_eq!(d.phase(), WavePhase::Idle);
    let (ev, orders) = d.advance(Duration::from_secs(10), 1, &cat, &mut r);
    assert!(ev.is_empty());
    assert!(orders.is_empty());

    // Death reports for the stranded enemy are harmless after stop.
    assert!(d.note_enemy_died().is_empty());
}

#[test]
fn test_start_cancels_previous_wave() {
    let cat = catalog();
    let mut r = rng();
    let mut d = WaveDirector::new(fast_config());

    d.start(&goblins_and_ogre(), 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    d.advance(Duration::from_millis(1), 1, &cat, &mut r);

    // New room: counters restart from zero.
    let solo = room(vec![EnemyQuota { kind: OGRE, count: 1 }]);
    d.start(&solo, 0, &[Vec2::ZERO], Vec2::ZERO, &mut r);
    let (events, orders) = run_to_drain(&mut d, 1, &cat, &mut r);
    assert_eq!(spawned_count(&events), 1);
    assert_eq!(orders.len(), 1);
    assert_eq!(d.alive(), 1);
}
