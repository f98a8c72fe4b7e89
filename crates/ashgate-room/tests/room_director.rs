//! Integration tests for the room director: deck setup, transitions,
//! choice menus, and the won terminal state.

use std::sync::Arc;

use ashgate_defs::{
    Catalog, PlayerId, RoomDef, RoomKind, RoomLayout, Side, Vec2,
};
use ashgate_pipeline::{CancelSource, CancelToken, SetupContext, SetupError, SetupStage};
use ashgate_room::{DirectorState, RoomDirector, RoomDirectorConfig, RoomEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

fn room(name: &str, kind: RoomKind) -> RoomDef {
    RoomDef {
        name: name.into(),
        kind,
        quotas: Vec::new(),
        layout: RoomLayout {
            origin: Vec2::ZERO,
            player_spawns: vec![Vec2::new(0.0, -4.0), Vec2::new(1.0, -4.0)],
            enemy_spawns: vec![Vec2::new(3.0, 3.0), Vec2::new(-3.0, 3.0)],
            doors: vec![Side::North, Side::East, Side::South, Side::West],
        },
    }
}

/// 1 Starter, 1 Shop, 1 Boss, 3 Elite, 5 Standard.
fn catalog() -> Catalog {
    let mut rooms = vec![
        room("start", RoomKind::Starter),
        room("shop", RoomKind::Shop),
        room("boss", RoomKind::Boss),
    ];
    for i in 0..3 {
        rooms.push(room(&format!("elite-{i}"), RoomKind::Elite));
    }
    for i in 0..5 {
        rooms.push(room(&format!("standard-{i}"), RoomKind::Standard));
    }
    Catalog { rooms, enemies: Vec::new() }
}

fn ctx(seed: u64) -> SetupContext {
    SetupContext { catalog: Arc::new(catalog()), seed }
}

async fn ready_director(room_count: usize, seed: u64) -> RoomDirector {
    let mut director = RoomDirector::new(RoomDirectorConfig {
        room_count,
        ..RoomDirectorConfig::default()
    });
    director
        .setup(&ctx(seed), &CancelToken::never())
        .await
        .expect("setup succeeds");
    director
}

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn entered(events: &[RoomEvent]) -> &RoomEvent {
    events
        .iter()
        .find(|e| matches!(e, RoomEvent::Entered { .. }))
        .expect("an Entered event")
}

// =========================================================================
// Setup stage
// =========================================================================

#[tokio::test]
async fn test_setup_builds_full_deck_and_awaits_play() {
    let director = ready_director(10, 7).await;
    assert_eq!(director.deck_len(), 10);
    assert_eq!(director.unused_count(), 10);
    assert_eq!(director.state(), DirectorState::AwaitingPlay);
}

#[tokio::test]
async fn test_setup_cancelled_up_front_leaves_idle() {
    let (src, token) = CancelSource::new();
    src.cancel();

    let mut director = RoomDirector::new(RoomDirectorConfig::default());
    let err = director.setup(&ctx(7), &token).await.unwrap_err();
    assert!(matches!(err, SetupError::Cancelled));
    assert_eq!(director.state(), DirectorState::Idle);
}

#[tokio::test]
async fn test_setup_fails_on_empty_catalog() {
    let mut director = RoomDirector::new(RoomDirectorConfig::default());
    let empty = SetupContext { catalog: Arc::new(Catalog::default()), seed: 1 };
    let err = director.setup(&empty, &CancelToken::never()).await.unwrap_err();
    assert!(matches!(err, SetupError::Stage { stage: "room-deck", .. }));
}

// =========================================================================
// Begin: starter entered first
// =========================================================================

#[tokio::test]
async fn test_begin_enters_starter_at_difficulty_zero() {
    for seed in 0..20 {
        let mut director = ready_director(10, seed).await;
        let events = director.begin(&[P1]);
        match entered(&events) {
            RoomEvent::Entered { kind, difficulty, .. } => {
                assert_eq!(*kind, RoomKind::Starter, "seed {seed}");
                assert_eq!(*difficulty, 0);
            }
            _ => unreachable!(),
        }
        assert_eq!(director.state(), DirectorState::Entering);
    }
}

#[tokio::test]
async fn test_begin_outside_awaiting_play_is_ignored() {
    let mut director = RoomDirector::new(RoomDirectorConfig::default());
    assert!(director.begin(&[P1]).is_empty());
    assert_eq!(director.state(), DirectorState::Idle);
}

#[tokio::test]
async fn test_entering_settles_to_live_on_next_tick() {
    let mut director = ready_director(10, 3).await;
    director.begin(&[P1]);

    let events = director.tick();
    assert!(matches!(events.as_slice(), [RoomEvent::Live { .. }]));
    assert_eq!(director.state(), DirectorState::RoomActive);

    // Settle fires once.
    assert!(director.tick().is_empty());
}

// =========================================================================
// Placements
// =========================================================================

#[tokio::test]
async fn test_two_players_land_on_their_anchors() {
    let mut director = ready_director(10, 3).await;
    let events = director.begin(&[P1, P2]);
    match entered(&events) {
        RoomEvent::Entered { placements, .. } => {
            assert_eq!(placements.len(), 2);
            assert_eq!(placements[0], (P1, Vec2::new(0.0, -4.0)));
            assert_eq!(placements[1], (P2, Vec2::new(1.0, -4.0)));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_single_anchor_offsets_second_player() {
    let mut single = catalog();
    for r in &mut single.rooms {
        r.layout.player_spawns = vec![Vec2::new(2.0, 2.0)];
    }
    let mut director = RoomDirector::new(RoomDirectorConfig {
        coop_separation: 1.5,
        ..RoomDirectorConfig::default()
    });
    let ctx = SetupContext { catalog: Arc::new(single), seed: 3 };
    director.setup(&ctx, &CancelToken::never()).await.unwrap();

    let events = director.begin(&[P1, P2]);
    match entered(&events) {
        RoomEvent::Entered { placements, .. } => {
            assert_eq!(placements[0].1, Vec2::new(2.0, 2.0));
            assert_eq!(placements[1].1, Vec2::new(3.5, 2.0));
        }
        _ => unreachable!(),
    }
}

// =========================================================================
// Choices after a cleared wave
// =========================================================================

#[tokio::test]
async fn test_cleared_wave_offers_up_to_three_distinct_unused_rooms() {
    let mut director = ready_director(10, 11).await;
    let mut rng = StdRng::seed_from_u64(5);
    director.begin(&[P1]);
    director.tick();

    let events = director.on_wave_cleared(&mut rng);
    let RoomEvent::ChoicesOffered { choices } = &events[0] else {
        panic!("expected choices, got {events:?}");
    };
    assert_eq!(choices.len(), 3);
    let mut entries: Vec<usize> = choices.iter().map(|c| c.entry).collect();
    entries.sort_unstable();
    entries.dedup();
    assert_eq!(entries.len(), 3, "choices are distinct");
    assert_eq!(director.state(), DirectorState::ChoosingNext);
}

#[tokio::test]
async fn test_reciprocal_door_excluded_after_transition() {
    let mut director = ready_director(10, 11).await;
    let mut rng = StdRng::seed_from_u64(5);
    director.begin(&[P1]);
    director.tick();
    director.on_wave_cleared(&mut rng);

    // Leave through the east door: the next room is entered from its
    // west side, so west must not host an outgoing option.
    director.enter_choice(0, Side::East, &[P1]);
    director.tick();

    let events = director.on_wave_cleared(&mut rng);
    let RoomEvent::ChoicesOffered { choices } = &events[0] else {
        panic!("expected choices, got {events:?}");
    };
    assert!(choices.iter().all(|c| c.door != Side::West));
}

#[tokio::test]
async fn test_out_of_range_choice_falls_back_to_first_option() {
    let mut director = ready_director(10, 11).await;
    let mut rng = StdRng::seed_from_u64(5);
    director.begin(&[P1]);
    director.tick();
    let events = director.on_wave_cleared(&mut rng);
    let RoomEvent::ChoicesOffered { choices } = &events[0] else {
        panic!("expected choices");
    };
    let first_entry = choices[0].entry;

    let events = director.enter_choice(99, Side::North, &[P1]);
    match entered(&events) {
        RoomEvent::Entered { entry, difficulty, .. } => {
            assert_eq!(*entry, first_entry);
            assert_eq!(*difficulty, 1);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_wave_cleared_ignored_outside_room_active() {
    let mut director = ready_director(10, 11).await;
    let mut rng = StdRng::seed_from_u64(5);
    // Still AwaitingPlay.
    assert!(director.on_wave_cleared(&mut rng).is_empty());
}

// =========================================================================
// Transitions consume the deck; exhaustion wins
// =========================================================================

#[tokio::test]
async fn test_previous_room_destroyed_on_transition() {
    let mut director = ready_director(10, 11).await;
    let mut rng = StdRng::seed_from_u64(5);
    director.begin(&[P1]);
    director.tick();
    director.on_wave_cleared(&mut rng);

    assert_eq!(director.unused_count(), 10, "nothing consumed yet");
    director.enter_choice(0, Side::North, &[P1]);
    assert_eq!(director.unused_count(), 9, "the starter is used up");
}

#[tokio::test]
async fn test_deck_exhaustion_reaches_won() {
    // Two-room deck: starter then one transition, then the deck is dry.
    let small = Catalog {
        rooms: vec![room("start", RoomKind::Starter), room("shop", RoomKind::Shop)],
        enemies: Vec::new(),
    };
    let mut director = RoomDirector::new(RoomDirectorConfig {
        room_count: 2,
        ..RoomDirectorConfig::default()
    });
    let ctx = SetupContext { catalog: Arc::new(small), seed: 9 };
    director.setup(&ctx, &CancelToken::never()).await.unwrap();

    let mut rng = StdRng::seed_from_u64(9);
    director.begin(&[P1]);
    director.tick();

    let events = director.on_wave_cleared(&mut rng);
    assert!(matches!(events[0], RoomEvent::ChoicesOffered { .. }));

    director.enter_choice(0, Side::North, &[P1]);
    director.tick();

    let events = director.on_wave_cleared(&mut rng);
    assert_eq!(events, vec![RoomEvent::Won]);
    assert_eq!(director.state(), DirectorState::Won);
}
