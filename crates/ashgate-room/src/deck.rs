//! Deck sampling and pre-instantiated room entries.

use ashgate_defs::{RoomDef, RoomKind, Side, Vec2};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::DeckError;

// ---------------------------------------------------------------------------
// Deck construction
// ---------------------------------------------------------------------------

/// Samples a deck of `count` room definitions from the catalog.
///
/// Guarantees, subject to availability: one Starter, one Shop, one Boss,
/// up to two Elite, the remainder Standard. When the Standard category
/// runs dry the filler falls back to Elite, then to any definition at
/// all. The result is uniformly shuffled; the Starter is *entered* first
/// regardless of its shuffle position.
pub fn build_deck(
    rooms: &[RoomDef],
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<RoomDef>, DeckError> {
    if rooms.is_empty() {
        return Err(DeckError::EmptyCatalog);
    }
    let count = count.max(1);

    let of = |kind: RoomKind| -> Vec<&RoomDef> {
        rooms.iter().filter(|r| r.kind == kind).collect()
    };
    let starters = of(RoomKind::Starter);
    let shops = of(RoomKind::Shop);
    let bosses = of(RoomKind::Boss);
    let elites = of(RoomKind::Elite);
    let standards = of(RoomKind::Standard);

    let mut deck: Vec<RoomDef> = Vec::with_capacity(count);
    let mut pick_one = |deck: &mut Vec<RoomDef>, src: &[&RoomDef]| {
        if deck.len() < count {
            if let Some(def) = src.choose(rng) {
                deck.push((*def).clone());
            }
        }
    };

    pick_one(&mut deck, &starters);
    pick_one(&mut deck, &shops);
    pick_one(&mut deck, &bosses);

    for _ in 0..2 {
        if elites.is_empty() || deck.len() >= count {
            break;
        }
        deck.push((*elites.choose(rng).expect("non-empty")).clone());
    }

    while deck.len() < count {
        let def = if !standards.is_empty() {
            *standards.choose(rng).expect("non-empty")
        } else if !elites.is_empty() {
            *elites.choose(rng).expect("non-empty")
        } else {
            rooms.choose(rng).expect("checked non-empty above")
        };
        deck.push(def.clone());
    }

    deck.shuffle(rng);
    deck.truncate(count);
    Ok(deck)
}

// ---------------------------------------------------------------------------
// Instances & entries
// ---------------------------------------------------------------------------

/// A pre-instantiated scene copy of a room definition.
///
/// All anchors are resolved into typed fields once, at instantiation —
/// nothing searches by name or tag at runtime. Instances start disabled
/// and are activated exactly when their entry becomes the active room.
#[derive(Debug, Clone)]
pub struct RoomInstance {
    pub origin: Vec2,
    pub player_spawns: Vec<Vec2>,
    pub enemy_spawns: Vec<Vec2>,
    pub doors: Vec<Side>,
    active: bool,
}

impl RoomInstance {
    /// Resolves a definition's layout into a disabled instance.
    /// Duplicate enemy spawn points are dropped here, once.
    pub fn instantiate(def: &RoomDef) -> Self {
        let mut enemy_spawns: Vec<Vec2> = Vec::with_capacity(def.layout.enemy_spawns.len());
        for p in &def.layout.enemy_spawns {
            if !enemy_spawns.contains(p) {
                enemy_spawns.push(*p);
            }
        }
        Self {
            origin: def.layout.origin,
            player_spawns: def.layout.player_spawns.clone(),
            enemy_spawns,
            doors: def.layout.doors.clone(),
            active: false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A deck slot: the sampled definition, its pre-instantiated disabled
/// instance, and the used flag.
///
/// At most one entry is active at any time; used entries are never
/// revisited. The instance is dropped (`None`) when the entry is
/// superseded as the active room.
#[derive(Debug)]
pub struct DeckEntry {
    pub def: RoomDef,
    pub instance: Option<RoomInstance>,
    pub used: bool,
}

impl DeckEntry {
    pub fn new(def: RoomDef) -> Self {
        let instance = RoomInstance::instantiate(&def);
        Self { def, instance: Some(instance), used: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ashgate_defs::RoomLayout;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn def(name: &str, kind: RoomKind) -> RoomDef {
        RoomDef {
            name: name.into(),
            kind,
            quotas: Vec::new(),
            layout: RoomLayout::default(),
        }
    }

    /// 1 Starter, 1 Shop, 1 Boss, 3 Elite, 5 Standard.
    fn full_catalog() -> Vec<RoomDef> {
        let mut rooms = vec![
            def("start", RoomKind::Starter),
            def("shop", RoomKind::Shop),
            def("boss", RoomKind::Boss),
        ];
        for i in 0..3 {
            rooms.push(def(&format!("elite-{i}"), RoomKind::Elite));
        }
        for i in 0..5 {
            rooms.push(def(&format!("standard-{i}"), RoomKind::Standard));
        }
        rooms
    }

    fn count_of(deck: &[RoomDef], kind: RoomKind) -> usize {
        deck.iter().filter(|r| r.kind == kind).count()
    }

    #[test]
    fn test_deck_of_ten_meets_category_quotas() {
        // Many seeds: the quota guarantee is not a fluke of one shuffle.
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let deck = build_deck(&full_catalog(), 10, &mut rng).unwrap();

            assert_eq!(deck.len(), 10);
            assert_eq!(count_of(&deck, RoomKind::Starter), 1);
            assert_eq!(count_of(&deck, RoomKind::Shop), 1);
            assert_eq!(count_of(&deck, RoomKind::Boss), 1);
            assert_eq!(count_of(&deck, RoomKind::Elite), 2);
            assert_eq!(count_of(&deck, RoomKind::Standard), 5);
        }
    }

    #[test]
    fn test_deck_falls_back_to_elite_when_standard_exhausted() {
        let rooms = vec![
            def("start", RoomKind::Starter),
            def("elite", RoomKind::Elite),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let deck = build_deck(&rooms, 6, &mut rng).unwrap();
        assert_eq!(deck.len(), 6);
        assert_eq!(count_of(&deck, RoomKind::Starter), 1);
        assert_eq!(count_of(&deck, RoomKind::Elite), 5);
    }

    #[test]
    fn test_deck_falls_back_to_any_definition() {
        let rooms = vec![def("shop", RoomKind::Shop)];
        let mut rng = StdRng::seed_from_u64(1);
        let deck = build_deck(&rooms, 4, &mut rng).unwrap();
        assert_eq!(deck.len(), 4);
        assert_eq!(count_of(&deck, RoomKind::Shop), 4);
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            build_deck(&[], 10, &mut rng),
            Err(DeckError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_instantiate_dedups_enemy_spawns() {
        let mut room = def("arena", RoomKind::Standard);
        room.layout.enemy_spawns = vec![
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
        ];
        let instance = RoomInstance::instantiate(&room);
        assert_eq!(instance.enemy_spawns.len(), 2);
        assert!(!instance.is_active());
    }
}
