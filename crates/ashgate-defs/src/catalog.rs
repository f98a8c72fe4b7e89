//! The loaded definition catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{DefsError, EnemyDef, EnemyKindId, RoomDef, RoomKind};

/// The immutable set of room and enemy definitions for a session.
///
/// Loaded once at startup (typically from JSON) and shared read-only with
/// deck building and wave planning. [`Catalog::validate`] should run before
/// the catalog is handed to a session — it catches the configuration
/// errors that cannot degrade gracefully at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub rooms: Vec<RoomDef>,
    pub enemies: Vec<EnemyDef>,
}

impl Catalog {
    /// Parses a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, DefsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Looks up the definition for an enemy kind.
    pub fn enemy(&self, kind: EnemyKindId) -> Option<&EnemyDef> {
        self.enemies.iter().find(|e| e.kind == kind)
    }

    /// All room definitions of one category.
    pub fn rooms_of(&self, kind: RoomKind) -> impl Iterator<Item = &RoomDef> {
        self.rooms.iter().filter(move |r| r.kind == kind)
    }

    /// Checks catalog-level invariants.
    ///
    /// Hard errors: no rooms at all, duplicate enemy kinds, quotas that
    /// reference undefined kinds. Soft issues (a missing category, a room
    /// without enemy spawn points) only warn — deck building and the wave
    /// director have documented fallbacks for those.
    pub fn validate(&self) -> Result<(), DefsError> {
        if self.rooms.is_empty() {
            return Err(DefsError::NoRooms);
        }

        let mut seen = HashSet::new();
        for enemy in &self.enemies {
            if !seen.insert(enemy.kind) {
                return Err(DefsError::DuplicateEnemyKind(enemy.kind));
            }
        }

        for room in &self.rooms {
            for quota in &room.quotas {
                if self.enemy(quota.kind).is_none() {
                    return Err(DefsError::UnknownEnemyKind {
                        room: room.name.clone(),
                        kind: quota.kind,
                    });
                }
            }
            if room.total_enemy_count() > 0 && room.layout.enemy_spawns.is_empty() {
                warn!(room = %room.name, "room has enemy quotas but no spawn points");
            }
        }

        for kind in [RoomKind::Starter, RoomKind::Shop, RoomKind::Boss] {
            if self.rooms_of(kind).next().is_none() {
                warn!(category = %kind, "catalog has no rooms of this category");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnemyQuota, RoomLayout};
    use std::time::Duration;

    fn enemy(kind: u16) -> EnemyDef {
        EnemyDef {
            kind: EnemyKindId(kind),
            name: format!("kind-{kind}"),
            max_health: 25.0,
            move_speed: 3.0,
            contact_damage: 10.0,
            attack_range: 1.5,
            attack_cooldown: Duration::from_secs(1),
            body_radius: 0.5,
        }
    }

    fn room(name: &str, kind: RoomKind, quotas: Vec<EnemyQuota>) -> RoomDef {
        RoomDef {
            name: name.into(),
            kind,
            quotas,
            layout: RoomLayout::default(),
        }
    }

    #[test]
    fn test_validate_rejects_empty_catalog() {
        let catalog = Catalog::default();
        assert!(matches!(catalog.validate(), Err(DefsError::NoRooms)));
    }

    #[test]
    fn test_validate_rejects_unknown_quota_kind() {
        let catalog = Catalog {
            rooms: vec![room(
                "arena",
                RoomKind::Standard,
                vec![EnemyQuota { kind: EnemyKindId(9), count: 2 }],
            )],
            enemies: vec![enemy(1)],
        };
        assert!(matches!(
            catalog.validate(),
            Err(DefsError::UnknownEnemyKind { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_kind() {
        let catalog = Catalog {
            rooms: vec![room("arena", RoomKind::Standard, vec![])],
            enemies: vec![enemy(1), enemy(1)],
        };
        assert!(matches!(
            catalog.validate(),
            Err(DefsError::DuplicateEnemyKind(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = Catalog {
            rooms: vec![room(
                "arena",
                RoomKind::Starter,
                vec![EnemyQuota { kind: EnemyKindId(1), count: 3 }],
            )],
            enemies: vec![enemy(1)],
        };
        let json = serde_json::to_string(&catalog).unwrap();
        let back = Catalog::from_json(&json).unwrap();
        assert_eq!(back.rooms.len(), 1);
        assert_eq!(back.rooms[0].total_enemy_count(), 3);
        assert!(back.enemy(EnemyKindId(1)).is_some());
        assert!(back.validate().is_ok());
    }
}
