//! Headless auto-playing demo.
//!
//! Stands in for the excluded collaborators — physics integration, input
//! and presentation — so a whole session can run unattended: it
//! integrates enemy approach intents into positions, resolves shots as
//! instant damage reports, takes the first door after every cleared
//! wave, and logs what happens. Run with `RUST_LOG=info` (or `debug`)
//! for the full trace.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use ashgate::prelude::*;
use tokio::sync::mpsc;
use tracing::info;

/// Approximate frame time used to integrate movement intents.
const FRAME: f32 = 1.0 / 30.0;

struct Mirror {
    players: HashMap<PlayerId, Vec2>,
    enemies: HashMap<EnemyId, Vec2>,
    /// (player, enemy) pairs already reported inside the trigger radius.
    in_range: HashSet<(PlayerId, EnemyId)>,
    detection_radius: f32,
}

impl Mirror {
    fn new(detection_radius: f32) -> Self {
        Self {
            players: HashMap::new(),
            enemies: HashMap::new(),
            in_range: HashSet::new(),
            detection_radius,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let catalog = Catalog::from_json(include_str!("../catalog.json"))?;
    let config = SessionConfig::default();
    let detection_radius = config.shooter.detection_radius;

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let handle = spawn_session(config, catalog, events_tx, CancelToken::never()).await?;

    handle.add_player().await?;
    handle.add_player().await?;
    handle.play().await?;

    let mut mirror = Mirror::new(detection_radius);
    while let Some(event) = events.recv().await {
        if drive(&handle, &mut mirror, event).await? {
            break;
        }
    }

    handle.shutdown().await.ok();
    Ok(())
}

/// Reacts to one session event the way the real outer layers would.
/// Returns `true` when the session reached a terminal state.
async fn drive(
    handle: &SessionHandle,
    mirror: &mut Mirror,
    event: SessionEvent,
) -> Result<bool, AshgateError> {
    match event {
        SessionEvent::RoomEntered { name, kind, difficulty, .. } => {
            info!(room = %name, %kind, difficulty, "== entered room ==");
        }
        SessionEvent::PlayerPlaced { player, at } => {
            mirror.players.insert(player, at);
        }
        SessionEvent::EnemySpawned { id, at, .. } => {
            mirror.enemies.insert(id, at);
            check_triggers(handle, mirror, id).await?;
        }
        SessionEvent::EnemyApproach { id, toward, speed } => {
            // Naive movement integration toward the target.
            if let Some(pos) = mirror.enemies.get_mut(&id) {
                let step = (toward - *pos).normalized() * (speed * FRAME);
                *pos = *pos + step;
                let pose = Pose::at(*pos);
                handle.set_enemy_pose(id, pose).await?;
            }
            check_triggers(handle, mirror, id).await?;
        }
        SessionEvent::ShotFired { shot, .. } => {
            // Instant-travel projectile: report the hit straight back.
            handle.hit_enemy(shot.target, shot.damage).await?;
        }
        SessionEvent::EnemyDied { id, .. } => {
            mirror.enemies.remove(&id);
            mirror.in_range.retain(|(_, e)| *e != id);
        }
        SessionEvent::WaveCleared => {
            info!("wave cleared");
        }
        SessionEvent::ChoicesOffered { choices } => {
            let first = &choices[0];
            info!(room = %first.name, door = %first.door, "taking the first door");
            handle.choose_room(first.index, first.door).await?;
        }
        SessionEvent::PlayerDowned { player } => {
            info!(%player, "player downed");
        }
        SessionEvent::PlayerRevived { player } => {
            info!(%player, "player back up");
        }
        SessionEvent::LevelUp { level } => {
            info!(level, "level up");
        }
        SessionEvent::Victory => {
            info!("deck exhausted: victory");
            return Ok(true);
        }
        SessionEvent::TeamWiped => {
            info!("team wiped: game over");
            return Ok(true);
        }
        _ => {}
    }
    Ok(false)
}

/// Emulates the spatial layer's trigger callbacks for one enemy.
async fn check_triggers(
    handle: &SessionHandle,
    mirror: &mut Mirror,
    enemy: EnemyId,
) -> Result<(), AshgateError> {
    let Some(enemy_pos) = mirror.enemies.get(&enemy).copied() else {
        return Ok(());
    };
    let radius_sq = mirror.detection_radius * mirror.detection_radius;
    let players: Vec<(PlayerId, Vec2)> =
        mirror.players.iter().map(|(id, pos)| (*id, *pos)).collect();

    for (player, player_pos) in players {
        let key = (player, enemy);
        let inside = player_pos.distance_sq(enemy_pos) <= radius_sq;
        if inside && mirror.in_range.insert(key) {
            handle.range_enter(player, enemy).await?;
        } else if !inside && mirror.in_range.remove(&key) {
            handle.range_exit(player, enemy).await?;
        }
    }
    Ok(())
}
