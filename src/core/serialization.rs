use std::fs;
use std::path::Path;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::components::character::Character;
use crate::components::identity::Appearance;
use crate::components::inventory::Inventory;
use crate::components::stamina::StaminaPool;
use crate::error::{GameError, GameResult};
use crate::narrative::arcs::ArcProgress;
use crate::simulation::flags::StoryFlags;
use crate::simulation::journal::Journal;
use crate::simulation::location::CurrentLocation;
use crate::simulation::modes::ModeProgress;
use crate::simulation::relationships::RelationshipBook;
use crate::simulation::rng::GameRng;
use crate::simulation::time::GameTime;
use crate::simulation::world_events::WorldEvents;
use crate::world::sqlite::PersistenceError;

pub const SAVE_VERSION: u32 = 1;

fn default_save_version() -> u32 {
    SAVE_VERSION
}

/// Everything attached to the player entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlayer {
    pub character: Character,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub stamina: StaminaPool,
    #[serde(default)]
    pub appearance: Appearance,
}

/// Whole-game save: the player plus every persistent resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    #[serde(default = "default_save_version")]
    pub version: u32,
    pub seed: u64,
    pub time: GameTime,
    pub player: SavedPlayer,
    #[serde(default)]
    pub location: CurrentLocation,
    #[serde(default)]
    pub flags: StoryFlags,
    #[serde(default)]
    pub journal: Journal,
    #[serde(default)]
    pub relationships: RelationshipBook,
    #[serde(default)]
    pub arcs: ArcProgress,
    #[serde(default)]
    pub world_events: WorldEvents,
    #[serde(default)]
    pub modes: ModeProgress,
}

impl SaveState {
    pub fn check_version(&self) -> Result<(), PersistenceError> {
        if self.version > SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: self.version,
                supported: SAVE_VERSION,
            });
        }
        Ok(())
    }
}

fn player_clone<T: Component + Clone>(world: &World, player: Entity, what: &'static str) -> GameResult<T> {
    world.get::<T>(player).cloned().ok_or(GameError::MissingPlayer(what))
}

/// Extract a serializable snapshot of the world.
pub fn extract_state_from_world(world: &World, player: Entity, seed: u64) -> GameResult<SaveState> {
    Ok(SaveState {
        version: SAVE_VERSION,
        seed,
        time: world.resource::<GameTime>().clone(),
        player: SavedPlayer {
            character: player_clone(world, player, "character")?,
            inventory: player_clone(world, player, "inventory")?,
            stamina: player_clone(world, player, "stamina")?,
            appearance: player_clone(world, player, "appearance")?,
        },
        location: world.resource::<CurrentLocation>().clone(),
        flags: world.resource::<StoryFlags>().clone(),
        journal: world.resource::<Journal>().clone(),
        relationships: world.resource::<RelationshipBook>().clone(),
        arcs: world.resource::<ArcProgress>().clone(),
        world_events: world.resource::<WorldEvents>().clone(),
        modes: world.resource::<ModeProgress>().clone(),
    })
}

/// Apply a saved snapshot back into the world, replacing the player's
/// components and every persistent resource.
pub fn apply_state_to_world(state: SaveState, world: &mut World, player: Entity) -> GameResult<()> {
    state.check_version()?;

    let mut entity = world
        .get_entity_mut(player)
        .ok_or(GameError::MissingPlayer("entity"))?;
    entity.insert((
        state.player.character,
        state.player.inventory,
        state.player.stamina,
        state.player.appearance,
    ));

    // Reseed from the save so a reload replays the same rolls.
    let reseed = state.seed ^ state.time.tick;
    world.insert_resource(state.time);
    world.insert_resource(state.location);
    world.insert_resource(state.flags);
    world.insert_resource(state.journal);
    world.insert_resource(state.relationships);
    world.insert_resource(state.arcs);
    world.insert_resource(state.world_events);
    world.insert_resource(state.modes);
    world.insert_resource(GameRng::seeded(reseed));
    Ok(())
}

pub fn save_state_to_path(state: &SaveState, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "game saved");
    Ok(())
}

pub fn load_state_from_path(path: impl AsRef<Path>) -> Result<SaveState, PersistenceError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let state: SaveState = serde_json::from_str(&raw)?;
    state.check_version()?;
    info!(path = %path.display(), version = state.version, "save loaded");
    Ok(state)
}
