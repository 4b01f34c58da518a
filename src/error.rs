use thiserror::Error;

use crate::components::inventory::InventoryError;
use crate::config::ConfigError;
use crate::data::catalog::ContentError;
use crate::narrative::dialogue::DialogueError;
use crate::simulation::journal::JournalError;
use crate::simulation::origin::CreationError;
use crate::systems::combat_loop::CombatError;
use crate::world::sqlite::PersistenceError;

/// Errors surfaced by the story layer (arcs, cutscenes, encounters).
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("unknown story arc {0}")]
    UnknownArc(String),
    #[error("story arc {0} is already complete")]
    ArcComplete(String),
    #[error("chapter {0} is not available yet")]
    ChapterLocked(String),
    #[error("chapter {chapter} requires winning the encounter against {enemy}")]
    EncounterPending { chapter: String, enemy: String },
    #[error("unknown cutscene {0}")]
    UnknownCutscene(String),
    #[error("cutscene {0} is not available")]
    CutsceneLocked(String),
    #[error("unknown enemy {0}")]
    UnknownEnemy(String),
    #[error("unknown location {0}")]
    UnknownLocation(String),
    #[error("an encounter is already in progress")]
    EncounterInProgress,
    #[error("no encounter is in progress")]
    NoEncounter,
}

/// Crate-level error wrapping every subsystem failure.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error(transparent)]
    Dialogue(#[from] DialogueError),
    #[error(transparent)]
    Story(#[from] StoryError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Creation(#[from] CreationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("player entity is missing {0}")]
    MissingPlayer(&'static str),
}

pub type GameResult<T> = Result<T, GameError>;
