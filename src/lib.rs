// Re-export core modules for use by the binary or other consumers
pub mod components;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod narrative;
pub mod rules;
pub mod simulation;
pub mod systems;
pub mod ui;
pub mod world;

// Expose the main Game wrapper and types needed for interaction
pub use crate::core::serialization::SaveState;
pub use crate::core::world::{
    ArcSummary, ChoiceOutcome, CombatTurn, CutsceneViewing, DialogueView, Game, Snapshot, StoryStep,
};
pub use crate::error::{GameError, GameResult};
pub use crate::simulation::combat::CombatAction;
pub use crate::simulation::origin::{Background, CharacterBlueprint};
pub use crate::systems::overworld::ActionIntent;
