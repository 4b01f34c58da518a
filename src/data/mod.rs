pub mod arcs;
pub mod catalog;
pub mod cutscenes;
pub mod dialogues;
pub mod enemies;
pub mod items;
pub mod locations;
pub mod npcs;
pub mod quests;
pub mod techniques;
pub mod world_events;
