pub mod arcs;
pub mod consequence;
pub mod cutscene;
pub mod dialogue;
pub mod requirement;
