pub mod ai;
pub mod combat_loop;
pub mod consequences;
pub mod overworld;
