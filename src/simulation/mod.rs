pub mod activity;
pub mod combat;
pub mod flags;
pub mod journal;
pub mod library;
pub mod location;
pub mod modes;
pub mod origin;
pub mod relationships;
pub mod rng;
pub mod time;
pub mod world_events;
