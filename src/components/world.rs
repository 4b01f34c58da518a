use bevy_ecs::prelude::*;

/// Marker component for the player-controlled sorcerer.
#[derive(Component, Debug, Default)]
pub struct Player;
