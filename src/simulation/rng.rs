use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded generator shared by overworld systems and combat.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}
