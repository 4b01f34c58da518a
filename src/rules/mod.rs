pub mod damage;
pub mod grade;
pub mod status;
pub mod technique;
pub mod traits;
pub mod transformation;

use thiserror::Error;

pub use damage::{roll_hit, HitInput, HitRoll, BASIC_ATTACK_POWER};
pub use grade::{grade_from_level, xp_to_next_level, Grade, LEVEL_CAP};
pub use status::{StatusApplication, StatusEffect, StatusKind, StatusTick};
pub use technique::{can_use, Technique, UseError};
pub use traits::{TraitKind, TraitProfile, TraitRequirement};
pub use transformation::{ActiveTransformation, TransformationKind, TRANSFORM_COOLDOWN_TURNS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown enum value: {value}")]
pub struct ParseEnumError {
    pub value: String,
}
