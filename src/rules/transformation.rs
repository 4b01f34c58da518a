use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rules::ParseEnumError;

/// Turns a transformation stays locked out after it ends.
pub const TRANSFORM_COOLDOWN_TURNS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationKind {
    CursedSurge,
    ReverseFlow,
    DomainAwakening,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformationProfile {
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub duration: u32,
    pub energy_cost: i32,
    pub min_level: u32,
}

impl TransformationKind {
    pub const ALL: [TransformationKind; 3] = [
        TransformationKind::CursedSurge,
        TransformationKind::ReverseFlow,
        TransformationKind::DomainAwakening,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TransformationKind::CursedSurge => "Cursed Surge",
            TransformationKind::ReverseFlow => "Reverse Flow",
            TransformationKind::DomainAwakening => "Domain Awakening",
        }
    }

    pub fn profile(self) -> TransformationProfile {
        match self {
            TransformationKind::CursedSurge => TransformationProfile {
                attack: 1.3,
                defense: 0.9,
                speed: 1.1,
                duration: 3,
                energy_cost: 25,
                min_level: 3,
            },
            TransformationKind::ReverseFlow => TransformationProfile {
                attack: 1.0,
                defense: 1.4,
                speed: 1.0,
                duration: 4,
                energy_cost: 30,
                min_level: 6,
            },
            TransformationKind::DomainAwakening => TransformationProfile {
                attack: 1.5,
                defense: 1.2,
                speed: 1.2,
                duration: 3,
                energy_cost: 60,
                min_level: 12,
            },
        }
    }
}

impl FromStr for TransformationKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "surge" | "cursed_surge" => Ok(TransformationKind::CursedSurge),
            "reverse" | "reverse_flow" => Ok(TransformationKind::ReverseFlow),
            "domain" | "domain_awakening" => Ok(TransformationKind::DomainAwakening),
            _ => Err(ParseEnumError {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTransformation {
    pub kind: TransformationKind,
    pub remaining_turns: u32,
}

impl ActiveTransformation {
    pub fn begin(kind: TransformationKind) -> Self {
        Self {
            kind,
            remaining_turns: kind.profile().duration,
        }
    }

    /// Count down one turn. Returns true once the transformation has run out.
    pub fn tick(&mut self) -> bool {
        self.remaining_turns = self.remaining_turns.saturating_sub(1);
        self.remaining_turns == 0
    }
}
