use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rules::ParseEnumError;

pub const TRAIT_MIN: i32 = 0;
pub const TRAIT_MAX: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraitKind {
    Courage,
    Compassion,
    Discipline,
    Ruthlessness,
    Curiosity,
}

impl TraitKind {
    pub const ALL: [TraitKind; 5] = [
        TraitKind::Courage,
        TraitKind::Compassion,
        TraitKind::Discipline,
        TraitKind::Ruthlessness,
        TraitKind::Curiosity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TraitKind::Courage => "Courage",
            TraitKind::Compassion => "Compassion",
            TraitKind::Discipline => "Discipline",
            TraitKind::Ruthlessness => "Ruthlessness",
            TraitKind::Curiosity => "Curiosity",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TraitKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COURAGE" => Ok(TraitKind::Courage),
            "COMPASSION" => Ok(TraitKind::Compassion),
            "DISCIPLINE" => Ok(TraitKind::Discipline),
            "RUTHLESSNESS" => Ok(TraitKind::Ruthlessness),
            "CURIOSITY" => Ok(TraitKind::Curiosity),
            _ => Err(ParseEnumError {
                value: s.to_string(),
            }),
        }
    }
}

/// Personality dimensions, each held in 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitProfile {
    pub courage: u8,
    pub compassion: u8,
    pub discipline: u8,
    pub ruthlessness: u8,
    pub curiosity: u8,
}

impl Default for TraitProfile {
    fn default() -> Self {
        Self {
            courage: 50,
            compassion: 50,
            discipline: 50,
            ruthlessness: 20,
            curiosity: 50,
        }
    }
}

impl TraitProfile {
    pub fn get(&self, kind: TraitKind) -> u8 {
        match kind {
            TraitKind::Courage => self.courage,
            TraitKind::Compassion => self.compassion,
            TraitKind::Discipline => self.discipline,
            TraitKind::Ruthlessness => self.ruthlessness,
            TraitKind::Curiosity => self.curiosity,
        }
    }

    fn slot_mut(&mut self, kind: TraitKind) -> &mut u8 {
        match kind {
            TraitKind::Courage => &mut self.courage,
            TraitKind::Compassion => &mut self.compassion,
            TraitKind::Discipline => &mut self.discipline,
            TraitKind::Ruthlessness => &mut self.ruthlessness,
            TraitKind::Curiosity => &mut self.curiosity,
        }
    }

    /// Shift a trait by `delta`, clamped to the valid range. Returns the new value.
    pub fn adjust(&mut self, kind: TraitKind, delta: i32) -> u8 {
        let slot = self.slot_mut(kind);
        let next = (*slot as i32 + delta).clamp(TRAIT_MIN, TRAIT_MAX);
        *slot = next as u8;
        *slot
    }

    pub fn set(&mut self, kind: TraitKind, value: u8) {
        *self.slot_mut(kind) = value.min(TRAIT_MAX as u8);
    }

    pub fn meets(&self, kind: TraitKind, min: u8) -> bool {
        self.get(kind) >= min
    }

    /// The trait with the highest value; ties resolve in declaration order.
    pub fn dominant(&self) -> TraitKind {
        let mut best = TraitKind::Courage;
        for kind in TraitKind::ALL {
            if self.get(kind) > self.get(best) {
                best = kind;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRequirement {
    pub kind: TraitKind,
    pub min: u8,
}

impl TraitRequirement {
    pub fn satisfied_by(&self, traits: &TraitProfile) -> bool {
        traits.meets(self.kind, self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_clamps_to_bounds() {
        let mut traits = TraitProfile::default();
        assert_eq!(traits.adjust(TraitKind::Courage, 80), 100);
        assert_eq!(traits.adjust(TraitKind::Ruthlessness, -45), 0);
        assert_eq!(traits.adjust(TraitKind::Curiosity, 5), 55);
    }

    #[test]
    fn dominant_picks_highest() {
        let mut traits = TraitProfile::default();
        traits.set(TraitKind::Compassion, 90);
        assert_eq!(traits.dominant(), TraitKind::Compassion);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("discipline".parse::<TraitKind>().ok(), Some(TraitKind::Discipline));
        assert!("valor".parse::<TraitKind>().is_err());
    }
}
