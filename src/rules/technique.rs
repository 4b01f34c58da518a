use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::status::StatusApplication;
use crate::rules::traits::{TraitProfile, TraitRequirement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub id: String,
    pub name: String,
    pub description: String,
    pub power: i32,
    pub energy_cost: i32,
    pub cooldown: u32,
    #[serde(default)]
    pub current_cooldown: u32,
    #[serde(default)]
    pub requirement: Option<TraitRequirement>,
    #[serde(default)]
    pub status: Option<StatusApplication>,
    /// Support techniques land their status on the user instead of the target.
    #[serde(default)]
    pub targets_self: bool,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
}

fn default_min_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseError {
    #[error("{0} is locked behind {1}")]
    Locked(String, String),
    #[error("{0} needs level {1}")]
    LevelTooLow(String, u32),
    #[error("{0} is on cooldown for {1} more turn(s)")]
    OnCooldown(String, u32),
    #[error("{name} needs {needed} cursed energy, only {available} left")]
    NotEnoughEnergy {
        name: String,
        needed: i32,
        available: i32,
    },
}

impl Technique {
    pub fn is_ready(&self) -> bool {
        self.current_cooldown == 0
    }

    pub fn unlocked_for(&self, level: u32, traits: &TraitProfile) -> bool {
        level >= self.min_level
            && self
                .requirement
                .map(|req| req.satisfied_by(traits))
                .unwrap_or(true)
    }

    pub fn tick_cooldown(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
    }

    /// Cooldown counts down at end of round, so the extra turn keeps the
    /// technique unusable for `cooldown` full turns after it fires.
    pub fn trigger_cooldown(&mut self) {
        if self.cooldown > 0 {
            self.current_cooldown = self.cooldown + 1;
        }
    }
}

/// Check whether a technique can fire right now, in the order a player would care
/// about: unlocked at all, then cooldown, then energy.
pub fn can_use(
    technique: &Technique,
    level: u32,
    traits: &TraitProfile,
    energy: i32,
) -> Result<(), UseError> {
    if level < technique.min_level {
        return Err(UseError::LevelTooLow(
            technique.name.clone(),
            technique.min_level,
        ));
    }
    if let Some(req) = technique.requirement {
        if !req.satisfied_by(traits) {
            return Err(UseError::Locked(
                technique.name.clone(),
                format!("{} {}", req.kind, req.min),
            ));
        }
    }
    if !technique.is_ready() {
        return Err(UseError::OnCooldown(
            technique.name.clone(),
            technique.current_cooldown,
        ));
    }
    if energy < technique.energy_cost {
        return Err(UseError::NotEnoughEnergy {
            name: technique.name.clone(),
            needed: technique.energy_cost,
            available: energy,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::traits::TraitKind;

    fn sample() -> Technique {
        Technique {
            id: "test".to_string(),
            name: "Test Strike".to_string(),
            description: String::new(),
            power: 20,
            energy_cost: 15,
            cooldown: 2,
            current_cooldown: 0,
            requirement: Some(TraitRequirement {
                kind: TraitKind::Courage,
                min: 60,
            }),
            status: None,
            targets_self: false,
            min_level: 2,
        }
    }

    #[test]
    fn gates_in_order() {
        let mut traits = TraitProfile::default();
        let tech = sample();
        assert!(matches!(
            can_use(&tech, 1, &traits, 100),
            Err(UseError::LevelTooLow(_, 2))
        ));
        assert!(matches!(
            can_use(&tech, 2, &traits, 100),
            Err(UseError::Locked(_, _))
        ));
        traits.set(TraitKind::Courage, 60);
        assert!(matches!(
            can_use(&tech, 2, &traits, 10),
            Err(UseError::NotEnoughEnergy { needed: 15, .. })
        ));
        assert!(can_use(&tech, 2, &traits, 15).is_ok());
    }

    #[test]
    fn cooldown_blocks_until_ticked_out() {
        let traits = TraitProfile {
            courage: 80,
            ..TraitProfile::default()
        };
        let mut tech = sample();
        tech.trigger_cooldown();
        tech.tick_cooldown();
        assert!(matches!(
            can_use(&tech, 5, &traits, 100),
            Err(UseError::OnCooldown(_, 2))
        ));
        tech.tick_cooldown();
        tech.tick_cooldown();
        assert!(can_use(&tech, 5, &traits, 100).is_ok());
    }
}
