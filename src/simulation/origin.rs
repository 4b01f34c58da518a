use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::character::Character;
use crate::components::identity::Appearance;
use crate::data::techniques::technique;
use crate::rules::traits::TraitKind;
use crate::rules::ParseEnumError;

pub const NAME_MAX_CHARS: usize = 24;
const SHARED_STARTING_TECHNIQUE: &str = "divergent_fist";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    #[error("a sorcerer needs a name")]
    EmptyName,
    #[error("names are limited to {max} characters")]
    NameTooLong { max: usize },
    #[error("names cannot contain control characters")]
    UnprintableName,
}

/// Where the sorcerer came from. Shapes base stats, personality and the
/// first technique they know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    #[default]
    Prodigy,
    Vessel,
    ClanHeir,
    Outcast,
}

struct BackgroundProfile {
    max_hp: i32,
    max_energy: i32,
    attack: i32,
    defense: i32,
    speed: i32,
    bias: &'static [(TraitKind, i32)],
    technique: &'static str,
    summary: &'static str,
}

impl Background {
    pub const ALL: [Background; 4] = [
        Background::Prodigy,
        Background::Vessel,
        Background::ClanHeir,
        Background::Outcast,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Background::Prodigy => "Prodigy",
            Background::Vessel => "Vessel",
            Background::ClanHeir => "Clan Heir",
            Background::Outcast => "Outcast",
        }
    }

    pub fn summary(self) -> &'static str {
        self.profile().summary
    }

    fn profile(self) -> BackgroundProfile {
        match self {
            Background::Prodigy => BackgroundProfile {
                max_hp: 100,
                max_energy: 80,
                attack: 12,
                defense: 8,
                speed: 9,
                bias: &[(TraitKind::Discipline, 15), (TraitKind::Curiosity, 10)],
                technique: "ward_shell",
                summary: "Gifted from birth. Precise control, thin skin.",
            },
            Background::Vessel => BackgroundProfile {
                max_hp: 130,
                max_energy: 60,
                attack: 11,
                defense: 10,
                speed: 7,
                bias: &[(TraitKind::Compassion, 15), (TraitKind::Courage, 10)],
                technique: "mending_flow",
                summary: "Something else lives in your body. It heals you, for now.",
            },
            Background::ClanHeir => BackgroundProfile {
                max_hp: 110,
                max_energy: 70,
                attack: 10,
                defense: 11,
                speed: 8,
                bias: &[(TraitKind::Curiosity, 10), (TraitKind::Discipline, 5)],
                technique: "lapse_pull",
                summary: "Raised on an inherited technique and the weight of a family name.",
            },
            Background::Outcast => BackgroundProfile {
                max_hp: 105,
                max_energy: 65,
                attack: 13,
                defense: 7,
                speed: 10,
                bias: &[(TraitKind::Ruthlessness, 25), (TraitKind::Compassion, -10)],
                technique: "severing_thread",
                summary: "No clan, no teacher, no rules. You learned on the street.",
            },
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Background {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "prodigy" => Ok(Background::Prodigy),
            "vessel" => Ok(Background::Vessel),
            "clan_heir" | "clanheir" | "heir" => Ok(Background::ClanHeir),
            "outcast" => Ok(Background::Outcast),
            _ => Err(ParseEnumError {
                value: value.to_string(),
            }),
        }
    }
}

/// Choices collected by the creation wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBlueprint {
    pub name: String,
    pub background: Background,
    #[serde(default)]
    pub appearance: Appearance,
}

impl CharacterBlueprint {
    pub fn new(name: impl Into<String>, background: Background) -> Self {
        Self {
            name: name.into(),
            background,
            appearance: Appearance::default(),
        }
    }

    /// Validate the blueprint and roll out a level 1 sorcerer.
    pub fn build(&self) -> Result<Character, CreationError> {
        let name = validate_name(&self.name)?;
        let profile = self.background.profile();

        let mut character = Character::new(
            name,
            profile.max_hp,
            profile.max_energy,
            profile.attack,
            profile.defense,
            profile.speed,
        );
        for (kind, delta) in profile.bias {
            character.traits.adjust(*kind, *delta);
        }
        for id in [SHARED_STARTING_TECHNIQUE, profile.technique] {
            if let Some(known) = technique(id) {
                character.learn_technique(known);
            }
        }
        Ok(character)
    }
}

/// Trim and check a sorcerer name.
pub fn validate_name(raw: &str) -> Result<String, CreationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CreationError::EmptyName);
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(CreationError::NameTooLong { max: NAME_MAX_CHARS });
    }
    if name.chars().any(char::is_control) {
        return Err(CreationError::UnprintableName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_checked() {
        assert_eq!(validate_name("  Itsuki "), Ok("Itsuki".to_string()));
        assert_eq!(validate_name("   "), Err(CreationError::EmptyName));
        assert_eq!(
            validate_name(&"x".repeat(25)),
            Err(CreationError::NameTooLong { max: NAME_MAX_CHARS })
        );
        assert!(validate_name(&"é".repeat(24)).is_ok());
        assert_eq!(validate_name("bad\nname"), Err(CreationError::UnprintableName));
    }

    #[test]
    fn backgrounds_shape_the_sorcerer() {
        for background in Background::ALL {
            let character = CharacterBlueprint::new("Test", background).build().expect("build");
            assert_eq!(character.level, 1);
            assert_eq!(character.hp, character.max_hp);
            assert!(character.technique("divergent_fist").is_some());
            assert_eq!(character.techniques.len(), 2, "{}", background);
        }
        let outcast = CharacterBlueprint::new("Test", Background::Outcast).build().expect("build");
        assert_eq!(outcast.traits.get(TraitKind::Ruthlessness), 45);
        assert_eq!(outcast.traits.get(TraitKind::Compassion), 40);
        let prodigy = CharacterBlueprint::new("Test", Background::Prodigy).build().expect("build");
        assert!(prodigy.available_techniques().any(|t| t.id == "ward_shell"));
    }

    #[test]
    fn parses_background_names() {
        assert_eq!("clan-heir".parse::<Background>(), Ok(Background::ClanHeir));
        assert_eq!("Outcast".parse::<Background>(), Ok(Background::Outcast));
        assert!("noble".parse::<Background>().is_err());
    }
}
