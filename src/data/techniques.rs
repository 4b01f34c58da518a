use crate::rules::status::{StatusApplication, StatusKind};
use crate::rules::technique::Technique;
use crate::rules::traits::{TraitKind, TraitRequirement};

/// Static description of a technique; turned into an owned `Technique` when learned.
#[derive(Debug, Clone, Copy)]
pub struct TechniqueSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub power: i32,
    pub energy_cost: i32,
    pub cooldown: u32,
    pub requirement: Option<TraitRequirement>,
    pub status: Option<StatusApplication>,
    pub targets_self: bool,
    pub min_level: u32,
}

impl TechniqueSpec {
    pub fn to_technique(&self) -> Technique {
        Technique {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            power: self.power,
            energy_cost: self.energy_cost,
            cooldown: self.cooldown,
            current_cooldown: 0,
            requirement: self.requirement,
            status: self.status,
            targets_self: self.targets_self,
            min_level: self.min_level,
        }
    }
}

const fn req(kind: TraitKind, min: u8) -> Option<TraitRequirement> {
    Some(TraitRequirement { kind, min })
}

const fn inflict(kind: StatusKind, duration: u32, potency: i32, chance: f64) -> Option<StatusApplication> {
    Some(StatusApplication {
        kind,
        duration,
        potency,
        chance,
    })
}

pub static TECHNIQUES: &[TechniqueSpec] = &[
    TechniqueSpec {
        id: "divergent_fist",
        name: "Divergent Fist",
        description: "A punch whose cursed energy lands a heartbeat after the knuckles.",
        power: 18,
        energy_cost: 10,
        cooldown: 0,
        requirement: None,
        status: None,
        targets_self: false,
        min_level: 1,
    },
    TechniqueSpec {
        id: "cursed_blast",
        name: "Cursed Blast",
        description: "Raw energy shoved outward in a scorching wave.",
        power: 26,
        energy_cost: 15,
        cooldown: 1,
        requirement: None,
        status: inflict(StatusKind::Burn, 3, 4, 0.3),
        targets_self: false,
        min_level: 1,
    },
    TechniqueSpec {
        id: "ward_shell",
        name: "Ward Shell",
        description: "Folds energy into a brittle shell that soaks the next blows.",
        power: 0,
        energy_cost: 15,
        cooldown: 3,
        requirement: req(TraitKind::Discipline, 45),
        status: inflict(StatusKind::Shield, 3, 25, 1.0),
        targets_self: true,
        min_level: 1,
    },
    TechniqueSpec {
        id: "mending_flow",
        name: "Mending Flow",
        description: "Reverses the flow of energy to knit wounds over a few breaths.",
        power: 0,
        energy_cost: 20,
        cooldown: 4,
        requirement: req(TraitKind::Compassion, 60),
        status: inflict(StatusKind::Regen, 3, 10, 1.0),
        targets_self: true,
        min_level: 2,
    },
    TechniqueSpec {
        id: "lapse_pull",
        name: "Lapse Pull",
        description: "A point of attraction that drags the target off balance.",
        power: 22,
        energy_cost: 18,
        cooldown: 2,
        requirement: req(TraitKind::Curiosity, 55),
        status: inflict(StatusKind::Stun, 1, 0, 0.35),
        targets_self: false,
        min_level: 3,
    },
    TechniqueSpec {
        id: "severing_thread",
        name: "Severing Thread",
        description: "Invisible threads that open shallow, stubborn cuts.",
        power: 20,
        energy_cost: 14,
        cooldown: 1,
        requirement: req(TraitKind::Ruthlessness, 40),
        status: inflict(StatusKind::Bleed, 3, 5, 0.6),
        targets_self: false,
        min_level: 2,
    },
    TechniqueSpec {
        id: "black_spark",
        name: "Black Spark",
        description: "Energy and impact within a millionth of a second. The world flashes black.",
        power: 45,
        energy_cost: 25,
        cooldown: 3,
        requirement: req(TraitKind::Discipline, 60),
        status: None,
        targets_self: false,
        min_level: 4,
    },
    TechniqueSpec {
        id: "reversal_burst",
        name: "Reversal Burst",
        description: "Positive energy inverted and hurled as a crimson burst.",
        power: 38,
        energy_cost: 30,
        cooldown: 3,
        requirement: req(TraitKind::Courage, 65),
        status: inflict(StatusKind::Weaken, 2, 0, 0.5),
        targets_self: false,
        min_level: 6,
    },
    TechniqueSpec {
        id: "hollow_void",
        name: "Hollow Void",
        description: "Attraction and repulsion collide into an imaginary mass that erases what it touches.",
        power: 80,
        energy_cost: 60,
        cooldown: 5,
        requirement: None,
        status: None,
        targets_self: false,
        min_level: 15,
    },
    // Cursed spirit techniques.
    TechniqueSpec {
        id: "miasma_spit",
        name: "Miasma Spit",
        description: "A glob of rotten energy.",
        power: 15,
        energy_cost: 10,
        cooldown: 1,
        requirement: None,
        status: inflict(StatusKind::Poison, 3, 3, 0.5),
        targets_self: false,
        min_level: 1,
    },
    TechniqueSpec {
        id: "grasping_hands",
        name: "Grasping Hands",
        description: "Dozens of grey hands erupt from the floor.",
        power: 12,
        energy_cost: 12,
        cooldown: 2,
        requirement: None,
        status: inflict(StatusKind::Stun, 1, 0, 0.25),
        targets_self: false,
        min_level: 1,
    },
    TechniqueSpec {
        id: "flesh_lash",
        name: "Flesh Lash",
        description: "A whip of sinew that tears on the way back.",
        power: 20,
        energy_cost: 15,
        cooldown: 1,
        requirement: None,
        status: inflict(StatusKind::Bleed, 3, 4, 0.4),
        targets_self: false,
        min_level: 1,
    },
    TechniqueSpec {
        id: "calamity_flame",
        name: "Calamity Flame",
        description: "Volcanic fire pours from the curse's skull.",
        power: 40,
        energy_cost: 30,
        cooldown: 3,
        requirement: None,
        status: inflict(StatusKind::Burn, 3, 6, 0.6),
        targets_self: false,
        min_level: 1,
    },
    TechniqueSpec {
        id: "soul_reshape",
        name: "Soul Reshape",
        description: "A touch that kneads the shape of the soul itself.",
        power: 50,
        energy_cost: 40,
        cooldown: 4,
        requirement: None,
        status: inflict(StatusKind::Weaken, 3, 0, 0.5),
        targets_self: false,
        min_level: 1,
    },
];

/// Techniques players pick up automatically on reaching a level.
pub static LEVEL_UNLOCKS: &[(u32, &str)] = &[
    (3, "cursed_blast"),
    (4, "black_spark"),
    (6, "reversal_burst"),
    (15, "hollow_void"),
];

pub fn technique_spec(id: &str) -> Option<&'static TechniqueSpec> {
    TECHNIQUES.iter().find(|spec| spec.id == id)
}

pub fn technique(id: &str) -> Option<Technique> {
    technique_spec(id).map(TechniqueSpec::to_technique)
}

/// Techniques unlocked by levels in `(from, to]`.
pub fn unlocks_between(from: u32, to: u32) -> Vec<Technique> {
    LEVEL_UNLOCKS
        .iter()
        .filter(|(level, _)| *level > from && *level <= to)
        .filter_map(|(_, id)| technique(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_unlocks_resolve() {
        let mut ids = HashSet::new();
        for spec in TECHNIQUES {
            assert!(ids.insert(spec.id), "duplicate {}", spec.id);
        }
        for (_, id) in LEVEL_UNLOCKS {
            assert!(technique_spec(id).is_some(), "{}", id);
        }
    }

    #[test]
    fn unlock_window_is_half_open() {
        let ids: Vec<String> = unlocks_between(3, 6).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["black_spark".to_string(), "reversal_burst".to_string()]);
    }
}
