use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::character::Character;
use crate::rules::status::StatusKind;
use crate::rules::transformation::TransformationKind;
use crate::simulation::modes::ModeRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    #[default]
    Open,
    Urban,
    Shrine,
    Domain,
}

impl Environment {
    pub fn technique_multiplier(self) -> f32 {
        match self {
            Environment::Domain => 1.25,
            Environment::Shrine => 1.10,
            Environment::Open | Environment::Urban => 1.0,
        }
    }

    pub fn basic_attack_multiplier(self) -> f32 {
        match self {
            Environment::Urban => 1.05,
            _ => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Environment::Open => "Open Ground",
            Environment::Urban => "Urban",
            Environment::Shrine => "Shrine",
            Environment::Domain => "Domain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatAction {
    Attack,
    Technique(String),
    Dodge,
    Guard,
    Transform(TransformationKind),
    UseItem(String),
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stance {
    #[default]
    Neutral,
    Dodging,
    Guarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatSide {
    Player,
    Enemy,
}

impl CombatSide {
    pub fn opponent(self) -> Self {
        match self {
            CombatSide::Player => CombatSide::Enemy,
            CombatSide::Enemy => CombatSide::Player,
        }
    }
}

/// A character inside a fight plus the per-fight state that never leaves it.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub character: Character,
    pub stance: Stance,
    /// Low stamina at the start of the fight weakens outgoing damage.
    pub fatigued: bool,
}

impl Combatant {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            stance: Stance::Neutral,
            fatigued: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.character.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatEnd {
    Victory,
    Defeat,
    Fled,
}

impl fmt::Display for CombatEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CombatEnd::Victory => "Victory",
            CombatEnd::Defeat => "Defeat",
            CombatEnd::Fled => "Fled",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatRewards {
    pub xp: u32,
    pub drops: Vec<(String, u32)>,
}

/// Something that happened during a round, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    Hit {
        attacker: String,
        target: String,
        technique: Option<String>,
        amount: i32,
        critical: bool,
        absorbed: i32,
    },
    Dodged {
        defender: String,
        attacker: String,
    },
    Countered {
        attacker: String,
        target: String,
        amount: i32,
    },
    DodgeFailed {
        defender: String,
    },
    Guarding {
        name: String,
        energy: i32,
    },
    Dodging {
        name: String,
    },
    StatusApplied {
        target: String,
        kind: StatusKind,
    },
    StatusDamage {
        name: String,
        kind: StatusKind,
        amount: i32,
    },
    Regenerated {
        name: String,
        amount: i32,
    },
    StatusExpired {
        name: String,
        kind: StatusKind,
    },
    Stunned {
        name: String,
    },
    Transformed {
        name: String,
        kind: TransformationKind,
    },
    TransformationEnded {
        name: String,
        kind: TransformationKind,
    },
    ItemUsed {
        name: String,
        item: String,
        detail: String,
    },
    FleeFailed {
        name: String,
    },
    Fled {
        name: String,
    },
    Defeated {
        name: String,
    },
    SpareBreath {
        name: String,
    },
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::Hit {
                attacker,
                target,
                technique,
                amount,
                critical,
                absorbed,
            } => {
                match technique {
                    Some(tech) => write!(f, "{} uses {} on {} for {} damage", attacker, tech, target, amount)?,
                    None => write!(f, "{} strikes {} for {} damage", attacker, target, amount)?,
                }
                if *critical {
                    write!(f, " (critical!)")?;
                }
                if *absorbed > 0 {
                    write!(f, " [{} absorbed by shield]", absorbed)?;
                }
                Ok(())
            }
            CombatEvent::Dodged { defender, attacker } => {
                write!(f, "{} slips past {}'s attack", defender, attacker)
            }
            CombatEvent::Countered {
                attacker,
                target,
                amount,
            } => write!(f, "{} counters {} for {} damage", attacker, target, amount),
            CombatEvent::DodgeFailed { defender } => write!(f, "{} fails to dodge", defender),
            CombatEvent::Guarding { name, energy } => {
                write!(f, "{} braces behind a guard (+{} energy)", name, energy)
            }
            CombatEvent::Dodging { name } => write!(f, "{} readies to dodge", name),
            CombatEvent::StatusApplied { target, kind } => {
                write!(f, "{} is afflicted with {}", target, kind.label())
            }
            CombatEvent::StatusDamage { name, kind, amount } => {
                write!(f, "{} takes {} {} damage", name, amount, kind.label())
            }
            CombatEvent::Regenerated { name, amount } => write!(f, "{} regenerates {} HP", name, amount),
            CombatEvent::StatusExpired { name, kind } => {
                write!(f, "{} is no longer affected by {}", name, kind.label())
            }
            CombatEvent::Stunned { name } => write!(f, "{} is stunned and loses the turn", name),
            CombatEvent::Transformed { name, kind } => write!(f, "{} enters {}", name, kind.label()),
            CombatEvent::TransformationEnded { name, kind } => {
                write!(f, "{}'s {} fades", name, kind.label())
            }
            CombatEvent::ItemUsed { name, item, detail } => write!(f, "{} uses {}: {}", name, item, detail),
            CombatEvent::FleeFailed { name } => write!(f, "{} tries to flee but is cut off", name),
            CombatEvent::Fled { name } => write!(f, "{} escapes the fight", name),
            CombatEvent::Defeated { name } => write!(f, "{} is defeated", name),
            CombatEvent::SpareBreath { name } => {
                write!(f, "{} collapses, but the training ward keeps them at 1 HP", name)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundReport {
    pub round: u32,
    pub events: Vec<CombatEvent>,
    pub ended: Option<CombatEnd>,
    pub rewards: Option<CombatRewards>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatState {
    pub active: bool,
    pub round: u32,
    pub environment: Environment,
    pub player: Combatant,
    pub enemy: Combatant,
    /// Template id the enemy was spawned from; drives rewards.
    pub enemy_id: String,
    pub log: Vec<String>,
    pub rewards: Option<CombatRewards>,
    pub rules: ModeRules,
    pub outcome: Option<CombatEnd>,
}

impl CombatState {
    pub fn side(&self, side: CombatSide) -> &Combatant {
        match side {
            CombatSide::Player => &self.player,
            CombatSide::Enemy => &self.enemy,
        }
    }

    pub fn side_mut(&mut self, side: CombatSide) -> &mut Combatant {
        match side {
            CombatSide::Player => &mut self.player,
            CombatSide::Enemy => &mut self.enemy,
        }
    }

    /// Borrow the acting side and its opponent at once.
    pub fn pair_mut(&mut self, actor: CombatSide) -> (&mut Combatant, &mut Combatant) {
        match actor {
            CombatSide::Player => (&mut self.player, &mut self.enemy),
            CombatSide::Enemy => (&mut self.enemy, &mut self.player),
        }
    }
}
