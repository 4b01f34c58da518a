use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::traits::TraitKind;
use crate::simulation::flags::FlagValue;
use crate::simulation::relationships::RelationshipTier;

fn one_u32() -> u32 {
    1
}

fn one_i64() -> i64 {
    1
}

fn flag_true() -> FlagValue {
    FlagValue::Bool(true)
}

/// A single state change triggered by a choice, chapter or cutscene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Consequence {
    SetFlag {
        flag: String,
        #[serde(default = "flag_true")]
        value: FlagValue,
    },
    IncrementFlag {
        flag: String,
        #[serde(default = "one_i64")]
        by: i64,
    },
    AdjustTrait { kind: TraitKind, delta: i32 },
    AdjustRelationship { npc: String, delta: i32 },
    GrantXp { amount: u32 },
    GrantItem {
        item: String,
        #[serde(default = "one_u32")]
        quantity: u32,
    },
    RemoveItem {
        item: String,
        #[serde(default = "one_u32")]
        quantity: u32,
    },
    Heal { amount: i32 },
    RestoreEnergy { amount: i32 },
    StartQuest { quest: String },
    CompleteObjective { quest: String, objective: String },
    CompleteQuest { quest: String },
    FailQuest { quest: String },
    LearnTechnique { technique: String },
    JournalNote { text: String },
    StartEncounter { enemy: String },
}

impl Consequence {
    pub fn set_flag(flag: &str) -> Self {
        Consequence::SetFlag {
            flag: flag.to_string(),
            value: FlagValue::Bool(true),
        }
    }
}

/// What applying one consequence actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsequenceOutcome {
    FlagSet { flag: String, value: FlagValue },
    FlagIncremented { flag: String, value: i64 },
    TraitAdjusted { kind: TraitKind, value: u8 },
    RelationshipAdjusted { npc: String, affinity: i32, tier: RelationshipTier },
    XpGranted { amount: u32, levels: u32, learned: Vec<String> },
    ItemGranted { item: String, quantity: u32 },
    ItemRemoved { item: String, quantity: u32 },
    Healed { amount: i32 },
    EnergyRestored { amount: i32 },
    QuestStarted { quest: String },
    ObjectiveCompleted { quest: String, objective: String, quest_ready: bool },
    QuestCompleted { quest: String },
    QuestFailed { quest: String },
    TechniqueLearned { technique: String },
    NoteAdded,
    EncounterQueued { enemy: String },
    /// The consequence was valid but had nothing to act on.
    Skipped { reason: String },
}

impl ConsequenceOutcome {
    /// Outcomes that are pure bookkeeping and not worth echoing to the player.
    pub fn is_quiet(&self) -> bool {
        matches!(self, ConsequenceOutcome::FlagSet { .. } | ConsequenceOutcome::FlagIncremented { .. })
    }
}

impl fmt::Display for ConsequenceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsequenceOutcome::FlagSet { flag, value } => write!(f, "{} = {}", flag, value),
            ConsequenceOutcome::FlagIncremented { flag, value } => write!(f, "{} -> {}", flag, value),
            ConsequenceOutcome::TraitAdjusted { kind, value } => write!(f, "{} is now {}", kind, value),
            ConsequenceOutcome::RelationshipAdjusted { npc, affinity, tier } => {
                write!(f, "{} feels {} toward you ({})", npc, tier, affinity)
            }
            ConsequenceOutcome::XpGranted { amount, levels, learned } => {
                write!(f, "+{} XP", amount)?;
                if *levels > 0 {
                    write!(f, " ({} level(s) gained)", levels)?;
                }
                if !learned.is_empty() {
                    write!(f, ", learned {}", learned.join(", "))?;
                }
                Ok(())
            }
            ConsequenceOutcome::ItemGranted { item, quantity } => write!(f, "Received {} x{}", item, quantity),
            ConsequenceOutcome::ItemRemoved { item, quantity } => write!(f, "Handed over {} x{}", item, quantity),
            ConsequenceOutcome::Healed { amount } => write!(f, "Recovered {} HP", amount),
            ConsequenceOutcome::EnergyRestored { amount } => write!(f, "Recovered {} cursed energy", amount),
            ConsequenceOutcome::QuestStarted { quest } => write!(f, "New quest: {}", quest),
            ConsequenceOutcome::ObjectiveCompleted { quest, objective, quest_ready } => {
                write!(f, "Objective done: {} ({})", objective, quest)?;
                if *quest_ready {
                    write!(f, " - all objectives complete")?;
                }
                Ok(())
            }
            ConsequenceOutcome::QuestCompleted { quest } => write!(f, "Quest complete: {}", quest),
            ConsequenceOutcome::QuestFailed { quest } => write!(f, "Quest failed: {}", quest),
            ConsequenceOutcome::TechniqueLearned { technique } => write!(f, "Learned {}", technique),
            ConsequenceOutcome::NoteAdded => write!(f, "Journal updated"),
            ConsequenceOutcome::EncounterQueued { enemy } => write!(f, "{} attacks!", enemy),
            ConsequenceOutcome::Skipped { reason } => write!(f, "({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_from_json() {
        let json = r#"[
            {"type": "set_flag", "flag": "met_mentor"},
            {"type": "increment_flag", "flag": "exorcisms"},
            {"type": "grant_item", "item": "healing_talisman"},
            {"type": "adjust_trait", "kind": "DISCIPLINE", "delta": 5},
            {"type": "set_flag", "flag": "ally", "value": "rin"}
        ]"#;
        let parsed: Vec<Consequence> = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed[0], Consequence::set_flag("met_mentor"));
        assert_eq!(
            parsed[1],
            Consequence::IncrementFlag {
                flag: "exorcisms".into(),
                by: 1
            }
        );
        assert_eq!(
            parsed[2],
            Consequence::GrantItem {
                item: "healing_talisman".into(),
                quantity: 1
            }
        );
        assert_eq!(
            parsed[4],
            Consequence::SetFlag {
                flag: "ally".into(),
                value: FlagValue::Text("rin".into())
            }
        );
    }
}
