use serde::{Deserialize, Serialize};

use crate::components::character::Character;
use crate::components::inventory::Inventory;
use crate::data::items::item_name;
use crate::rules::traits::TraitKind;
use crate::simulation::flags::StoryFlags;
use crate::simulation::journal::Journal;
use crate::simulation::relationships::RelationshipBook;

fn one() -> u32 {
    1
}

/// A gate on dialogue choices, chapters and cutscenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    FlagSet { flag: String },
    FlagUnset { flag: String },
    FlagAtLeast { flag: String, value: i64 },
    TraitAtLeast { kind: TraitKind, value: u8 },
    TraitAtMost { kind: TraitKind, value: u8 },
    RelationshipAtLeast { npc: String, affinity: i32 },
    LevelAtLeast { level: u32 },
    HasItem {
        item: String,
        #[serde(default = "one")]
        quantity: u32,
    },
    QuestActive { quest: String },
    QuestCompleted { quest: String },
}

/// Read-only view of everything a requirement may look at.
#[derive(Debug, Clone, Copy)]
pub struct RequirementContext<'a> {
    pub flags: &'a StoryFlags,
    pub character: &'a Character,
    pub inventory: &'a Inventory,
    pub relationships: &'a RelationshipBook,
    pub journal: &'a Journal,
}

impl Requirement {
    pub fn is_met(&self, ctx: &RequirementContext) -> bool {
        match self {
            Requirement::FlagSet { flag } => ctx.flags.is_set(flag),
            Requirement::FlagUnset { flag } => !ctx.flags.is_set(flag),
            Requirement::FlagAtLeast { flag, value } => ctx.flags.int(flag) >= *value,
            Requirement::TraitAtLeast { kind, value } => ctx.character.traits.get(*kind) >= *value,
            Requirement::TraitAtMost { kind, value } => ctx.character.traits.get(*kind) <= *value,
            Requirement::RelationshipAtLeast { npc, affinity } => ctx.relationships.affinity(npc) >= *affinity,
            Requirement::LevelAtLeast { level } => ctx.character.level >= *level,
            Requirement::HasItem { item, quantity } => ctx.inventory.has(item, *quantity),
            Requirement::QuestActive { quest } => ctx.journal.is_active(quest),
            Requirement::QuestCompleted { quest } => ctx.journal.is_completed(quest),
        }
    }

    /// Short player-facing hint, shown next to locked options.
    pub fn describe(&self) -> String {
        match self {
            Requirement::FlagSet { flag } => format!("requires {}", flag),
            Requirement::FlagUnset { flag } => format!("unavailable after {}", flag),
            Requirement::FlagAtLeast { flag, value } => format!("{} >= {}", flag, value),
            Requirement::TraitAtLeast { kind, value } => format!("{} {}+", kind, value),
            Requirement::TraitAtMost { kind, value } => format!("{} at most {}", kind, value),
            Requirement::RelationshipAtLeast { npc, affinity } => format!("{} affinity {}+", npc, affinity),
            Requirement::LevelAtLeast { level } => format!("level {}+", level),
            Requirement::HasItem { item, quantity } => format!("{} x{}", item_name(item), quantity),
            Requirement::QuestActive { quest } => format!("quest {} active", quest),
            Requirement::QuestCompleted { quest } => format!("quest {} completed", quest),
        }
    }
}

pub fn all_met(requirements: &[Requirement], ctx: &RequirementContext) -> bool {
    requirements.iter().all(|req| req.is_met(ctx))
}

/// Requirements from `requirements` that currently fail.
pub fn unmet<'r>(requirements: &'r [Requirement], ctx: &RequirementContext) -> Vec<&'r Requirement> {
    requirements.iter().filter(|req| !req.is_met(ctx)).collect()
}
