use std::collections::BTreeMap;
use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

pub const AFFINITY_MIN: i32 = -100;
pub const AFFINITY_MAX: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipTier {
    Hostile,
    Wary,
    Neutral,
    Friendly,
    Bonded,
}

impl RelationshipTier {
    pub fn from_affinity(affinity: i32) -> Self {
        match affinity {
            a if a < -40 => RelationshipTier::Hostile,
            a if a < 0 => RelationshipTier::Wary,
            a if a < 30 => RelationshipTier::Neutral,
            a if a < 70 => RelationshipTier::Friendly,
            _ => RelationshipTier::Bonded,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RelationshipTier::Hostile => "Hostile",
            RelationshipTier::Wary => "Wary",
            RelationshipTier::Neutral => "Neutral",
            RelationshipTier::Friendly => "Friendly",
            RelationshipTier::Bonded => "Bonded",
        }
    }
}

impl fmt::Display for RelationshipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub affinity: i32,
    #[serde(default)]
    pub met: bool,
    #[serde(default)]
    pub conversations: u32,
}

impl Relationship {
    pub fn tier(&self) -> RelationshipTier {
        RelationshipTier::from_affinity(self.affinity)
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipBook {
    #[serde(default)]
    pub entries: BTreeMap<String, Relationship>,
}

impl RelationshipBook {
    pub fn get(&self, npc_id: &str) -> Relationship {
        self.entries.get(npc_id).copied().unwrap_or_default()
    }

    pub fn affinity(&self, npc_id: &str) -> i32 {
        self.get(npc_id).affinity
    }

    pub fn tier(&self, npc_id: &str) -> RelationshipTier {
        self.get(npc_id).tier()
    }

    /// Shift affinity, clamped to [-100, 100]. Returns the new value.
    pub fn adjust(&mut self, npc_id: &str, delta: i32) -> i32 {
        let entry = self.entries.entry(npc_id.to_string()).or_default();
        entry.affinity = (entry.affinity + delta).clamp(AFFINITY_MIN, AFFINITY_MAX);
        entry.affinity
    }

    /// Mark the npc as met. Returns true on the first meeting.
    pub fn meet(&mut self, npc_id: &str) -> bool {
        let entry = self.entries.entry(npc_id.to_string()).or_default();
        let first = !entry.met;
        entry.met = true;
        first
    }

    pub fn record_conversation(&mut self, npc_id: &str) -> u32 {
        let entry = self.entries.entry(npc_id.to_string()).or_default();
        entry.met = true;
        entry.conversations += 1;
        entry.conversations
    }
}
