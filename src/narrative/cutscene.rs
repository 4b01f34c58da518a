use serde::{Deserialize, Serialize};

use crate::narrative::consequence::Consequence;
use crate::narrative::requirement::{all_met, RequirementContext, Requirement};
use crate::simulation::flags::StoryFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Ominous,
    Tense,
    Warm,
    Somber,
    Triumphant,
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self {
            Mood::Ominous => "ominous",
            Mood::Tense => "tense",
            Mood::Warm => "warm",
            Mood::Somber => "somber",
            Mood::Triumphant => "triumphant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub speaker: Option<String>,
    pub text: String,
}

/// A scripted scene. Cutscenes tied to an NPC are the emotional moments,
/// gated on the relationship with that character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cutscene {
    pub id: String,
    pub title: String,
    pub mood: Mood,
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub consequences: Vec<Consequence>,
    #[serde(default)]
    pub npc: Option<String>,
}

impl Cutscene {
    pub fn seen_flag(&self) -> String {
        seen_flag(&self.id)
    }

    pub fn is_emotional_moment(&self) -> bool {
        self.npc.is_some()
    }

    pub fn is_seen(&self, flags: &StoryFlags) -> bool {
        flags.is_set(&self.seen_flag())
    }

    pub fn is_pending(&self, ctx: &RequirementContext) -> bool {
        !self.is_seen(ctx.flags) && all_met(&self.requirements, ctx)
    }

    /// Consequences of the first viewing: the seen marker then the scene's own.
    pub fn first_viewing(&self) -> Vec<Consequence> {
        let mut consequences = vec![Consequence::set_flag(&self.seen_flag())];
        consequences.extend(self.consequences.iter().cloned());
        consequences
    }
}

pub fn seen_flag(cutscene_id: &str) -> String {
    format!("cutscene.{}.seen", cutscene_id)
}

pub fn pending<'a>(cutscenes: &'a [Cutscene], ctx: &RequirementContext) -> Vec<&'a Cutscene> {
    cutscenes.iter().filter(|scene| scene.is_pending(ctx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::character::Character;
    use crate::components::inventory::Inventory;
    use crate::simulation::journal::Journal;
    use crate::simulation::relationships::RelationshipBook;

    fn scene() -> Cutscene {
        Cutscene {
            id: "rooftop".into(),
            title: "Rooftop Talk".into(),
            mood: Mood::Warm,
            frames: vec![Frame {
                speaker: Some("Rin".into()),
                text: "You're not so bad.".into(),
            }],
            requirements: vec![Requirement::RelationshipAtLeast {
                npc: "rival".into(),
                affinity: 30,
            }],
            consequences: vec![Consequence::AdjustRelationship {
                npc: "rival".into(),
                delta: 10,
            }],
            npc: Some("rival".into()),
        }
    }

    #[test]
    fn pending_until_seen_and_gated_by_relationship() {
        let scenes = vec![scene()];
        let character = Character::new("Test", 100, 50, 10, 10, 10);
        let inventory = Inventory::default();
        let journal = Journal::default();
        let mut relationships = RelationshipBook::default();
        let mut flags = StoryFlags::default();

        {
            let ctx = RequirementContext {
                flags: &flags,
                character: &character,
                inventory: &inventory,
                relationships: &relationships,
                journal: &journal,
            };
            assert!(pending(&scenes, &ctx).is_empty());
        }

        relationships.adjust("rival", 40);
        {
            let ctx = RequirementContext {
                flags: &flags,
                character: &character,
                inventory: &inventory,
                relationships: &relationships,
                journal: &journal,
            };
            assert_eq!(pending(&scenes, &ctx).len(), 1);
        }

        let viewing = scenes[0].first_viewing();
        assert_eq!(viewing[0], Consequence::set_flag("cutscene.rooftop.seen"));
        flags.set("cutscene.rooftop.seen", true);
        let ctx = RequirementContext {
            flags: &flags,
            character: &character,
            inventory: &inventory,
            relationships: &relationships,
            journal: &journal,
        };
        assert!(pending(&scenes, &ctx).is_empty());
        assert!(scenes[0].is_emotional_moment());
    }
}
