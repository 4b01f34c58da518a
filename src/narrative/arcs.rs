use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::StoryError;
use crate::narrative::consequence::Consequence;
use crate::narrative::requirement::{unmet, RequirementContext, Requirement};
use crate::simulation::flags::StoryFlags;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub intro: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Enemy that must be beaten before the chapter can close.
    #[serde(default)]
    pub encounter: Option<String>,
    /// Dialogue opened once the chapter closes.
    #[serde(default)]
    pub dialogue: Option<String>,
    pub completion_flag: String,
    #[serde(default)]
    pub rewards: Vec<Consequence>,
}

impl Chapter {
    /// Flag set when the chapter's encounter has been won.
    pub fn cleared_flag(&self, arc_id: &str) -> String {
        cleared_flag(arc_id, &self.id)
    }

    /// The encounter still standing between the player and this chapter's end.
    pub fn pending_encounter(&self, arc_id: &str, flags: &StoryFlags) -> Option<&str> {
        self.encounter
            .as_deref()
            .filter(|_| !flags.is_set(&self.cleared_flag(arc_id)))
    }
}

/// Chapter ids are only unique within their arc.
pub fn cleared_flag(arc_id: &str, chapter_id: &str) -> String {
    format!("chapter.{}.{}.cleared", arc_id, chapter_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryArc {
    pub id: String,
    pub title: String,
    pub chapters: Vec<Chapter>,
}

impl StoryArc {
    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcState {
    pub chapter: usize,
    pub completed: bool,
}

/// Chapter cursor for every arc the player has touched.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcProgress {
    #[serde(default)]
    pub arcs: BTreeMap<String, ArcState>,
}

impl ArcProgress {
    pub fn state(&self, arc_id: &str) -> ArcState {
        self.arcs.get(arc_id).copied().unwrap_or_default()
    }

    pub fn is_complete(&self, arc_id: &str) -> bool {
        self.state(arc_id).completed
    }
}

/// Result of closing a chapter. The consequences still have to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterCompletion {
    pub chapter_id: String,
    pub consequences: Vec<Consequence>,
    pub dialogue: Option<String>,
    pub arc_finished: bool,
}

/// The chapter the player is on, if its requirements hold.
pub fn next_chapter<'a>(
    arc: &'a StoryArc,
    progress: &ArcProgress,
    ctx: &RequirementContext,
) -> Result<&'a Chapter, StoryError> {
    let state = progress.state(&arc.id);
    if state.completed {
        return Err(StoryError::ArcComplete(arc.id.clone()));
    }
    let chapter = arc
        .chapters
        .get(state.chapter)
        .ok_or_else(|| StoryError::ArcComplete(arc.id.clone()))?;
    if !unmet(&chapter.requirements, ctx).is_empty() {
        return Err(StoryError::ChapterLocked(chapter.id.clone()));
    }
    Ok(chapter)
}

/// Advance past the current chapter and hand back what it grants.
pub fn complete_chapter(
    arc: &StoryArc,
    progress: &mut ArcProgress,
    flags: &StoryFlags,
) -> Result<ChapterCompletion, StoryError> {
    let state = progress.arcs.entry(arc.id.clone()).or_default();
    if state.completed {
        return Err(StoryError::ArcComplete(arc.id.clone()));
    }
    let chapter = arc
        .chapters
        .get(state.chapter)
        .ok_or_else(|| StoryError::ArcComplete(arc.id.clone()))?;
    if let Some(enemy) = chapter.pending_encounter(&arc.id, flags) {
        return Err(StoryError::EncounterPending {
            chapter: chapter.id.clone(),
            enemy: enemy.to_string(),
        });
    }

    let mut consequences = vec![Consequence::set_flag(&chapter.completion_flag)];
    consequences.extend(chapter.rewards.iter().cloned());

    state.chapter += 1;
    if state.chapter >= arc.chapters.len() {
        state.completed = true;
    }

    Ok(ChapterCompletion {
        chapter_id: chapter.id.clone(),
        consequences,
        dialogue: chapter.dialogue.clone(),
        arc_finished: state.completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::character::Character;
    use crate::components::inventory::Inventory;
    use crate::simulation::journal::Journal;
    use crate::simulation::relationships::RelationshipBook;

    fn arc() -> StoryArc {
        StoryArc {
            id: "prologue".into(),
            title: "Prologue".into(),
            chapters: vec![
                Chapter {
                    id: "awakening".into(),
                    title: "Awakening".into(),
                    intro: "Something stirs.".into(),
                    requirements: vec![],
                    encounter: Some("fly_head".into()),
                    dialogue: None,
                    completion_flag: "prologue.awakening".into(),
                    rewards: vec![Consequence::GrantXp { amount: 50 }],
                },
                Chapter {
                    id: "enrolment".into(),
                    title: "Enrolment".into(),
                    intro: "The academy gates open.".into(),
                    requirements: vec![Requirement::LevelAtLeast { level: 2 }],
                    encounter: None,
                    dialogue: Some("mentor_intro".into()),
                    completion_flag: "prologue.enrolment".into(),
                    rewards: vec![],
                },
            ],
        }
    }

    fn check<T>(level: u32, flags: &StoryFlags, f: impl FnOnce(&RequirementContext) -> T) -> T {
        let mut character = Character::new("Test", 100, 50, 10, 10, 10);
        character.level = level;
        let inventory = Inventory::default();
        let relationships = RelationshipBook::default();
        let journal = Journal::default();
        let ctx = RequirementContext {
            flags,
            character: &character,
            inventory: &inventory,
            relationships: &relationships,
            journal: &journal,
        };
        f(&ctx)
    }

    #[test]
    fn encounter_blocks_completion_until_cleared() {
        let arc = arc();
        let mut progress = ArcProgress::default();
        let mut flags = StoryFlags::default();

        let chapter = check(1, &flags, |ctx| next_chapter(&arc, &progress, ctx).map(|c| c.id.clone()));
        assert_eq!(chapter.expect("open"), "awakening");
        assert!(matches!(
            complete_chapter(&arc, &mut progress, &flags),
            Err(StoryError::EncounterPending { .. })
        ));

        flags.set(cleared_flag("prologue", "awakening"), true);
        let done = complete_chapter(&arc, &mut progress, &flags).expect("complete");
        assert_eq!(done.consequences[0], Consequence::set_flag("prologue.awakening"));
        assert_eq!(done.consequences.len(), 2);
        assert!(!done.arc_finished);
        assert_eq!(progress.state("prologue").chapter, 1);
    }

    #[test]
    fn requirements_lock_chapters_and_the_arc_finishes() {
        let arc = arc();
        let mut progress = ArcProgress::default();
        progress.arcs.insert("prologue".into(), ArcState { chapter: 1, completed: false });
        let flags = StoryFlags::default();

        let locked = check(1, &flags, |ctx| next_chapter(&arc, &progress, ctx).map(|c| c.id.clone()));
        assert!(matches!(locked, Err(StoryError::ChapterLocked(id)) if id == "enrolment"));
        let open = check(2, &flags, |ctx| next_chapter(&arc, &progress, ctx).map(|c| c.id.clone()));
        assert_eq!(open.expect("open"), "enrolment");

        let done = complete_chapter(&arc, &mut progress, &flags).expect("complete");
        assert!(done.arc_finished);
        assert_eq!(done.dialogue.as_deref(), Some("mentor_intro"));
        assert!(progress.is_complete("prologue"));
        assert!(matches!(
            complete_chapter(&arc, &mut progress, &flags),
            Err(StoryError::ArcComplete(_))
        ));
    }

    #[test]
    fn clearing_one_arc_leaves_a_same_named_chapter_standing() {
        let prologue = arc();
        let mut side = arc();
        side.id = "side_story".into();
        let mut progress = ArcProgress::default();
        let mut flags = StoryFlags::default();

        flags.set(prologue.chapters[0].cleared_flag(&prologue.id), true);
        assert_ne!(
            cleared_flag(&prologue.id, "awakening"),
            cleared_flag(&side.id, "awakening")
        );
        assert_eq!(side.chapters[0].pending_encounter(&side.id, &flags), Some("fly_head"));
        assert!(matches!(
            complete_chapter(&side, &mut progress, &flags),
            Err(StoryError::EncounterPending { .. })
        ));
        assert!(complete_chapter(&prologue, &mut progress, &flags).is_ok());
    }
}
