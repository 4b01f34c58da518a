use crate::narrative::arcs::{Chapter, StoryArc};
use crate::narrative::consequence::Consequence;
use crate::narrative::requirement::Requirement;

struct ChapterSpec {
    id: &'static str,
    title: &'static str,
    intro: &'static str,
    requirements: Vec<Requirement>,
    encounter: Option<&'static str>,
    dialogue: Option<&'static str>,
    rewards: Vec<Consequence>,
}

impl ChapterSpec {
    fn build(self, arc_id: &str) -> Chapter {
        Chapter {
            id: self.id.to_string(),
            title: self.title.to_string(),
            intro: self.intro.to_string(),
            requirements: self.requirements,
            encounter: self.encounter.map(str::to_string),
            dialogue: self.dialogue.map(str::to_string),
            completion_flag: format!("{}.{}", arc_id, self.id),
            rewards: self.rewards,
        }
    }
}

fn arc(id: &str, title: &str, chapters: Vec<ChapterSpec>) -> StoryArc {
    StoryArc {
        id: id.to_string(),
        title: title.to_string(),
        chapters: chapters.into_iter().map(|spec| spec.build(id)).collect(),
    }
}

fn prologue() -> StoryArc {
    arc(
        "prologue",
        "The Cursed Academy",
        vec![
            ChapterSpec {
                id: "arrival",
                title: "Arrival",
                intro: "The barrier around the academy ripples as you step through. An instructor is already waiting.",
                requirements: vec![],
                encounter: None,
                dialogue: Some("mentor_intro"),
                rewards: vec![Consequence::JournalNote {
                    text: "Enrolled at the academy.".to_string(),
                }],
            },
            ChapterSpec {
                id: "first_blood",
                title: "First Blood",
                intro: "Dusk on the old road. Something with too many teeth is waiting at the blind corner.",
                requirements: vec![Requirement::QuestActive {
                    quest: "first_exorcism".to_string(),
                }],
                encounter: Some("roadside_curse"),
                dialogue: None,
                rewards: vec![Consequence::GrantXp { amount: 50 }],
            },
            ChapterSpec {
                id: "debrief",
                title: "Debrief",
                intro: "Back at the academy, your instructor looks almost proud.",
                requirements: vec![Requirement::QuestCompleted {
                    quest: "first_exorcism".to_string(),
                }],
                encounter: None,
                dialogue: Some("mentor_intro"),
                rewards: vec![Consequence::GrantItem {
                    item: "healing_talisman".to_string(),
                    quantity: 1,
                }],
            },
        ],
    )
}

fn sealed_finger() -> StoryArc {
    arc(
        "sealed_finger",
        "The Sealed Finger",
        vec![
            ChapterSpec {
                id: "theft",
                title: "The Theft",
                intro: "The vault door hangs open. Whatever took the finger left a trail of rot toward the city.",
                requirements: vec![Requirement::QuestActive {
                    quest: "sealed_finger".to_string(),
                }],
                encounter: None,
                dialogue: Some("broker_deal"),
                rewards: vec![],
            },
            ChapterSpec {
                id: "bearer",
                title: "The Bearer",
                intro: "Deep in the underpass, a bloated curse chews on something that glows.",
                requirements: vec![
                    Requirement::QuestActive {
                        quest: "sealed_finger".to_string(),
                    },
                    Requirement::LevelAtLeast { level: 5 },
                ],
                encounter: Some("finger_bearer"),
                dialogue: None,
                rewards: vec![Consequence::GrantXp { amount: 150 }],
            },
            ChapterSpec {
                id: "homecoming",
                title: "Homecoming",
                intro: "The finger pulses in its wrappings. It wants to be eaten. You take it home instead.",
                requirements: vec![Requirement::HasItem {
                    item: "sealed_finger".to_string(),
                    quantity: 1,
                }],
                encounter: None,
                dialogue: Some("mentor_intro"),
                rewards: vec![],
            },
        ],
    )
}

fn patchwork() -> StoryArc {
    arc(
        "patchwork",
        "Stitched Souls",
        vec![
            ChapterSpec {
                id: "clinic",
                title: "The Clinic",
                intro: "The hospital's lower ward smells of formaldehyde and something sweeter.",
                requirements: vec![
                    Requirement::QuestActive {
                        quest: "patchwork_trail".to_string(),
                    },
                    Requirement::LevelAtLeast { level: 8 },
                ],
                encounter: Some("station_lurker"),
                dialogue: None,
                rewards: vec![Consequence::CompleteObjective {
                    quest: "patchwork_trail".to_string(),
                    objective: "find_clinic".to_string(),
                }],
            },
            ChapterSpec {
                id: "confrontation",
                title: "The Patchwork Sorcerer",
                intro: "A curse in a lab coat smiles at you. \"A student. How educational.\"",
                requirements: vec![Requirement::LevelAtLeast { level: 12 }],
                encounter: Some("patchwork_sorcerer"),
                dialogue: None,
                rewards: vec![
                    Consequence::GrantXp { amount: 300 },
                    Consequence::JournalNote {
                        text: "The patchwork sorcerer is gone. The stitches are not.".to_string(),
                    },
                ],
            },
        ],
    )
}

/// Every story arc shipped with the game, in the order they unlock.
pub fn builtin_arcs() -> Vec<StoryArc> {
    vec![prologue(), sealed_finger(), patchwork()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dialogues::builtin_dialogues;
    use crate::data::enemies::enemy_template;
    use std::collections::HashSet;

    #[test]
    fn chapters_reference_known_content() {
        let dialogues: HashSet<String> = builtin_dialogues().into_iter().map(|t| t.id).collect();
        let mut flags = HashSet::new();
        for arc in builtin_arcs() {
            assert!(!arc.chapters.is_empty());
            for chapter in &arc.chapters {
                assert!(flags.insert(chapter.completion_flag.clone()), "{}", chapter.completion_flag);
                if let Some(enemy) = &chapter.encounter {
                    assert!(enemy_template(enemy).is_some(), "{}", enemy);
                }
                if let Some(dialogue) = &chapter.dialogue {
                    assert!(dialogues.contains(dialogue), "{}", dialogue);
                }
            }
        }
    }
}
