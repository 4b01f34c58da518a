use crate::narrative::consequence::Consequence;
use crate::narrative::cutscene::{Cutscene, Frame, Mood};
use crate::narrative::requirement::Requirement;
use crate::rules::traits::TraitKind;

fn frame(speaker: Option<&str>, text: &str) -> Frame {
    Frame {
        speaker: speaker.map(str::to_string),
        text: text.to_string(),
    }
}

fn bond(npc: &str, affinity: i32) -> Requirement {
    Requirement::RelationshipAtLeast {
        npc: npc.to_string(),
        affinity,
    }
}

/// Cutscenes and relationship-gated emotional moments.
pub fn builtin_cutscenes() -> Vec<Cutscene> {
    vec![
        Cutscene {
            id: "awakening".to_string(),
            title: "The Night It Opened Its Eyes".to_string(),
            mood: Mood::Ominous,
            frames: vec![
                frame(None, "Rain on a bus stop roof. A shape behind the glass that nobody else can see."),
                frame(None, "It turns. It smiles. You feel your own energy answer for the first time."),
                frame(Some("Kaito Amagiri"), "Huh. You can see it. That makes you my problem now."),
            ],
            requirements: vec![],
            consequences: vec![Consequence::JournalNote {
                text: "The night I first saw a curse.".to_string(),
            }],
            npc: None,
        },
        Cutscene {
            id: "first_exorcism".to_string(),
            title: "Ash on the Road".to_string(),
            mood: Mood::Triumphant,
            frames: vec![
                frame(None, "The curse comes apart like wet paper. The road is just a road again."),
                frame(None, "Your hands shake. Not from fear, you decide."),
            ],
            requirements: vec![Requirement::QuestCompleted {
                quest: "first_exorcism".to_string(),
            }],
            consequences: vec![Consequence::AdjustTrait {
                kind: TraitKind::Courage,
                delta: 5,
            }],
            npc: None,
        },
        Cutscene {
            id: "rooftop_talk".to_string(),
            title: "Rooftop".to_string(),
            mood: Mood::Warm,
            frames: vec![
                frame(Some("Rin Tsurugi"), "You keep getting back up. It's annoying."),
                frame(Some("Rin Tsurugi"), "...Don't die on a mission, alright? I'd have to find a new sparring partner."),
            ],
            requirements: vec![bond("rival", 40)],
            consequences: vec![Consequence::AdjustRelationship {
                npc: "rival".to_string(),
                delta: 10,
            }],
            npc: Some("rival".to_string()),
        },
        Cutscene {
            id: "mentor_regret".to_string(),
            title: "Old Scars".to_string(),
            mood: Mood::Somber,
            frames: vec![
                frame(Some("Kaito Amagiri"), "I had a student like you once. Reckless. Kind."),
                frame(Some("Kaito Amagiri"), "I'm not losing another one. So train harder than he did."),
            ],
            requirements: vec![
                bond("mentor", 40),
                Requirement::QuestCompleted {
                    quest: "sealed_finger".to_string(),
                },
            ],
            consequences: vec![
                Consequence::AdjustTrait {
                    kind: TraitKind::Discipline,
                    delta: 5,
                },
                Consequence::set_flag("mentor_trusts_you"),
            ],
            npc: Some("mentor".to_string()),
        },
        Cutscene {
            id: "keeper_farewell".to_string(),
            title: "Incense".to_string(),
            mood: Mood::Somber,
            frames: vec![
                frame(Some("Old Hanae"), "He used to sweep these steps every morning. I think he'd like you."),
                frame(None, "The incense smoke climbs straight up. No wind. No whispers."),
            ],
            requirements: vec![bond("shrine_keeper", 30), Requirement::FlagSet {
                flag: "keeper_thanked".to_string(),
            }],
            consequences: vec![Consequence::AdjustTrait {
                kind: TraitKind::Compassion,
                delta: 4,
            }],
            npc: Some("shrine_keeper".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_frames_present() {
        let mut ids = HashSet::new();
        for scene in builtin_cutscenes() {
            assert!(ids.insert(scene.id.clone()), "{}", scene.id);
            assert!(!scene.frames.is_empty(), "{}", scene.id);
        }
    }
}
