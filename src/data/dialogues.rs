use std::collections::BTreeMap;

use crate::narrative::consequence::Consequence;
use crate::narrative::dialogue::{DialogueChoice, DialogueNode, DialogueTree};
use crate::narrative::requirement::Requirement;
use crate::rules::traits::TraitKind;

fn choice(text: &str, next: Option<&str>) -> DialogueChoice {
    DialogueChoice {
        text: text.to_string(),
        next: next.map(str::to_string),
        requirements: Vec::new(),
        consequences: Vec::new(),
    }
}

trait ChoiceExt {
    fn requires(self, requirement: Requirement) -> Self;
    fn then(self, consequence: Consequence) -> Self;
}

impl ChoiceExt for DialogueChoice {
    fn requires(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    fn then(mut self, consequence: Consequence) -> Self {
        self.consequences.push(consequence);
        self
    }
}

fn node(id: &str, speaker: &str, text: &str, choices: Vec<DialogueChoice>) -> DialogueNode {
    DialogueNode {
        id: id.to_string(),
        speaker: speaker.to_string(),
        text: text.to_string(),
        choices,
    }
}

fn tree(id: &str, npc_id: &str, nodes: Vec<DialogueNode>) -> DialogueTree {
    let root = nodes.first().map(|n| n.id.clone()).unwrap_or_default();
    DialogueTree {
        id: id.to_string(),
        npc_id: npc_id.to_string(),
        root,
        nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect::<BTreeMap<_, _>>(),
    }
}

fn flag_set(flag: &str) -> Requirement {
    Requirement::FlagSet { flag: flag.to_string() }
}

fn flag_unset(flag: &str) -> Requirement {
    Requirement::FlagUnset { flag: flag.to_string() }
}

fn quest_active(quest: &str) -> Requirement {
    Requirement::QuestActive { quest: quest.to_string() }
}

fn quest_done(quest: &str) -> Requirement {
    Requirement::QuestCompleted { quest: quest.to_string() }
}

fn trait_at_least(kind: TraitKind, value: u8) -> Requirement {
    Requirement::TraitAtLeast { kind, value }
}

fn affinity(npc: &str, delta: i32) -> Consequence {
    Consequence::AdjustRelationship {
        npc: npc.to_string(),
        delta,
    }
}

fn nudge(kind: TraitKind, delta: i32) -> Consequence {
    Consequence::AdjustTrait { kind, delta }
}

fn start_quest(quest: &str) -> Consequence {
    Consequence::StartQuest { quest: quest.to_string() }
}

fn objective(quest: &str, objective: &str) -> Consequence {
    Consequence::CompleteObjective {
        quest: quest.to_string(),
        objective: objective.to_string(),
    }
}

fn give(item: &str, quantity: u32) -> Consequence {
    Consequence::GrantItem {
        item: item.to_string(),
        quantity,
    }
}

fn note(text: &str) -> Consequence {
    Consequence::JournalNote { text: text.to_string() }
}

fn mentor_intro() -> DialogueTree {
    let mentor = "Kaito Amagiri";
    tree(
        "mentor_intro",
        "mentor",
        vec![
            node(
                "greeting",
                mentor,
                "So you're the one who walked out of that curse's mouth in one piece. Welcome to the academy.",
                vec![
                    choice("I'm ready for a real mission.", Some("mission"))
                        .requires(flag_unset("met_mentor"))
                        .then(nudge(TraitKind::Courage, 3)),
                    choice("What exactly are curses?", Some("lore"))
                        .requires(flag_unset("met_mentor"))
                        .then(nudge(TraitKind::Curiosity, 5)),
                    choice("The old road is clear.", Some("praise"))
                        .requires(quest_done("first_exorcism"))
                        .requires(flag_unset("mentor_praised")),
                    choice("I brought back the finger.", Some("returned"))
                        .requires(quest_active("sealed_finger"))
                        .requires(Requirement::HasItem {
                            item: "sealed_finger".to_string(),
                            quantity: 1,
                        }),
                    choice("Nothing for now.", None),
                ],
            ),
            node(
                "lore",
                mentor,
                "Fear, grief and hatred leak out of people. It pools, it festers, and sometimes it gets up and walks. We put it down.",
                vec![choice("Then give me something to put down.", Some("mission"))
                    .then(affinity("mentor", 3))],
            ),
            node(
                "mission",
                mentor,
                "Good. Something on the old road has been eating travellers. Find it and exorcise it.",
                // The flag lands with the quest so leaving mid-briefing keeps the offer open.
                vec![choice("Understood.", None)
                    .then(Consequence::set_flag("met_mentor"))
                    .then(start_quest("first_exorcism"))
                    .then(objective("first_exorcism", "report_to_mentor"))
                    .then(give("healing_talisman", 2))
                    .then(affinity("mentor", 5))],
            ),
            node(
                "praise",
                mentor,
                "Clean work. Now the bad news: a sealed finger was stolen from our vault. Find out who took it.",
                vec![choice("I'll find it.", None)
                    .then(Consequence::set_flag("mentor_praised"))
                    .then(Consequence::GrantXp { amount: 60 })
                    .then(affinity("mentor", 10))
                    .then(start_quest("sealed_finger"))],
            ),
            node(
                "returned",
                mentor,
                "You actually brought it back. I'll reseal it myself. Don't tell the elders I was impressed.",
                vec![choice("My lips are sealed.", None)
                    .then(Consequence::RemoveItem {
                        item: "sealed_finger".to_string(),
                        quantity: 1,
                    })
                    .then(Consequence::CompleteQuest {
                        quest: "sealed_finger".to_string(),
                    })
                    .then(Consequence::GrantXp { amount: 200 })
                    .then(affinity("mentor", 15))
                    .then(note("Returned the sealed finger to the academy vault."))],
            ),
        ],
    )
}

fn rival_spar() -> DialogueTree {
    let rival = "Rin Tsurugi";
    tree(
        "rival_spar",
        "rival",
        vec![
            node(
                "challenge",
                rival,
                "Oi, first year. You look bored. Want to get thrown around the yard?",
                vec![
                    choice("Only if you don't hold back.", Some("spar"))
                        .requires(trait_at_least(TraitKind::Courage, 55))
                        .then(affinity("rival", 10))
                        .then(nudge(TraitKind::Courage, 2)),
                    choice("Why do you fight curses, anyway?", Some("backstory"))
                        .requires(Requirement::RelationshipAtLeast {
                            npc: "rival".to_string(),
                            affinity: 30,
                        })
                        .requires(flag_unset("rival_backstory")),
                    choice("Not today.", None).then(affinity("rival", -3)),
                ],
            ),
            node(
                "spar",
                rival,
                "Ha! You trade blows until the sun goes down. You lose, mostly, but you learn something.",
                vec![choice("Again tomorrow.", None)
                    .then(Consequence::GrantXp { amount: 30 })
                    .then(Consequence::IncrementFlag {
                        flag: "spars".to_string(),
                        by: 1,
                    })],
            ),
            node(
                "backstory",
                rival,
                "My sister could see them too. Nobody believed her until it was too late. That's all you get.",
                vec![choice("Thanks for telling me.", None)
                    .then(Consequence::set_flag("rival_backstory"))
                    .then(affinity("rival", 8))
                    .then(nudge(TraitKind::Compassion, 3))],
            ),
        ],
    )
}

fn keeper_whispers() -> DialogueTree {
    let keeper = "Old Hanae";
    tree(
        "keeper_whispers",
        "shrine_keeper",
        vec![
            node(
                "welcome",
                keeper,
                "A sorcerer, climbing all these steps? The shrine has not been quiet for a month.",
                vec![
                    choice("What's been happening here?", Some("whispers"))
                        .requires(flag_unset("keeper_met"))
                        .then(Consequence::set_flag("keeper_met")),
                    choice("The shrine is quiet now.", Some("thanks"))
                        .requires(quest_done("shrine_whispers"))
                        .requires(flag_unset("keeper_thanked")),
                    choice("Goodbye.", None),
                ],
            ),
            node(
                "whispers",
                keeper,
                "Chanting at night. A shape in the gate that wears my late husband's voice. Please, make it stop.",
                vec![
                    choice("I'll deal with it.", None)
                        .then(start_quest("shrine_whispers"))
                        .then(objective("shrine_whispers", "ask_keeper"))
                        .then(affinity("shrine_keeper", 5)),
                    choice("That sounds like grief, not a curse.", None)
                        .requires(trait_at_least(TraitKind::Compassion, 60))
                        .then(start_quest("shrine_whispers"))
                        .then(objective("shrine_whispers", "ask_keeper"))
                        .then(affinity("shrine_keeper", 12)),
                ],
            ),
            node(
                "thanks",
                keeper,
                "Take this charm. It kept my husband safe for forty years. It should be used again.",
                vec![choice("I'll treasure it.", None)
                    .then(Consequence::set_flag("keeper_thanked"))
                    .then(give("warding_charm", 1))
                    .then(affinity("shrine_keeper", 15))],
            ),
        ],
    )
}

fn broker_deal() -> DialogueTree {
    let broker = "Kenji the Broker";
    tree(
        "broker_deal",
        "informant",
        vec![
            node(
                "pitch",
                broker,
                "Information is a currency, sorcerer. What are you buying?",
                vec![
                    choice("I'm looking for a stolen finger.", Some("finger"))
                        .requires(quest_active("sealed_finger")),
                    choice("The underpass is clean.", Some("stitched"))
                        .requires(quest_done("station_sweep"))
                        .requires(flag_unset("heard_patchwork")),
                    choice("Any rumours?", Some("rumours")).requires(flag_unset("heard_station")),
                    choice("Just browsing.", None),
                ],
            ),
            node(
                "rumours",
                broker,
                "People vanish in the station underpass after the last train. Nobody official cares. Yet.",
                vec![choice("I'll look into it.", None)
                    .then(Consequence::set_flag("heard_station"))
                    .then(start_quest("station_sweep"))],
            ),
            node(
                "finger",
                broker,
                "A curse swallowed it whole in the underpass. Knowing that is worth something to me, too.",
                vec![
                    choice("Take these residues as payment.", None)
                        .requires(Requirement::HasItem {
                            item: "curse_residue".to_string(),
                            quantity: 2,
                        })
                        .then(Consequence::RemoveItem {
                            item: "curse_residue".to_string(),
                            quantity: 2,
                        })
                        .then(objective("sealed_finger", "trace_thief"))
                        .then(affinity("informant", 5)),
                    choice("Tell me, or I break your stall.", None)
                        .requires(trait_at_least(TraitKind::Ruthlessness, 40))
                        .then(objective("sealed_finger", "trace_thief"))
                        .then(nudge(TraitKind::Ruthlessness, 5))
                        .then(affinity("informant", -15)),
                    choice("Come on. People could die.", None)
                        .requires(trait_at_least(TraitKind::Compassion, 55))
                        .then(objective("sealed_finger", "trace_thief"))
                        .then(affinity("informant", -2)),
                    choice("Never mind.", None),
                ],
            ),
            node(
                "stitched",
                broker,
                "Then you'll want this one for free: bodies stitched together, left near the old hospital.",
                vec![choice("Who would do that?", None)
                    .then(Consequence::set_flag("heard_patchwork"))
                    .then(start_quest("patchwork_trail"))
                    .then(note("The broker mentioned stitched bodies near the abandoned hospital."))],
            ),
        ],
    )
}

fn medic_checkup() -> DialogueTree {
    let medic = "Dr. Yuna Sato";
    tree(
        "medic_checkup",
        "medic",
        vec![
            node(
                "clinic",
                medic,
                "Sit. You're bleeding on my floor again.",
                vec![
                    choice("Patch me up?", None)
                        .then(Consequence::Heal { amount: 999 })
                        .then(Consequence::RestoreEnergy { amount: 999 })
                        .then(affinity("medic", 2)),
                    choice("How are you holding up?", Some("tired"))
                        .requires(trait_at_least(TraitKind::Compassion, 55)),
                    choice("Later.", None),
                ],
            ),
            node(
                "tired",
                medic,
                "Nobody asks the doctor that. I'm tired, but I'd rather be tired than useless.",
                vec![choice("Get some rest, too.", None)
                    .then(affinity("medic", 10))
                    .then(nudge(TraitKind::Compassion, 2))],
            ),
        ],
    )
}

/// Every dialogue shipped with the game.
pub fn builtin_dialogues() -> Vec<DialogueTree> {
    vec![
        mentor_intro(),
        rival_spar(),
        keeper_whispers(),
        broker_deal(),
        medic_checkup(),
    ]
}
