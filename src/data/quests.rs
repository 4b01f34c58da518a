#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub objectives: &'static [(&'static str, &'static str)],
}

pub static QUESTS: &[QuestDef] = &[
    QuestDef {
        id: "first_exorcism",
        title: "First Exorcism",
        description: "Prove to the academy that you can put down a curse on your own.",
        objectives: &[
            ("report_to_mentor", "Report to your mentor at the academy"),
            ("clear_roadside", "Exorcise the curse haunting the old road"),
        ],
    },
    QuestDef {
        id: "shrine_whispers",
        title: "Whispers at the Shrine",
        description: "Villagers hear chanting from the abandoned mountain shrine at night.",
        objectives: &[
            ("ask_keeper", "Ask the shrine keeper what she has seen"),
            ("cleanse_shrine", "Cleanse the shrine of its wraith"),
        ],
    },
    QuestDef {
        id: "sealed_finger",
        title: "The Sealed Finger",
        description: "A special grade object was stolen from the academy vault.",
        objectives: &[
            ("trace_thief", "Trace the thief to the city"),
            ("defeat_bearer", "Defeat the curse that swallowed the finger"),
            ("return_finger", "Return the finger to the academy"),
        ],
    },
    QuestDef {
        id: "station_sweep",
        title: "Station Sweep",
        description: "Commuters keep vanishing in the underpass beneath the station.",
        objectives: &[("clear_lurker", "Exorcise the station lurker")],
    },
    QuestDef {
        id: "patchwork_trail",
        title: "The Patchwork Trail",
        description: "Stitched corpses point toward a curse that studies sorcerers.",
        objectives: &[
            ("find_clinic", "Search the abandoned clinic"),
            ("confront_patchwork", "Confront the patchwork sorcerer"),
        ],
    },
];

/// Objectives ticked off by exorcising a given curse: (enemy, quest, objective).
pub static EXORCISM_OBJECTIVES: &[(&str, &str, &str)] = &[
    ("roadside_curse", "first_exorcism", "clear_roadside"),
    ("shrine_wraith", "shrine_whispers", "cleanse_shrine"),
    ("finger_bearer", "sealed_finger", "defeat_bearer"),
    ("station_lurker", "station_sweep", "clear_lurker"),
    ("patchwork_sorcerer", "patchwork_trail", "confront_patchwork"),
];

pub fn quest_def(id: &str) -> Option<&'static QuestDef> {
    QUESTS.iter().find(|quest| quest.id == id)
}

pub fn exorcism_objectives(enemy_id: &str) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
    EXORCISM_OBJECTIVES
        .iter()
        .filter(move |(enemy, _, _)| *enemy == enemy_id)
        .map(|(_, quest, objective)| (*quest, *objective))
}
