use crate::narrative::consequence::Consequence;
use crate::simulation::world_events::{WorldEvent, WorldEventStatus};

/// Timed events seeded into a new game.
pub fn builtin_world_events() -> Vec<WorldEvent> {
    vec![
        WorldEvent {
            id: "shrine_festival".to_string(),
            name: "Lantern festival at the shrine".to_string(),
            location: "mountain_shrine".to_string(),
            hours_remaining: 72,
            resolved_by_flag: "defeated.shrine_wraith".to_string(),
            on_expire: vec![
                Consequence::AdjustRelationship {
                    npc: "shrine_keeper".to_string(),
                    delta: -10,
                },
                Consequence::JournalNote {
                    text: "The lantern festival went dark. Villagers blame the curse at the shrine.".to_string(),
                },
            ],
            status: WorldEventStatus::Pending,
        },
        WorldEvent {
            id: "underpass_disappearances".to_string(),
            name: "Commuters missing under the station".to_string(),
            location: "station_underpass".to_string(),
            hours_remaining: 120,
            resolved_by_flag: "defeated.station_lurker".to_string(),
            on_expire: vec![
                Consequence::FailQuest {
                    quest: "station_sweep".to_string(),
                },
                Consequence::AdjustRelationship {
                    npc: "informant".to_string(),
                    delta: -5,
                },
                Consequence::JournalNote {
                    text: "Three more commuters vanished before anyone stopped it.".to_string(),
                },
            ],
            status: WorldEventStatus::Pending,
        },
    ]
}
