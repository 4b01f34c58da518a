#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Npc {
    pub id: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub location: &'static str,
    /// Dialogue tree opened by `talk`.
    pub dialogue: &'static str,
}

pub static NPCS: &[Npc] = &[
    Npc {
        id: "mentor",
        name: "Kaito Amagiri",
        title: "Special Grade Instructor",
        location: "academy",
        dialogue: "mentor_intro",
    },
    Npc {
        id: "rival",
        name: "Rin Tsurugi",
        title: "Second Year Student",
        location: "academy",
        dialogue: "rival_spar",
    },
    Npc {
        id: "shrine_keeper",
        name: "Old Hanae",
        title: "Shrine Keeper",
        location: "mountain_shrine",
        dialogue: "keeper_whispers",
    },
    Npc {
        id: "informant",
        name: "Kenji the Broker",
        title: "Curse Information Broker",
        location: "city_district",
        dialogue: "broker_deal",
    },
    Npc {
        id: "medic",
        name: "Dr. Yuna Sato",
        title: "Academy Physician",
        location: "academy",
        dialogue: "medic_checkup",
    },
];

pub fn npc(id: &str) -> Option<&'static Npc> {
    NPCS.iter().find(|npc| npc.id == id)
}

pub fn npcs_at(location: &str) -> impl Iterator<Item = &'static Npc> + '_ {
    NPCS.iter().filter(move |npc| npc.location == location)
}
