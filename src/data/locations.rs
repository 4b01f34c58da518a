use crate::simulation::combat::Environment;

pub const STARTING_LOCATION: &str = "academy";

/// Encounter chance per danger point when exploring.
pub const ENCOUNTER_CHANCE_PER_DANGER: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub environment: Environment,
    /// 0 is safe ground; each point adds 15% encounter chance.
    pub danger: u8,
    pub encounters: &'static [&'static str],
    pub npcs: &'static [&'static str],
    pub neighbors: &'static [&'static str],
}

impl LocationDef {
    pub fn encounter_chance(&self) -> f64 {
        (self.danger as f64 * ENCOUNTER_CHANCE_PER_DANGER).min(1.0)
    }

    pub fn is_neighbor(&self, id: &str) -> bool {
        self.neighbors.iter().any(|neighbor| *neighbor == id)
    }
}

pub static LOCATIONS: &[LocationDef] = &[
    LocationDef {
        id: "academy",
        name: "Sorcery Academy Grounds",
        description: "Wooden halls and training yards hidden behind a barrier on the city's edge.",
        environment: Environment::Open,
        danger: 0,
        encounters: &["training_dummy"],
        npcs: &["mentor", "rival", "medic"],
        neighbors: &["old_road", "city_district"],
    },
    LocationDef {
        id: "old_road",
        name: "Old Mountain Road",
        description: "A cracked road lined with forgotten shrines. Low curses gather in the ditches.",
        environment: Environment::Open,
        danger: 2,
        encounters: &["fly_head", "roadside_curse"],
        npcs: &[],
        neighbors: &["academy", "mountain_shrine"],
    },
    LocationDef {
        id: "mountain_shrine",
        name: "Mountain Shrine",
        description: "Red gates climb into the fog. The air hums with old prayers and older grudges.",
        environment: Environment::Shrine,
        danger: 2,
        encounters: &["shrine_wraith", "fly_head"],
        npcs: &["shrine_keeper"],
        neighbors: &["old_road"],
    },
    LocationDef {
        id: "city_district",
        name: "Neon Backstreets",
        description: "Neon, noise and crowds. Fear pools here and curses feed on it.",
        environment: Environment::Urban,
        danger: 1,
        encounters: &["roadside_curse"],
        npcs: &["informant"],
        neighbors: &["academy", "station_underpass"],
    },
    LocationDef {
        id: "station_underpass",
        name: "Station Underpass",
        description: "Flickering lights and a platform nobody uses after midnight.",
        environment: Environment::Urban,
        danger: 3,
        encounters: &["station_lurker", "fly_head"],
        npcs: &[],
        neighbors: &["city_district", "abandoned_hospital"],
    },
    LocationDef {
        id: "abandoned_hospital",
        name: "Abandoned Hospital",
        description: "A sealed ward where someone has been stitching curses together.",
        environment: Environment::Domain,
        danger: 4,
        encounters: &["station_lurker", "shrine_wraith"],
        npcs: &[],
        neighbors: &["station_underpass"],
    },
];

pub fn location_def(id: &str) -> Option<&'static LocationDef> {
    LOCATIONS.iter().find(|location| location.id == id)
}
