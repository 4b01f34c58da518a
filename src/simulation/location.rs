use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::locations::{location_def, LocationDef, STARTING_LOCATION};

/// Where the player is standing.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentLocation(pub String);

impl Default for CurrentLocation {
    fn default() -> Self {
        Self(STARTING_LOCATION.to_string())
    }
}

impl CurrentLocation {
    pub fn def(&self) -> Option<&'static LocationDef> {
        location_def(&self.0)
    }
}

/// Enemy waiting to ambush the player, filled by exploration and story
/// consequences and drained when the fight starts.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEncounter(pub Option<String>);

impl PendingEncounter {
    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }
}
