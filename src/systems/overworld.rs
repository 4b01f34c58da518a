use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::components::character::Character;
use crate::components::inventory::Inventory;
use crate::components::stamina::{StaminaPool, EXPLORE_COST, PASSIVE_RECOVERY_PER_HOUR, TRAIN_COST, TRAVEL_COST};
use crate::components::world::Player;
use crate::data::items::item_name;
use crate::data::locations::location_def;
use crate::data::npcs::npcs_at;
use crate::rules::traits::TraitKind;
use crate::simulation::activity::ActivityLog;
use crate::simulation::flags::StoryFlags;
use crate::simulation::location::{CurrentLocation, PendingEncounter};
use crate::simulation::rng::GameRng;
use crate::simulation::time::PendingHours;
use crate::simulation::world_events::{WorldEventChange, WorldEvents};
use crate::systems::consequences::{apply_consequences, award_xp};

pub const REST_HOURS: u32 = 8;
pub const TRAIN_HOURS: u32 = 2;
pub const EXPLORE_HOURS: u32 = 1;
pub const TRAVEL_HOURS: u32 = 1;
pub const TRAIN_XP: u32 = 25;
/// Longest single wait; anything above is cut to a week.
pub const MAX_WAIT_HOURS: u32 = 24 * 7;
const REST_RECOVERY: f32 = 0.5;
const SCAVENGE_CHANCE: f64 = 0.25;
const SCAVENGE_TABLE: &[&str] = &["talisman_paper", "curse_residue", "field_ration"];

/// Intent-driven commands fed into the ECS each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIntent {
    Rest,
    Train,
    Explore,
    Travel { to: String },
    Wait { hours: u32 },
}

/// Resource storing the intents for the next tick.
#[derive(Resource, Default, Debug)]
pub struct ActionQueue(pub Vec<ActionIntent>);

/// System: resets per-tick bookkeeping.
pub fn begin_tick_system(mut log: ResMut<ActivityLog>, mut hours: ResMut<PendingHours>) {
    log.0.clear();
    hours.0 = 0;
}

/// System: full stamina, half HP and energy, eight hours gone.
pub fn rest_system(
    intents: Res<ActionQueue>,
    mut players: Query<(&mut Character, &mut StaminaPool), With<Player>>,
    mut hours: ResMut<PendingHours>,
    mut log: ResMut<ActivityLog>,
) {
    for intent in intents.0.iter() {
        if *intent != ActionIntent::Rest {
            continue;
        }
        for (mut character, mut stamina) in players.iter_mut() {
            stamina.refill();
            let hp = (character.total_max_hp() as f32 * REST_RECOVERY).round() as i32;
            let energy = (character.max_energy as f32 * REST_RECOVERY).round() as i32;
            let healed = character.heal(hp);
            let restored = character.restore_energy(energy);
            log.push(format!(
                "You rest for {} hours. +{} HP, +{} cursed energy, stamina restored.",
                REST_HOURS, healed, restored
            ));
        }
        hours.0 = hours.0.saturating_add(REST_HOURS);
    }
}

/// System: drills in the yard for experience and discipline.
pub fn train_system(
    intents: Res<ActionQueue>,
    mut players: Query<(&mut Character, &mut StaminaPool), With<Player>>,
    mut hours: ResMut<PendingHours>,
    mut log: ResMut<ActivityLog>,
) {
    for intent in intents.0.iter() {
        if *intent != ActionIntent::Train {
            continue;
        }
        for (mut character, mut stamina) in players.iter_mut() {
            if !stamina.spend(TRAIN_COST) {
                log.push("You are too exhausted to train.");
                continue;
            }
            let gain = award_xp(&mut character, TRAIN_XP);
            character.traits.adjust(TraitKind::Discipline, 1);
            hours.0 = hours.0.saturating_add(TRAIN_HOURS);
            log.push(format!("You train hard. +{} XP.", TRAIN_XP));
            if gain.levels > 0 {
                log.push(format!("You reached level {}!", character.level));
            }
            for id in gain.learned {
                log.push(format!("New technique: {}", id));
            }
        }
    }
}

/// System: searches the current location, possibly stirring up a curse.
#[allow(clippy::too_many_arguments)]
pub fn explore_system(
    intents: Res<ActionQueue>,
    mut players: Query<(&mut StaminaPool, &mut Inventory), With<Player>>,
    location: Res<CurrentLocation>,
    mut encounter: ResMut<PendingEncounter>,
    mut rng: ResMut<GameRng>,
    mut flags: ResMut<StoryFlags>,
    mut hours: ResMut<PendingHours>,
    mut log: ResMut<ActivityLog>,
) {
    let Some(place) = location.def() else {
        return;
    };
    for intent in intents.0.iter() {
        if *intent != ActionIntent::Explore || encounter.0.is_some() {
            continue;
        }
        for (mut stamina, mut inventory) in players.iter_mut() {
            if !stamina.spend(EXPLORE_COST) {
                log.push("You are too exhausted to explore.");
                continue;
            }
            hours.0 = hours.0.saturating_add(EXPLORE_HOURS);
            flags.increment(&format!("explored.{}", place.id), 1);

            if place.danger > 0 && rng.0.gen_bool(place.encounter_chance()) {
                if let Some(enemy) = place.encounters.choose(&mut rng.0) {
                    info!(location = place.id, enemy = *enemy, "encounter rolled");
                    log.push(format!("Cursed energy spikes around you in {}!", place.name));
                    encounter.0 = Some(enemy.to_string());
                    continue;
                }
            }
            if rng.0.gen_bool(SCAVENGE_CHANCE) {
                if let Some(item) = SCAVENGE_TABLE.choose(&mut rng.0) {
                    inventory.add(item, 1);
                    log.push(format!("You find {}.", item_name(item)));
                    continue;
                }
            }
            log.push(format!("You search {} but find nothing of note.", place.name));
        }
    }
}

/// System: walks to a neighbouring location.
pub fn travel_system(
    intents: Res<ActionQueue>,
    mut players: Query<&mut StaminaPool, With<Player>>,
    mut location: ResMut<CurrentLocation>,
    mut hours: ResMut<PendingHours>,
    mut log: ResMut<ActivityLog>,
) {
    for intent in intents.0.iter() {
        let ActionIntent::Travel { to } = intent else {
            continue;
        };
        let Some(here) = location.def() else {
            warn!(location = %location.0, "player stands in an unknown location");
            continue;
        };
        let Some(destination) = location_def(to) else {
            log.push(format!("There is no place called {}.", to));
            continue;
        };
        if !here.is_neighbor(destination.id) {
            log.push(format!("{} is not reachable from {}.", destination.name, here.name));
            continue;
        }
        let mut moved = false;
        for mut stamina in players.iter_mut() {
            if stamina.spend(TRAVEL_COST) {
                moved = true;
            } else {
                log.push("You are too exhausted to travel.");
            }
        }
        if !moved {
            continue;
        }
        location.0 = destination.id.to_string();
        hours.0 = hours.0.saturating_add(TRAVEL_HOURS);
        log.push(format!("You arrive at {}.", destination.name));
        let present: Vec<_> = npcs_at(destination.id).map(|npc| npc.name).collect();
        if !present.is_empty() {
            log.push(format!("Here: {}", present.join(", ")));
        }
    }
}

/// System: lets time pass.
pub fn wait_system(intents: Res<ActionQueue>, mut hours: ResMut<PendingHours>, mut log: ResMut<ActivityLog>) {
    for intent in intents.0.iter() {
        if let ActionIntent::Wait { hours: waited } = intent {
            let waited = (*waited).clamp(1, MAX_WAIT_HOURS);
            hours.0 = hours.0.saturating_add(waited);
            log.push(format!("You wait for {} hour(s).", waited));
        }
    }
}

/// System: passive stamina recovery for the hours that elapsed.
pub fn stamina_recovery_system(hours: Res<PendingHours>, mut players: Query<&mut StaminaPool, With<Player>>) {
    let amount = i32::try_from(hours.0)
        .unwrap_or(i32::MAX)
        .saturating_mul(PASSIVE_RECOVERY_PER_HOUR);
    if amount == 0 {
        return;
    }
    for mut stamina in players.iter_mut() {
        stamina.recover(amount);
    }
}

/// Exclusive system: counts world events down and fires their expiry consequences.
pub fn world_event_system(world: &mut World) {
    let hours = world.resource::<PendingHours>().0;
    if hours == 0 {
        return;
    }
    let changes = world.resource_scope(|world, mut events: Mut<WorldEvents>| {
        events.tick(hours, world.resource::<StoryFlags>())
    });

    for change in changes {
        match change {
            WorldEventChange::Resolved { id, name } => {
                info!(event = %id, "world event resolved");
                world.resource_mut::<ActivityLog>().push(format!("Resolved: {}.", name));
            }
            WorldEventChange::Expired { id, name, consequences } => {
                info!(event = %id, "world event expired");
                world.resource_mut::<ActivityLog>().push(format!("Too late: {}.", name));
                match apply_consequences(world, &consequences) {
                    Ok(outcomes) => {
                        let lines: Vec<String> = outcomes
                            .iter()
                            .filter(|o| !o.is_quiet())
                            .map(|o| o.to_string())
                            .collect();
                        let mut log = world.resource_mut::<ActivityLog>();
                        for line in lines {
                            log.push(line);
                        }
                    }
                    Err(err) => warn!(event = %id, error = %err, "failed to apply world event"),
                }
            }
        }
    }
}

/// System: drains the intent queue once the tick is done.
pub fn end_tick_system(mut intents: ResMut<ActionQueue>) {
    intents.0.clear();
}
