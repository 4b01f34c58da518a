use bevy_ecs::prelude::*;
use tracing::{debug, info};

use crate::components::character::Character;
use crate::components::inventory::Inventory;
use crate::components::world::Player;
use crate::data::enemies::enemy_template;
use crate::data::items::item_def;
use crate::data::quests::quest_def;
use crate::data::techniques::{technique, unlocks_between};
use crate::error::{GameError, GameResult};
use crate::narrative::consequence::{Consequence, ConsequenceOutcome};
use crate::simulation::flags::StoryFlags;
use crate::simulation::journal::Journal;
use crate::simulation::location::PendingEncounter;
use crate::simulation::relationships::RelationshipBook;
use crate::simulation::time::GameTime;

/// Levels and techniques picked up from one XP award.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XpGain {
    pub levels: u32,
    pub learned: Vec<String>,
}

/// Grant experience and teach every technique unlocked by the new levels.
pub fn award_xp(character: &mut Character, amount: u32) -> XpGain {
    let before = character.level;
    let levels = character.gain_xp(amount);
    let mut learned = Vec::new();
    if levels > 0 {
        info!(name = %character.name, level = character.level, "level up");
        for unlocked in unlocks_between(before, character.level) {
            let id = unlocked.id.clone();
            if character.learn_technique(unlocked) {
                learned.push(id);
            }
        }
    }
    XpGain { levels, learned }
}

pub fn player_entity(world: &mut World) -> GameResult<Entity> {
    let mut query = world.query_filtered::<Entity, With<Player>>();
    query
        .get_single(world)
        .map_err(|_| GameError::MissingPlayer("entity"))
}

fn player_component<'w, T: Component>(world: &'w mut World, what: &'static str) -> GameResult<Mut<'w, T>> {
    let entity = player_entity(world)?;
    world.get_mut::<T>(entity).ok_or(GameError::MissingPlayer(what))
}

fn skipped(reason: impl Into<String>) -> ConsequenceOutcome {
    ConsequenceOutcome::Skipped { reason: reason.into() }
}

/// Apply one consequence to the world. Content problems (an unknown quest,
/// an item the player does not have) are reported as `Skipped` instead of
/// aborting the rest of the batch.
pub fn apply_consequence(world: &mut World, consequence: &Consequence) -> GameResult<ConsequenceOutcome> {
    debug!(?consequence, "applying consequence");
    let outcome = match consequence {
        Consequence::SetFlag { flag, value } => {
            world.resource_mut::<StoryFlags>().set(flag.clone(), value.clone());
            ConsequenceOutcome::FlagSet {
                flag: flag.clone(),
                value: value.clone(),
            }
        }
        Consequence::IncrementFlag { flag, by } => {
            let value = world.resource_mut::<StoryFlags>().increment(flag, *by);
            ConsequenceOutcome::FlagIncremented {
                flag: flag.clone(),
                value,
            }
        }
        Consequence::AdjustTrait { kind, delta } => {
            let mut character = player_component::<Character>(world, "character")?;
            let value = character.traits.adjust(*kind, *delta);
            ConsequenceOutcome::TraitAdjusted { kind: *kind, value }
        }
        Consequence::AdjustRelationship { npc, delta } => {
            let mut book = world.resource_mut::<RelationshipBook>();
            let affinity = book.adjust(npc, *delta);
            ConsequenceOutcome::RelationshipAdjusted {
                npc: npc.clone(),
                affinity,
                tier: book.tier(npc),
            }
        }
        Consequence::GrantXp { amount } => {
            let mut character = player_component::<Character>(world, "character")?;
            let gain = award_xp(&mut character, *amount);
            ConsequenceOutcome::XpGranted {
                amount: *amount,
                levels: gain.levels,
                learned: gain.learned,
            }
        }
        Consequence::GrantItem { item, quantity } => {
            if item_def(item).is_none() {
                skipped(format!("unknown item {}", item))
            } else {
                player_component::<Inventory>(world, "inventory")?.add(item, *quantity);
                ConsequenceOutcome::ItemGranted {
                    item: item.clone(),
                    quantity: *quantity,
                }
            }
        }
        Consequence::RemoveItem { item, quantity } => {
            let mut inventory = player_component::<Inventory>(world, "inventory")?;
            match inventory.remove(item, *quantity) {
                Ok(()) => ConsequenceOutcome::ItemRemoved {
                    item: item.clone(),
                    quantity: *quantity,
                },
                Err(err) => skipped(err.to_string()),
            }
        }
        Consequence::Heal { amount } => {
            let amount = player_component::<Character>(world, "character")?.heal(*amount);
            ConsequenceOutcome::Healed { amount }
        }
        Consequence::RestoreEnergy { amount } => {
            let amount = player_component::<Character>(world, "character")?.restore_energy(*amount);
            ConsequenceOutcome::EnergyRestored { amount }
        }
        Consequence::StartQuest { quest } => match quest_def(quest) {
            None => skipped(format!("unknown quest {}", quest)),
            Some(def) => match world.resource_mut::<Journal>().start_quest(def) {
                Ok(true) => ConsequenceOutcome::QuestStarted { quest: quest.clone() },
                Ok(false) => skipped(format!("{} is already active", quest)),
                Err(err) => skipped(err.to_string()),
            },
        },
        Consequence::CompleteObjective { quest, objective } => {
            match world.resource_mut::<Journal>().complete_objective(quest, objective) {
                Ok(quest_ready) => ConsequenceOutcome::ObjectiveCompleted {
                    quest: quest.clone(),
                    objective: objective.clone(),
                    quest_ready,
                },
                Err(err) => skipped(err.to_string()),
            }
        }
        Consequence::CompleteQuest { quest } => match world.resource_mut::<Journal>().complete_quest(quest) {
            Ok(()) => ConsequenceOutcome::QuestCompleted { quest: quest.clone() },
            Err(err) => skipped(err.to_string()),
        },
        Consequence::FailQuest { quest } => match world.resource_mut::<Journal>().fail_quest(quest) {
            Ok(()) => ConsequenceOutcome::QuestFailed { quest: quest.clone() },
            Err(err) => skipped(err.to_string()),
        },
        Consequence::LearnTechnique { technique: id } => match technique(id) {
            None => skipped(format!("unknown technique {}", id)),
            Some(learned) => {
                if player_component::<Character>(world, "character")?.learn_technique(learned) {
                    ConsequenceOutcome::TechniqueLearned { technique: id.clone() }
                } else {
                    skipped(format!("{} is already known", id))
                }
            }
        },
        Consequence::JournalNote { text } => {
            let stamp = world.resource::<GameTime>().stamp();
            world.resource_mut::<Journal>().note(stamp, text.clone());
            ConsequenceOutcome::NoteAdded
        }
        Consequence::StartEncounter { enemy } => {
            if enemy_template(enemy).is_none() {
                skipped(format!("unknown enemy {}", enemy))
            } else {
                world.resource_mut::<PendingEncounter>().0 = Some(enemy.clone());
                ConsequenceOutcome::EncounterQueued { enemy: enemy.clone() }
            }
        }
    };
    info!(%outcome, "consequence applied");
    Ok(outcome)
}

/// Apply consequences in order, one outcome each.
pub fn apply_consequences(world: &mut World, consequences: &[Consequence]) -> GameResult<Vec<ConsequenceOutcome>> {
    consequences
        .iter()
        .map(|consequence| apply_consequence(world, consequence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::traits::TraitKind;
    use crate::simulation::flags::FlagValue;
    use crate::simulation::journal::QuestStatus;

    fn world_with_player() -> World {
        let mut world = World::new();
        world.insert_resource(StoryFlags::default());
        world.insert_resource(Journal::default());
        world.insert_resource(RelationshipBook::default());
        world.insert_resource(GameTime::default());
        world.insert_resource(PendingEncounter::default());
        world.spawn((
            Player,
            Character::new("Test", 100, 60, 10, 10, 10),
            Inventory::default(),
        ));
        world
    }

    fn player(world: &mut World) -> Character {
        let entity = player_entity(world).expect("player");
        world.get::<Character>(entity).cloned().expect("character")
    }

    #[test]
    fn applies_in_order_and_reports_each_step() {
        let mut world = world_with_player();
        let outcomes = apply_consequences(
            &mut world,
            &[
                Consequence::set_flag("met_mentor"),
                Consequence::IncrementFlag {
                    flag: "exorcisms".into(),
                    by: 2,
                },
                Consequence::AdjustTrait {
                    kind: TraitKind::Courage,
                    delta: 10,
                },
                Consequence::AdjustRelationship {
                    npc: "mentor".into(),
                    delta: 35,
                },
                Consequence::GrantItem {
                    item: "healing_talisman".into(),
                    quantity: 2,
                },
                Consequence::RemoveItem {
                    item: "healing_talisman".into(),
                    quantity: 1,
                },
                Consequence::StartQuest {
                    quest: "first_exorcism".into(),
                },
                Consequence::JournalNote {
                    text: "Met my instructor.".into(),
                },
            ],
        )
        .expect("apply");

        assert_eq!(outcomes.len(), 8);
        assert_eq!(
            world.resource::<StoryFlags>().get("met_mentor"),
            Some(&FlagValue::Bool(true))
        );
        assert_eq!(world.resource::<StoryFlags>().int("exorcisms"), 2);
        assert!(matches!(outcomes[2], ConsequenceOutcome::TraitAdjusted { value: 60, .. }));
        assert_eq!(world.resource::<RelationshipBook>().affinity("mentor"), 35);
        assert_eq!(
            world.resource::<Journal>().status("first_exorcism"),
            Some(QuestStatus::Active)
        );
        assert_eq!(world.resource::<Journal>().entries.len(), 1);
        let entity = player_entity(&mut world).expect("player");
        assert_eq!(world.get::<Inventory>(entity).map(|i| i.count("healing_talisman")), Some(1));
    }

    #[test]
    fn content_mistakes_are_skipped_not_fatal() {
        let mut world = world_with_player();
        let outcomes = apply_consequences(
            &mut world,
            &[
                Consequence::RemoveItem {
                    item: "sealed_finger".into(),
                    quantity: 1,
                },
                Consequence::CompleteQuest {
                    quest: "first_exorcism".into(),
                },
                Consequence::StartEncounter {
                    enemy: "no_such_curse".into(),
                },
                Consequence::set_flag("still_applied"),
            ],
        )
        .expect("apply");
        assert!(matches!(outcomes[0], ConsequenceOutcome::Skipped { .. }));
        assert!(matches!(outcomes[1], ConsequenceOutcome::Skipped { .. }));
        assert!(matches!(outcomes[2], ConsequenceOutcome::Skipped { .. }));
        assert!(world.resource::<StoryFlags>().is_set("still_applied"));
        assert_eq!(world.resource::<PendingEncounter>().0, None);
    }

    #[test]
    fn xp_levels_up_and_unlocks_techniques() {
        let mut world = world_with_player();
        let outcome = apply_consequence(&mut world, &Consequence::GrantXp { amount: 300 }).expect("xp");
        match outcome {
            ConsequenceOutcome::XpGranted { levels, learned, .. } => {
                assert_eq!(levels, 2);
                assert_eq!(learned, vec!["cursed_blast".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
        let character = player(&mut world);
        assert_eq!(character.level, 3);
        assert!(character.technique("cursed_blast").is_some());
    }

    #[test]
    fn encounters_are_queued() {
        let mut world = world_with_player();
        apply_consequence(
            &mut world,
            &Consequence::StartEncounter {
                enemy: "fly_head".into(),
            },
        )
        .expect("queue");
        assert_eq!(world.resource::<PendingEncounter>().0.as_deref(), Some("fly_head"));
    }

    #[test]
    fn missing_player_is_an_error() {
        let mut world = World::new();
        let err = apply_consequence(&mut world, &Consequence::Heal { amount: 5 });
        assert!(matches!(err, Err(GameError::MissingPlayer(_))));
    }
}
