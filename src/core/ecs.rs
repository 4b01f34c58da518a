use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;

use crate::narrative::arcs::ArcProgress;
use crate::simulation::activity::ActivityLog;
use crate::simulation::flags::StoryFlags;
use crate::simulation::journal::Journal;
use crate::simulation::library::StoryLibrary;
use crate::simulation::location::{CurrentLocation, PendingEncounter};
use crate::simulation::modes::ModeProgress;
use crate::simulation::relationships::RelationshipBook;
use crate::simulation::rng::GameRng;
use crate::simulation::time::{advance_time_system, GameTime, PendingHours};
use crate::simulation::world_events::WorldEvents;
use crate::systems::overworld::{
    begin_tick_system, end_tick_system, explore_system, rest_system, stamina_recovery_system, train_system,
    travel_system, wait_system, world_event_system, ActionQueue,
};

/// Canonical tick ordering for the overworld.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Intake,
    Simulation,
    Time,
    Cleanup,
}

/// Build the ECS world with baseline resources.
pub fn create_world(seed: u64) -> World {
    let mut world = World::new();
    world.insert_resource(GameTime::default());
    world.insert_resource(PendingHours::default());
    world.insert_resource(ActionQueue::default());
    world.insert_resource(ActivityLog::default());
    world.insert_resource(GameRng::seeded(seed));
    world.insert_resource(StoryFlags::default());
    world.insert_resource(Journal::default());
    world.insert_resource(RelationshipBook::default());
    world.insert_resource(ArcProgress::default());
    world.insert_resource(WorldEvents::default());
    world.insert_resource(CurrentLocation::default());
    world.insert_resource(PendingEncounter::default());
    world.insert_resource(ModeProgress::default());
    world.insert_resource(StoryLibrary::builtin());
    world
}

/// Build the system schedule in the canonical order.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((TickSet::Intake, TickSet::Simulation, TickSet::Time, TickSet::Cleanup).chain());

    schedule.add_systems((
        begin_tick_system.in_set(TickSet::Intake),
        (rest_system, train_system, explore_system, travel_system, wait_system)
            .chain()
            .in_set(TickSet::Simulation),
        (stamina_recovery_system, advance_time_system, world_event_system)
            .chain()
            .in_set(TickSet::Time),
        end_tick_system.in_set(TickSet::Cleanup),
    ));

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::character::Character;
    use crate::components::stamina::StaminaPool;
    use crate::components::world::Player;
    use crate::systems::overworld::ActionIntent;

    fn world_with_player() -> World {
        let mut world = create_world(11);
        world.spawn((Player, Character::new("Tick", 100, 50, 10, 10, 10), StaminaPool::default()));
        world
    }

    #[test]
    fn schedule_advances_time_by_consumed_hours() {
        let mut world = world_with_player();
        let mut schedule = create_schedule();
        world.resource_mut::<ActionQueue>().0 = vec![ActionIntent::Wait { hours: 3 }];
        schedule.run(&mut world);

        assert_eq!(world.resource::<GameTime>().tick, 3);
        assert!(world.resource::<ActionQueue>().0.is_empty());
        assert_eq!(world.resource::<ActivityLog>().0.len(), 1);
    }

    #[test]
    fn empty_tick_leaves_the_clock_alone() {
        let mut world = world_with_player();
        let mut schedule = create_schedule();
        schedule.run(&mut world);
        assert_eq!(world.resource::<GameTime>().tick, 0);
    }
}
