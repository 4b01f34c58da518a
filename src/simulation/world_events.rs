use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::world_events::builtin_world_events;
use crate::narrative::consequence::Consequence;
use crate::simulation::flags::StoryFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldEventStatus {
    #[default]
    Pending,
    Resolved,
    Expired,
}

/// A timed situation somewhere in the world. Setting `resolved_by_flag`
/// before the countdown runs out defuses it; otherwise `on_expire` fires once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: String,
    pub name: String,
    pub location: String,
    pub hours_remaining: u32,
    pub resolved_by_flag: String,
    #[serde(default)]
    pub on_expire: Vec<Consequence>,
    #[serde(default)]
    pub status: WorldEventStatus,
}

/// What a tick did to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEventChange {
    Resolved { id: String, name: String },
    Expired { id: String, name: String, consequences: Vec<Consequence> },
}

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldEvents {
    pub events: Vec<WorldEvent>,
}

impl Default for WorldEvents {
    fn default() -> Self {
        Self {
            events: builtin_world_events(),
        }
    }
}

impl WorldEvents {
    pub fn pending(&self) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter().filter(|e| e.status == WorldEventStatus::Pending)
    }

    pub fn pending_at<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a WorldEvent> + 'a {
        self.pending().filter(move |e| e.location == location)
    }

    /// Count every pending event down by `hours`, resolving those whose flag
    /// is set first.
    pub fn tick(&mut self, hours: u32, flags: &StoryFlags) -> Vec<WorldEventChange> {
        let mut changes = Vec::new();
        for event in self.events.iter_mut().filter(|e| e.status == WorldEventStatus::Pending) {
            if flags.is_set(&event.resolved_by_flag) {
                event.status = WorldEventStatus::Resolved;
                changes.push(WorldEventChange::Resolved {
                    id: event.id.clone(),
                    name: event.name.clone(),
                });
                continue;
            }
            event.hours_remaining = event.hours_remaining.saturating_sub(hours);
            if event.hours_remaining == 0 {
                event.status = WorldEventStatus::Expired;
                changes.push(WorldEventChange::Expired {
                    id: event.id.clone(),
                    name: event.name.clone(),
                    consequences: event.on_expire.clone(),
                });
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(hours: u32) -> WorldEvents {
        WorldEvents {
            events: vec![WorldEvent {
                id: "test".into(),
                name: "Test event".into(),
                location: "academy".into(),
                hours_remaining: hours,
                resolved_by_flag: "handled".into(),
                on_expire: vec![Consequence::set_flag("too_late")],
                status: WorldEventStatus::Pending,
            }],
        }
    }

    #[test]
    fn expires_exactly_once() {
        let mut events = single(5);
        let flags = StoryFlags::default();
        assert!(events.tick(3, &flags).is_empty());
        let changes = events.tick(3, &flags);
        assert!(matches!(&changes[..], [WorldEventChange::Expired { consequences, .. }] if consequences.len() == 1));
        assert!(events.tick(10, &flags).is_empty());
        assert_eq!(events.pending().count(), 0);
    }

    #[test]
    fn flag_resolves_before_countdown() {
        let mut events = single(2);
        let mut flags = StoryFlags::default();
        flags.set("handled", true);
        let changes = events.tick(5, &flags);
        assert!(matches!(&changes[..], [WorldEventChange::Resolved { .. }]));
        assert_eq!(events.events[0].status, WorldEventStatus::Resolved);
    }

    #[test]
    fn builtin_events_start_pending() {
        let events = WorldEvents::default();
        assert!(events.pending().count() >= 2);
        assert_eq!(events.pending_at("mountain_shrine").count(), 1);
    }
}
