use bevy_ecs::prelude::*;

/// Resource capturing what happened in the overworld during the last tick.
#[derive(Resource, Default, Debug)]
pub struct ActivityLog(pub Vec<String>);

impl ActivityLog {
    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }
}
