use std::fmt;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Global resource tracking the in-game clock. One tick is one hour.
#[derive(Resource, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GameTime {
    pub tick: u64,
    pub day: u32,
    pub hour: u8,
    pub week: u32,
    pub month: u32,
    pub is_day: bool,
}

impl Default for GameTime {
    fn default() -> Self {
        let hour = 8;
        Self {
            tick: 0,
            day: 1,
            hour,
            week: 1,
            month: 1,
            is_day: is_daylight(hour),
        }
    }
}

fn is_daylight(hour: u8) -> bool {
    (6..18).contains(&hour)
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = if self.is_day { "Day" } else { "Night" };
        write!(
            f,
            "Day {}, Week {}, Month {}, {:02}:00 ({})",
            self.day, self.week, self.month, self.hour, phase
        )
    }
}

impl GameTime {
    pub fn advance(&mut self) {
        self.tick += 1;
        self.hour += 1;

        if self.hour >= 24 {
            self.hour = 0;
            self.day += 1;
            if self.day % 7 == 0 {
                self.week += 1;
            }
            if self.day % 28 == 0 {
                self.month += 1;
            }
        }

        self.is_day = is_daylight(self.hour);
    }

    pub fn advance_hours(&mut self, hours: u32) {
        for _ in 0..hours {
            self.advance();
        }
    }

    /// Short stamp used on journal entries.
    pub fn stamp(&self) -> String {
        format!("D{} {:02}:00", self.day, self.hour)
    }
}

/// Hours consumed by actions this tick; drained by the time systems.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingHours(pub u32);

/// System: advances the clock by however many hours the tick's actions took.
pub fn advance_time_system(pending: Res<PendingHours>, mut time: ResMut<GameTime>) {
    time.advance_hours(pending.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_over_midnight_and_tracks_daylight() {
        let mut time = GameTime::default();
        time.advance_hours(10);
        assert_eq!(time.hour, 18);
        assert!(!time.is_day);
        time.advance_hours(6);
        assert_eq!(time.day, 2);
        assert_eq!(time.hour, 0);
        assert_eq!(time.tick, 16);
        assert_eq!(time.stamp(), "D2 00:00");
    }
}
