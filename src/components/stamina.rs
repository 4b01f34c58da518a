use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

pub const TRAIN_COST: i32 = 20;
pub const EXPLORE_COST: i32 = 10;
pub const TRAVEL_COST: i32 = 5;
pub const PASSIVE_RECOVERY_PER_HOUR: i32 = 2;
const FATIGUE_THRESHOLD: f32 = 0.2;

/// Physical reserves spent on overworld actions, separate from cursed energy.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaPool {
    pub current: i32,
    pub max: i32,
}

impl Default for StaminaPool {
    fn default() -> Self {
        Self::new(100)
    }
}

impl StaminaPool {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn spend(&mut self, cost: i32) -> bool {
        if cost > self.current {
            return false;
        }
        self.current -= cost.max(0);
        true
    }

    pub fn recover(&mut self, amount: i32) -> i32 {
        let recovered = amount.max(0).min(self.max - self.current).max(0);
        self.current += recovered;
        recovered
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    pub fn is_fatigued(&self) -> bool {
        (self.current as f32) < self.max as f32 * FATIGUE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_and_fatigue() {
        let mut pool = StaminaPool::new(100);
        assert!(pool.spend(85));
        assert!(pool.is_fatigued());
        assert!(!pool.spend(20));
        assert_eq!(pool.recover(200), 85);
        assert!(!pool.is_fatigued());
    }
}
