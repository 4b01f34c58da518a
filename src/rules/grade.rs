use serde::{Deserialize, Serialize};

pub const LEVEL_CAP: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Grade4,
    Grade3,
    Grade2,
    Grade1,
    Special,
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::Grade4 => "Grade 4",
            Grade::Grade3 => "Grade 3",
            Grade::Grade2 => "Grade 2",
            Grade::Grade1 => "Grade 1",
            Grade::Special => "Special Grade",
        }
    }

    /// Bonus xp for defeating an enemy of this grade.
    pub fn bounty(self) -> u32 {
        match self {
            Grade::Grade4 => 0,
            Grade::Grade3 => 25,
            Grade::Grade2 => 60,
            Grade::Grade1 => 120,
            Grade::Special => 250,
        }
    }
}

pub fn grade_from_level(level: u32) -> Grade {
    if level >= 20 {
        Grade::Special
    } else if level >= 15 {
        Grade::Grade1
    } else if level >= 10 {
        Grade::Grade2
    } else if level >= 5 {
        Grade::Grade3
    } else {
        Grade::Grade4
    }
}

pub fn xp_to_next_level(level: u32) -> u32 {
    100 * level.max(1)
}

/// Stat increases granted by one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelGains {
    pub max_hp: i32,
    pub max_energy: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

pub const LEVEL_GAINS: LevelGains = LevelGains {
    max_hp: 12,
    max_energy: 8,
    attack: 2,
    defense: 2,
    speed: 1,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries() {
        assert_eq!(grade_from_level(1), Grade::Grade4);
        assert_eq!(grade_from_level(4), Grade::Grade4);
        assert_eq!(grade_from_level(5), Grade::Grade3);
        assert_eq!(grade_from_level(14), Grade::Grade2);
        assert_eq!(grade_from_level(15), Grade::Grade1);
        assert_eq!(grade_from_level(20), Grade::Special);
        assert!(Grade::Special > Grade::Grade1);
    }
}
