use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::character::Character;
use crate::data::enemies::{enemy_template, BOSS_ORDER, SURVIVAL_POOL};
use crate::rules::ParseEnumError;

/// Fraction of max HP and energy restored between survival waves.
pub const SURVIVAL_WAVE_HEAL: f32 = 0.3;
const SURVIVAL_SCALE_PER_WAVE: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Enemy HP and attack multiplier.
    pub fn enemy_multiplier(self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    pub fn xp_multiplier(self) -> f32 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseEnumError {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Story,
    Training,
    Survival,
    BossRush,
}

impl GameMode {
    pub fn label(self) -> &'static str {
        match self {
            GameMode::Story => "story",
            GameMode::Training => "training",
            GameMode::Survival => "survival",
            GameMode::BossRush => "boss_rush",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameMode {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "story" => Ok(GameMode::Story),
            "training" => Ok(GameMode::Training),
            "survival" => Ok(GameMode::Survival),
            "boss_rush" | "bossrush" => Ok(GameMode::BossRush),
            _ => Err(ParseEnumError {
                value: value.to_string(),
            }),
        }
    }
}

/// Per-fight rules derived from the mode and difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeRules {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub xp_multiplier: f32,
    /// When false a lost fight leaves the player at 1 HP instead.
    pub defeat_is_fatal: bool,
}

impl ModeRules {
    pub fn new(mode: GameMode, difficulty: Difficulty) -> Self {
        let mode_xp = match mode {
            GameMode::Training => 0.5,
            _ => 1.0,
        };
        Self {
            mode,
            difficulty,
            xp_multiplier: mode_xp * difficulty.xp_multiplier(),
            defeat_is_fatal: mode != GameMode::Training,
        }
    }

    pub fn scale_xp(&self, base: u32) -> u32 {
        (base as f32 * self.xp_multiplier).round() as u32
    }
}

impl Default for ModeRules {
    fn default() -> Self {
        Self::new(GameMode::Story, Difficulty::Normal)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalRun {
    pub wave: u32,
    pub score: u32,
    pub best_wave: u32,
    pub active: bool,
}

impl SurvivalRun {
    /// Enemy for the next wave: cycles the pool and grows tougher each wave.
    pub fn next_enemy(&self, difficulty: Difficulty) -> Option<(String, Character)> {
        let id = SURVIVAL_POOL[(self.wave as usize) % SURVIVAL_POOL.len()];
        let template = enemy_template(id)?;
        let mut enemy = template.spawn();
        let wave_scale = 1.0 + self.wave as f32 * SURVIVAL_SCALE_PER_WAVE;
        let scale = wave_scale * difficulty.enemy_multiplier();
        enemy.scale_stats(scale, scale);
        enemy.level += self.wave / 2;
        Some((id.to_string(), enemy))
    }

    pub fn record_clear(&mut self, enemy_level: u32) -> u32 {
        self.wave += 1;
        self.score += 100 * self.wave + enemy_level * 10;
        self.best_wave = self.best_wave.max(self.wave);
        self.score
    }

    pub fn end(&mut self) {
        self.active = false;
        self.wave = 0;
        self.score = 0;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRushRun {
    pub index: usize,
    pub active: bool,
    pub cleared: bool,
}

impl BossRushRun {
    pub fn next_boss(&self) -> Option<&'static str> {
        BOSS_ORDER.get(self.index).copied()
    }

    /// Advance past the current boss. Returns true when every boss is down.
    pub fn record_clear(&mut self) -> bool {
        self.index += 1;
        if self.index >= BOSS_ORDER.len() {
            self.cleared = true;
            self.active = false;
        }
        self.cleared
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Progress in the challenge modes, saved with the rest of the world.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeProgress {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub survival: SurvivalRun,
    #[serde(default)]
    pub boss_rush: BossRushRun,
}

impl ModeProgress {
    pub fn rules(&self) -> ModeRules {
        ModeRules::new(self.mode, self.difficulty)
    }
}

/// Restore a fraction of max HP and energy.
pub fn partial_heal(character: &mut Character, fraction: f32) {
    let hp = (character.total_max_hp() as f32 * fraction).round() as i32;
    let energy = (character.max_energy as f32 * fraction).round() as i32;
    character.heal(hp);
    character.restore_energy(energy);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_halves_xp_and_forgives_defeat() {
        let rules = ModeRules::new(GameMode::Training, Difficulty::Normal);
        assert_eq!(rules.scale_xp(100), 50);
        assert!(!rules.defeat_is_fatal);
        let hard = ModeRules::new(GameMode::Story, Difficulty::Hard);
        assert_eq!(hard.scale_xp(100), 90);
        assert!(hard.defeat_is_fatal);
    }

    #[test]
    fn survival_waves_get_harder() {
        let mut run = SurvivalRun::default();
        let (_, first) = run.next_enemy(Difficulty::Normal).expect("wave one");
        for _ in 0..SURVIVAL_POOL.len() {
            run.record_clear(1);
        }
        let (id, later) = run.next_enemy(Difficulty::Normal).expect("later wave");
        assert_eq!(id, SURVIVAL_POOL[0]);
        assert!(later.max_hp > first.max_hp);
        assert_eq!(run.best_wave, SURVIVAL_POOL.len() as u32);
    }

    #[test]
    fn boss_rush_walks_the_order() {
        let mut run = BossRushRun {
            active: true,
            ..BossRushRun::default()
        };
        let mut seen = Vec::new();
        while let Some(id) = run.next_boss() {
            seen.push(id);
            run.record_clear();
        }
        assert_eq!(seen, BOSS_ORDER.to_vec());
        assert!(run.cleared);
        assert!(!run.active);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("boss-rush".parse::<GameMode>(), Ok(GameMode::BossRush));
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("nightmare".parse::<Difficulty>().is_err());
    }
}
