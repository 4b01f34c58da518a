use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::rules::grade::{grade_from_level, xp_to_next_level, Grade, LEVEL_CAP, LEVEL_GAINS};
use crate::rules::status::{has_status, StatusEffect, StatusKind};
use crate::rules::technique::Technique;
use crate::rules::traits::TraitProfile;
use crate::rules::transformation::{ActiveTransformation, TransformationKind};

const WEAKEN_MULTIPLIER: f32 = 0.75;

/// Flat stat bonuses granted by equipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonus {
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub speed: i32,
    #[serde(default)]
    pub max_hp: i32,
}

impl StatBonus {
    pub fn add(&mut self, other: StatBonus) {
        self.attack += other.attack;
        self.defense += other.defense;
        self.speed += other.speed;
        self.max_hp += other.max_hp;
    }

    pub fn subtract(&mut self, other: StatBonus) {
        self.attack -= other.attack;
        self.defense -= other.defense;
        self.speed -= other.speed;
        self.max_hp -= other.max_hp;
    }
}

/// A sorcerer or cursed spirit: the record combat and progression mutate.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub energy: i32,
    pub max_energy: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    #[serde(default)]
    pub traits: TraitProfile,
    #[serde(default)]
    pub techniques: Vec<Technique>,
    #[serde(default)]
    pub statuses: Vec<StatusEffect>,
    #[serde(default)]
    pub transformation: Option<ActiveTransformation>,
    #[serde(default)]
    pub transform_cooldown: u32,
    #[serde(default)]
    pub bonus: StatBonus,
    #[serde(default)]
    pub is_boss: bool,
    /// Transformation the enemy policy reaches for when cornered.
    #[serde(default)]
    pub signature_transformation: Option<TransformationKind>,
}

impl Character {
    pub fn new(name: impl Into<String>, max_hp: i32, max_energy: i32, attack: i32, defense: i32, speed: i32) -> Self {
        Self {
            name: name.into(),
            level: 1,
            xp: 0,
            hp: max_hp,
            max_hp,
            energy: max_energy,
            max_energy,
            attack,
            defense,
            speed,
            traits: TraitProfile::default(),
            techniques: Vec::new(),
            statuses: Vec::new(),
            transformation: None,
            transform_cooldown: 0,
            bonus: StatBonus::default(),
            is_boss: false,
            signature_transformation: None,
        }
    }

    pub fn grade(&self) -> Grade {
        grade_from_level(self.level)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    pub fn total_max_hp(&self) -> i32 {
        (self.max_hp + self.bonus.max_hp).max(1)
    }

    pub fn hp_ratio(&self) -> f32 {
        self.hp as f32 / self.total_max_hp() as f32
    }

    pub fn xp_to_next_level(&self) -> u32 {
        xp_to_next_level(self.level)
    }

    /// Add experience, levelling up as many times as it covers. Returns levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        if self.level >= LEVEL_CAP {
            return 0;
        }
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.level < LEVEL_CAP && self.xp >= self.xp_to_next_level() {
            self.xp -= self.xp_to_next_level();
            self.level_up();
            gained += 1;
        }
        if self.level >= LEVEL_CAP {
            self.xp = 0;
        }
        gained
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.max_hp += LEVEL_GAINS.max_hp;
        self.max_energy += LEVEL_GAINS.max_energy;
        self.attack += LEVEL_GAINS.attack;
        self.defense += LEVEL_GAINS.defense;
        self.speed += LEVEL_GAINS.speed;
        self.restore_full();
    }

    pub fn restore_full(&mut self) {
        self.hp = self.total_max_hp();
        self.energy = self.max_energy;
    }

    /// Reduce HP without going below zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let dealt = amount.max(0).min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restore HP up to the maximum. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.max(0).min(self.total_max_hp() - self.hp).max(0);
        self.hp += healed;
        healed
    }

    pub fn spend_energy(&mut self, cost: i32) -> bool {
        if cost > self.energy {
            return false;
        }
        self.energy -= cost.max(0);
        true
    }

    pub fn restore_energy(&mut self, amount: i32) -> i32 {
        let restored = amount.max(0).min(self.max_energy - self.energy).max(0);
        self.energy += restored;
        restored
    }

    fn transformation_multipliers(&self) -> (f32, f32, f32) {
        match self.transformation {
            Some(active) => {
                let profile = active.kind.profile();
                (profile.attack, profile.defense, profile.speed)
            }
            None => (1.0, 1.0, 1.0),
        }
    }

    pub fn effective_attack(&self) -> i32 {
        let (attack_mult, _, _) = self.transformation_multipliers();
        let mut value = (self.attack + self.bonus.attack) as f32 * attack_mult;
        if has_status(&self.statuses, StatusKind::Weaken) {
            value *= WEAKEN_MULTIPLIER;
        }
        value.round() as i32
    }

    pub fn effective_defense(&self) -> i32 {
        let (_, defense_mult, _) = self.transformation_multipliers();
        ((self.defense + self.bonus.defense) as f32 * defense_mult).round() as i32
    }

    pub fn effective_speed(&self) -> i32 {
        let (_, _, speed_mult) = self.transformation_multipliers();
        ((self.speed + self.bonus.speed) as f32 * speed_mult).round() as i32
    }

    pub fn technique(&self, id: &str) -> Option<&Technique> {
        self.techniques.iter().find(|t| t.id == id)
    }

    pub fn technique_mut(&mut self, id: &str) -> Option<&mut Technique> {
        self.techniques.iter_mut().find(|t| t.id == id)
    }

    pub fn available_techniques(&self) -> impl Iterator<Item = &Technique> {
        self.techniques
            .iter()
            .filter(|t| t.unlocked_for(self.level, &self.traits))
    }

    /// Learn a technique unless one with the same id is already known.
    pub fn learn_technique(&mut self, technique: Technique) -> bool {
        if self.technique(&technique.id).is_some() {
            return false;
        }
        self.techniques.push(technique);
        true
    }

    /// Clear everything that only makes sense inside a fight.
    pub fn reset_after_combat(&mut self) {
        self.statuses.clear();
        self.transformation = None;
        self.transform_cooldown = 0;
        for technique in self.techniques.iter_mut() {
            technique.current_cooldown = 0;
        }
    }

    /// Scale base stats, used for difficulty and survival waves.
    pub fn scale_stats(&mut self, hp_mult: f32, attack_mult: f32) {
        self.max_hp = ((self.max_hp as f32) * hp_mult).round().max(1.0) as i32;
        self.hp = self.total_max_hp();
        self.attack = ((self.attack as f32) * attack_mult).round().max(1.0) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::status::apply_status;

    fn rookie() -> Character {
        Character::new("Rookie", 100, 50, 10, 8, 6)
    }

    #[test]
    fn xp_carries_over_across_levels() {
        let mut c = rookie();
        c.hp = 10;
        let gained = c.gain_xp(350);
        // 100 for level 2, 200 for level 3, 50 left over.
        assert_eq!(gained, 2);
        assert_eq!(c.level, 3);
        assert_eq!(c.xp, 50);
        assert_eq!(c.max_hp, 124);
        assert_eq!(c.hp, 124);
        assert_eq!(c.attack, 14);
    }

    #[test]
    fn level_cap_stops_progress() {
        let mut c = rookie();
        c.level = LEVEL_CAP;
        assert_eq!(c.gain_xp(10_000), 0);
        assert_eq!(c.xp, 0);
    }

    #[test]
    fn damage_and_heal_clamp() {
        let mut c = rookie();
        assert_eq!(c.take_damage(130), 100);
        assert!(c.is_defeated());
        assert_eq!(c.heal(40), 40);
        assert_eq!(c.heal(500), 60);
        assert_eq!(c.hp, 100);
    }

    #[test]
    fn energy_spend_fails_when_short() {
        let mut c = rookie();
        assert!(c.spend_energy(30));
        assert!(!c.spend_energy(30));
        assert_eq!(c.energy, 20);
        assert_eq!(c.restore_energy(100), 30);
    }

    #[test]
    fn transformation_and_weaken_shift_stats() {
        let mut c = rookie();
        c.transformation = Some(ActiveTransformation::begin(TransformationKind::CursedSurge));
        assert_eq!(c.effective_attack(), 13);
        apply_status(&mut c.statuses, StatusKind::Weaken, 2, 0);
        assert_eq!(c.effective_attack(), 10);
        c.reset_after_combat();
        assert_eq!(c.effective_attack(), 10);
        assert!(c.statuses.is_empty());
    }
}
