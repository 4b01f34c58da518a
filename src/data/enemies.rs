use crate::components::character::Character;
use crate::data::techniques::technique;
use crate::rules::grade::grade_from_level;
use crate::rules::transformation::TransformationKind;

#[derive(Debug, Clone, Copy)]
pub struct DropSpec {
    pub item_id: &'static str,
    pub quantity: u32,
    pub chance: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level: u32,
    pub hp: i32,
    pub energy: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub techniques: &'static [&'static str],
    pub transformation: Option<TransformationKind>,
    pub boss: bool,
    pub drops: &'static [DropSpec],
}

impl EnemyTemplate {
    pub fn base_xp(&self) -> u32 {
        xp_for_level(self.level)
    }

    pub fn spawn(&self) -> Character {
        let mut enemy = Character::new(self.name, self.hp, self.energy, self.attack, self.defense, self.speed);
        enemy.level = self.level;
        enemy.is_boss = self.boss;
        enemy.signature_transformation = self.transformation;
        for id in self.techniques {
            if let Some(tech) = technique(id) {
                enemy.learn_technique(tech);
            }
        }
        enemy
    }
}

/// Experience for defeating a curse of `level`: a flat rate plus the grade bounty.
pub fn xp_for_level(level: u32) -> u32 {
    level * 40 + grade_from_level(level).bounty()
}

const fn drop(item_id: &'static str, quantity: u32, chance: f64) -> DropSpec {
    DropSpec {
        item_id,
        quantity,
        chance,
    }
}

pub static ENEMIES: &[EnemyTemplate] = &[
    EnemyTemplate {
        id: "training_dummy",
        name: "Cursed Training Doll",
        description: "A stitched doll that punches back if you get sloppy.",
        level: 1,
        hp: 80,
        energy: 0,
        attack: 4,
        defense: 2,
        speed: 1,
        techniques: &[],
        transformation: None,
        boss: false,
        drops: &[],
    },
    EnemyTemplate {
        id: "fly_head",
        name: "Fly Head",
        description: "A buzzing grade four curse, barely more than a grudge with wings.",
        level: 1,
        hp: 45,
        energy: 10,
        attack: 8,
        defense: 4,
        speed: 5,
        techniques: &[],
        transformation: None,
        boss: false,
        drops: &[drop("curse_residue", 1, 0.6)],
    },
    EnemyTemplate {
        id: "roadside_curse",
        name: "Roadside Curse",
        description: "Born from fear of a blind corner. It waits.",
        level: 2,
        hp: 60,
        energy: 20,
        attack: 10,
        defense: 5,
        speed: 6,
        techniques: &["grasping_hands"],
        transformation: None,
        boss: false,
        drops: &[drop("curse_residue", 1, 0.7), drop("talisman_paper", 1, 0.3)],
    },
    EnemyTemplate {
        id: "shrine_wraith",
        name: "Shrine Wraith",
        description: "A third grade curse wearing a shrine maiden's torn robes.",
        level: 4,
        hp: 90,
        energy: 40,
        attack: 13,
        defense: 8,
        speed: 9,
        techniques: &["miasma_spit"],
        transformation: None,
        boss: false,
        drops: &[drop("spirit_bone", 1, 0.5), drop("talisman_paper", 2, 0.5)],
    },
    EnemyTemplate {
        id: "station_lurker",
        name: "Station Lurker",
        description: "A long-limbed curse that hangs from the ceiling of the underpass.",
        level: 6,
        hp: 130,
        energy: 50,
        attack: 16,
        defense: 10,
        speed: 11,
        techniques: &["grasping_hands", "flesh_lash"],
        transformation: None,
        boss: false,
        drops: &[drop("spirit_bone", 1, 0.6), drop("energy_vial", 1, 0.3)],
    },
    EnemyTemplate {
        id: "finger_bearer",
        name: "Finger Bearer",
        description: "A grade two curse that swallowed a sealed finger and grew fat on it.",
        level: 8,
        hp: 220,
        energy: 80,
        attack: 20,
        defense: 12,
        speed: 10,
        techniques: &["calamity_flame", "miasma_spit"],
        transformation: Some(TransformationKind::CursedSurge),
        boss: true,
        drops: &[drop("sealed_finger", 1, 1.0), drop("healing_talisman", 1, 1.0)],
    },
    EnemyTemplate {
        id: "patchwork_sorcerer",
        name: "Patchwork Sorcerer",
        description: "A curse with stitched skin and a teacher's smile.",
        level: 14,
        hp: 380,
        energy: 140,
        attack: 28,
        defense: 18,
        speed: 16,
        techniques: &["soul_reshape", "flesh_lash"],
        transformation: Some(TransformationKind::DomainAwakening),
        boss: true,
        drops: &[drop("split_soul_blade", 1, 1.0)],
    },
    EnemyTemplate {
        id: "disaster_flame",
        name: "Disaster Flame",
        description: "A special grade curse of the earth's fury. Its head is a volcano.",
        level: 18,
        hp: 520,
        energy: 200,
        attack: 34,
        defense: 22,
        speed: 18,
        techniques: &["calamity_flame", "miasma_spit"],
        transformation: Some(TransformationKind::DomainAwakening),
        boss: true,
        drops: &[drop("greater_talisman", 2, 1.0)],
    },
];

/// Bosses in the order the boss rush mode serves them.
pub static BOSS_ORDER: &[&str] = &["finger_bearer", "patchwork_sorcerer", "disaster_flame"];

/// Regular curses survival waves cycle through.
pub static SURVIVAL_POOL: &[&str] = &["fly_head", "roadside_curse", "shrine_wraith", "station_lurker"];

pub fn enemy_template(id: &str) -> Option<&'static EnemyTemplate> {
    ENEMIES.iter().find(|enemy| enemy.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::item_def;

    #[test]
    fn templates_resolve_techniques_and_drops() {
        for template in ENEMIES {
            let spawned = template.spawn();
            assert_eq!(spawned.techniques.len(), template.techniques.len(), "{}", template.id);
            for drop in template.drops {
                assert!(item_def(drop.item_id).is_some(), "{} -> {}", template.id, drop.item_id);
            }
        }
        for id in BOSS_ORDER.iter().chain(SURVIVAL_POOL) {
            assert!(enemy_template(id).is_some(), "{}", id);
        }
    }

    #[test]
    fn bosses_pay_grade_bounty() {
        let bearer = enemy_template("finger_bearer").expect("template");
        assert_eq!(bearer.base_xp(), 8 * 40 + 25);
    }
}
