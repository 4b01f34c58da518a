use rand::Rng;

use crate::components::character::Character;
use crate::simulation::combat::CombatAction;
use crate::systems::combat_loop::check_transform;

const TRANSFORM_HP_RATIO: f32 = 0.5;
const DESPERATE_HP_RATIO: f32 = 0.3;
const DESPERATE_GUARD_CHANCE: f64 = 0.35;
const TECHNIQUE_CHANCE: f64 = 0.65;
const DODGE_CHANCE: f64 = 0.10;

/// Enemy decision policy, first match wins.
pub fn choose_enemy_action(enemy: &Character, rng: &mut impl Rng) -> CombatAction {
    if let Some(kind) = enemy.signature_transformation {
        if enemy.hp_ratio() < TRANSFORM_HP_RATIO && check_transform(enemy, kind).is_ok() {
            return CombatAction::Transform(kind);
        }
    }

    if enemy.hp_ratio() < DESPERATE_HP_RATIO && rng.gen_bool(DESPERATE_GUARD_CHANCE) {
        return CombatAction::Guard;
    }

    if let Some(technique) = strongest_affordable_technique(enemy) {
        if rng.gen_bool(TECHNIQUE_CHANCE) {
            return CombatAction::Technique(technique);
        }
    }

    if rng.gen_bool(DODGE_CHANCE) {
        return CombatAction::Dodge;
    }

    CombatAction::Attack
}

fn strongest_affordable_technique(enemy: &Character) -> Option<String> {
    enemy
        .available_techniques()
        .filter(|t| t.is_ready() && t.energy_cost <= enemy.energy)
        .max_by_key(|t| t.power)
        .map(|t| t.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::enemies::enemy_template;
    use crate::rules::transformation::TransformationKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn wounded_boss_transforms_first() {
        let mut boss = enemy_template("finger_bearer").expect("boss").spawn();
        boss.hp = boss.total_max_hp() / 3;
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            choose_enemy_action(&boss, &mut rng),
            CombatAction::Transform(TransformationKind::CursedSurge)
        );
    }

    #[test]
    fn healthy_enemy_prefers_its_strongest_technique() {
        let curse = enemy_template("finger_bearer").expect("boss").spawn();
        let mut rng = StdRng::seed_from_u64(9);
        let mut technique_uses = 0;
        for _ in 0..200 {
            match choose_enemy_action(&curse, &mut rng) {
                CombatAction::Technique(id) => {
                    assert_eq!(id, "calamity_flame");
                    technique_uses += 1;
                }
                CombatAction::Transform(_) | CombatAction::Guard => panic!("not cornered"),
                _ => {}
            }
        }
        assert!(technique_uses > 100);
    }

    #[test]
    fn broke_enemy_falls_back_to_basic_moves() {
        let mut curse = enemy_template("roadside_curse").expect("curse").spawn();
        curse.energy = 0;
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let action = choose_enemy_action(&curse, &mut rng);
            assert!(matches!(action, CombatAction::Attack | CombatAction::Dodge));
        }
    }

    #[test]
    fn cornered_enemy_sometimes_guards() {
        let mut curse = enemy_template("roadside_curse").expect("curse").spawn();
        curse.signature_transformation = None;
        curse.energy = 0;
        curse.hp = (curse.total_max_hp() / 5).max(1);
        let mut rng = StdRng::seed_from_u64(21);
        let guards = (0..400)
            .filter(|_| choose_enemy_action(&curse, &mut rng) == CombatAction::Guard)
            .count();
        // 35% of 400 is 140.
        assert!((100..=180).contains(&guards), "guarded {} times", guards);
    }
}
