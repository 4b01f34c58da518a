use rand::Rng;

pub const BASIC_ATTACK_POWER: i32 = 10;
pub const GUARD_MULTIPLIER: f32 = 0.5;
pub const CRIT_MULTIPLIER: f32 = 1.5;
pub const FATIGUE_MULTIPLIER: f32 = 0.85;
pub const VARIANCE_MIN: f32 = 0.85;
pub const VARIANCE_MAX: f32 = 1.15;
const BASE_CRIT_CHANCE: f64 = 0.05;
const MAX_CRIT_CHANCE: f64 = 0.35;

/// Everything the damage formula reads for a single hit.
#[derive(Debug, Clone, Copy)]
pub struct HitInput {
    pub power: i32,
    pub attack: i32,
    pub defense: i32,
    pub attacker_speed: i32,
    pub guarding: bool,
    pub environment: f32,
    pub fatigued: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRoll {
    pub amount: i32,
    pub critical: bool,
    pub variance: f32,
}

/// The deterministic part of the formula: power plus attack minus half defense.
pub fn raw_damage(power: i32, attack: i32, defense: i32) -> i32 {
    (power + attack - defense / 2).max(1)
}

pub fn crit_chance(speed: i32) -> f64 {
    (BASE_CRIT_CHANCE + speed.max(0) as f64 / 400.0).min(MAX_CRIT_CHANCE)
}

pub fn roll_hit(input: &HitInput, rng: &mut impl Rng) -> HitRoll {
    let raw = raw_damage(input.power, input.attack, input.defense) as f32;
    let variance = rng.gen_range(VARIANCE_MIN..=VARIANCE_MAX);
    let critical = rng.gen_bool(crit_chance(input.attacker_speed));

    let mut total = raw * input.environment * variance;
    if input.guarding {
        total *= GUARD_MULTIPLIER;
    }
    if critical {
        total *= CRIT_MULTIPLIER;
    }
    if input.fatigued {
        total *= FATIGUE_MULTIPLIER;
    }

    HitRoll {
        amount: (total.round() as i32).max(1),
        critical,
        variance,
    }
}

/// Counter strikes skip variance and crits: half a basic attack.
pub fn counter_damage(attack: i32, defense: i32) -> i32 {
    ((raw_damage(BASIC_ATTACK_POWER, attack, defense) as f32) * 0.5).round().max(1.0) as i32
}

pub fn dodge_chance(defender_speed: i32, attacker_speed: i32) -> f64 {
    (0.30 + (defender_speed - attacker_speed) as f64 * 0.02).clamp(0.05, 0.80)
}

pub fn flee_chance(player_speed: i32, enemy_speed: i32) -> f64 {
    (0.5 + (player_speed - enemy_speed) as f64 * 0.03).clamp(0.1, 0.9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::combat::Environment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn input() -> HitInput {
        HitInput {
            power: 10,
            attack: 20,
            defense: 10,
            attacker_speed: 0,
            guarding: false,
            environment: 1.0,
            fatigued: false,
        }
    }

    #[test]
    fn raw_damage_never_below_one() {
        assert_eq!(raw_damage(10, 20, 10), 25);
        assert_eq!(raw_damage(0, 1, 200), 1);
    }

    #[test]
    fn rolls_stay_inside_variance_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let roll = roll_hit(&input(), &mut rng);
            let ceiling = (25.0 * VARIANCE_MAX * CRIT_MULTIPLIER).round() as i32;
            assert!(roll.amount >= (25.0 * VARIANCE_MIN).round() as i32);
            assert!(roll.amount <= ceiling);
        }
    }

    #[test]
    fn guard_halves_damage() {
        let mut open_rng = StdRng::seed_from_u64(3);
        let mut guard_rng = StdRng::seed_from_u64(3);
        let open = roll_hit(&input(), &mut open_rng);
        let guarded = roll_hit(
            &HitInput {
                guarding: true,
                ..input()
            },
            &mut guard_rng,
        );
        assert!(guarded.amount < open.amount);
        assert!((guarded.amount - open.amount / 2).abs() <= 1);
    }

    #[test]
    fn chances_are_clamped() {
        assert_eq!(dodge_chance(100, 0), 0.80);
        assert_eq!(dodge_chance(0, 100), 0.05);
        assert_eq!(flee_chance(0, 100), 0.1);
        assert_eq!(crit_chance(1000), 0.35);
        assert_eq!(counter_damage(20, 10), 13);
    }

    fn heavy() -> HitInput {
        HitInput {
            power: 1000,
            attack: 0,
            defense: 0,
            ..input()
        }
    }

    fn scaled(seed: u64, input: HitInput) -> (i32, i32) {
        let base = roll_hit(&heavy(), &mut StdRng::seed_from_u64(seed)).amount;
        let modified = roll_hit(&input, &mut StdRng::seed_from_u64(seed)).amount;
        (base, modified)
    }

    #[test]
    fn environment_scales_techniques_and_street_brawls() {
        assert_eq!(Environment::Domain.technique_multiplier(), 1.25);
        assert_eq!(Environment::Shrine.technique_multiplier(), 1.10);
        assert_eq!(Environment::Urban.technique_multiplier(), 1.0);
        assert_eq!(Environment::Urban.basic_attack_multiplier(), 1.05);
        assert_eq!(Environment::Domain.basic_attack_multiplier(), 1.0);

        for env in [Environment::Domain, Environment::Shrine] {
            let factor = env.technique_multiplier();
            let (base, boosted) = scaled(
                11,
                HitInput {
                    environment: factor,
                    ..heavy()
                },
            );
            assert!((boosted - (base as f32 * factor).round() as i32).abs() <= 1);
        }
    }

    #[test]
    fn fatigue_cuts_damage() {
        let (base, tired) = scaled(
            12,
            HitInput {
                fatigued: true,
                ..heavy()
            },
        );
        assert!(tired < base);
        assert!((tired - (base as f32 * FATIGUE_MULTIPLIER).round() as i32).abs() <= 1);
    }
}
