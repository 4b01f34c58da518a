use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::components::character::Character;
use crate::components::inventory::Inventory;
use crate::data::enemies::{enemy_template, xp_for_level};
use crate::data::items::{item_def, ConsumableEffect, ItemKind};
use crate::rules::damage::{counter_damage, dodge_chance, flee_chance, roll_hit, HitInput, BASIC_ATTACK_POWER};
use crate::rules::status::{absorb_with_shield, apply_status, cleanse, has_status, tick_statuses, StatusApplication, StatusKind, StatusTick};
use crate::rules::technique::{can_use, UseError};
use crate::rules::transformation::{ActiveTransformation, TransformationKind, TRANSFORM_COOLDOWN_TURNS};
use crate::simulation::combat::{
    CombatAction, CombatEnd, CombatEvent, CombatRewards, CombatSide, CombatState, Combatant, Environment,
    RoundReport, Stance,
};
use crate::simulation::modes::ModeRules;
use crate::systems::ai::choose_enemy_action;

const GUARD_ENERGY: i32 = 10;
const ROUND_ENERGY: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("no fight is in progress")]
    NotActive,
    #[error("you do not know a technique called {0}")]
    UnknownTechnique(String),
    #[error(transparent)]
    Technique(#[from] UseError),
    #[error("already transformed")]
    AlreadyTransformed,
    #[error("transformation is on cooldown for {0} more turn(s)")]
    TransformOnCooldown(u32),
    #[error("{kind} needs level {needed}")]
    TransformLevelTooLow { kind: String, needed: u32 },
    #[error("{kind} needs {needed} cursed energy, only {available} left")]
    TransformEnergy { kind: String, needed: i32, available: i32 },
    #[error("no {0} in the bag")]
    NoSuchItem(String),
    #[error("{0} cannot be used in a fight")]
    ItemNotUsable(String),
    #[error("there is no running from a boss")]
    CannotFleeBoss,
}

pub fn start_combat(
    player: Character,
    enemy: Character,
    enemy_id: &str,
    environment: Environment,
    rules: ModeRules,
    fatigued: bool,
) -> CombatState {
    let mut player = Combatant::new(player);
    player.fatigued = fatigued;
    let enemy = Combatant::new(enemy);

    let mut log = vec![format!(
        "Combat started: {} vs {} ({})",
        player.name(),
        enemy.name(),
        environment.label()
    )];
    if fatigued {
        log.push(format!("{} is fatigued and hits softer.", player.name()));
    }
    info!(enemy = enemy_id, environment = environment.label(), "combat started");

    CombatState {
        active: true,
        round: 0,
        environment,
        player,
        enemy,
        enemy_id: enemy_id.to_string(),
        log,
        rewards: None,
        rules,
        outcome: None,
    }
}

/// Resolve one full round: the player's action, the enemy's reply, then upkeep.
/// The action is validated before anything changes.
pub fn combat_round(
    state: &mut CombatState,
    action: CombatAction,
    inventory: &mut Inventory,
    rng: &mut impl Rng,
) -> Result<RoundReport, CombatError> {
    if !state.active {
        return Err(CombatError::NotActive);
    }
    validate_action(state, &action, Some(&*inventory))?;

    state.round += 1;
    let mut report = RoundReport {
        round: state.round,
        ..RoundReport::default()
    };

    let fled = take_turn(state, CombatSide::Player, action, Some(inventory), rng, &mut report.events);
    let mut ended = if fled { Some(CombatEnd::Fled) } else { check_end(state) };

    if ended.is_none() {
        let enemy_action = choose_enemy_action(&state.enemy.character, rng);
        debug!(?enemy_action, "enemy turn");
        take_turn(state, CombatSide::Enemy, enemy_action, None, rng, &mut report.events);
        ended = check_end(state);
    }

    match ended {
        Some(end) => {
            report.rewards = finish_combat(state, end, rng, &mut report.events);
            report.ended = Some(end);
        }
        None => end_of_round(state, &mut report.events),
    }

    state.log.extend(report.events.iter().map(|event| event.to_string()));
    if let Some(end) = report.ended {
        state.log.push(format!("Combat ends: {}.", end));
    }
    Ok(report)
}

/// Whether `character` could enter `kind` right now.
pub fn check_transform(character: &Character, kind: TransformationKind) -> Result<(), CombatError> {
    let profile = kind.profile();
    if character.transformation.is_some() {
        return Err(CombatError::AlreadyTransformed);
    }
    if character.transform_cooldown > 0 {
        return Err(CombatError::TransformOnCooldown(character.transform_cooldown));
    }
    if character.level < profile.min_level {
        return Err(CombatError::TransformLevelTooLow {
            kind: kind.label().to_string(),
            needed: profile.min_level,
        });
    }
    if character.energy < profile.energy_cost {
        return Err(CombatError::TransformEnergy {
            kind: kind.label().to_string(),
            needed: profile.energy_cost,
            available: character.energy,
        });
    }
    Ok(())
}

fn validate_action(state: &CombatState, action: &CombatAction, inventory: Option<&Inventory>) -> Result<(), CombatError> {
    validate_for(state, CombatSide::Player, action, inventory)
}

fn validate_for(
    state: &CombatState,
    side: CombatSide,
    action: &CombatAction,
    inventory: Option<&Inventory>,
) -> Result<(), CombatError> {
    let actor = &state.side(side).character;
    match action {
        CombatAction::Attack | CombatAction::Dodge | CombatAction::Guard => Ok(()),
        CombatAction::Technique(id) => {
            let technique = actor
                .technique(id)
                .ok_or_else(|| CombatError::UnknownTechnique(id.clone()))?;
            can_use(technique, actor.level, &actor.traits, actor.energy)?;
            Ok(())
        }
        CombatAction::Transform(kind) => check_transform(actor, *kind),
        CombatAction::UseItem(id) => {
            let have = inventory.map(|inv| inv.count(id)).unwrap_or(0);
            if have == 0 {
                return Err(CombatError::NoSuchItem(id.clone()));
            }
            match item_def(id).map(|def| (def.name, def.kind)) {
                Some((_, ItemKind::Consumable(effect))) if !matches!(effect, ConsumableEffect::RestoreStamina(_)) => Ok(()),
                Some((name, _)) => Err(CombatError::ItemNotUsable(name.to_string())),
                None => Err(CombatError::ItemNotUsable(id.clone())),
            }
        }
        CombatAction::Flee => {
            if state.side(side.opponent()).character.is_boss {
                Err(CombatError::CannotFleeBoss)
            } else {
                Ok(())
            }
        }
    }
}

/// Start-of-turn upkeep then the action itself. Returns true if the actor fled.
fn take_turn(
    state: &mut CombatState,
    side: CombatSide,
    action: CombatAction,
    inventory: Option<&mut Inventory>,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) -> bool {
    let actor = state.side_mut(side);
    actor.stance = Stance::Neutral;
    let stunned = has_status(&actor.character.statuses, StatusKind::Stun);
    tick_actor_statuses(actor, events);
    if actor.character.is_defeated() {
        return false;
    }
    if stunned {
        events.push(CombatEvent::Stunned {
            name: actor.name().to_string(),
        });
        return false;
    }

    // The enemy's pick is unchecked; anything illegal degrades to a basic attack.
    let action = if validate_for(state, side, &action, inventory.as_deref()).is_ok() {
        action
    } else {
        CombatAction::Attack
    };
    resolve_action(state, side, action, inventory, rng, events)
}

fn tick_actor_statuses(actor: &mut Combatant, events: &mut Vec<CombatEvent>) {
    let name = actor.name().to_string();
    for tick in tick_statuses(&mut actor.character.statuses) {
        match tick {
            StatusTick::Damage { kind, amount } => {
                let dealt = actor.character.take_damage(amount);
                events.push(CombatEvent::StatusDamage {
                    name: name.clone(),
                    kind,
                    amount: dealt,
                });
            }
            StatusTick::Heal { amount } => {
                let healed = actor.character.heal(amount);
                events.push(CombatEvent::Regenerated {
                    name: name.clone(),
                    amount: healed,
                });
            }
            StatusTick::Expired { kind } => events.push(CombatEvent::StatusExpired {
                name: name.clone(),
                kind,
            }),
        }
    }
}

fn resolve_action(
    state: &mut CombatState,
    side: CombatSide,
    action: CombatAction,
    inventory: Option<&mut Inventory>,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) -> bool {
    let environment = state.environment;
    match action {
        CombatAction::Attack => {
            let strike = Strike {
                power: BASIC_ATTACK_POWER,
                technique: None,
                environment: environment.basic_attack_multiplier(),
                status: None,
            };
            strike.resolve(state, side, rng, events);
        }
        CombatAction::Technique(id) => {
            let actor = &mut state.side_mut(side).character;
            let Some(technique) = actor.technique_mut(&id) else {
                return false;
            };
            technique.trigger_cooldown();
            let technique = technique.clone();
            actor.spend_energy(technique.energy_cost);

            if technique.targets_self {
                if let Some(app) = technique.status {
                    let combatant = state.side_mut(side);
                    if roll_status(&app, rng) {
                        apply_status(&mut combatant.character.statuses, app.kind, app.duration, app.potency);
                        events.push(CombatEvent::StatusApplied {
                            target: combatant.name().to_string(),
                            kind: app.kind,
                        });
                    }
                }
            }
            if technique.power > 0 {
                let strike = Strike {
                    power: technique.power,
                    technique: Some(technique.name.clone()),
                    environment: environment.technique_multiplier(),
                    status: if technique.targets_self { None } else { technique.status },
                };
                strike.resolve(state, side, rng, events);
            }
        }
        CombatAction::Dodge => {
            let actor = state.side_mut(side);
            actor.stance = Stance::Dodging;
            events.push(CombatEvent::Dodging {
                name: actor.name().to_string(),
            });
        }
        CombatAction::Guard => {
            let actor = state.side_mut(side);
            actor.stance = Stance::Guarding;
            let energy = actor.character.restore_energy(GUARD_ENERGY);
            events.push(CombatEvent::Guarding {
                name: actor.name().to_string(),
                energy,
            });
        }
        CombatAction::Transform(kind) => {
            let actor = state.side_mut(side);
            actor.character.spend_energy(kind.profile().energy_cost);
            actor.character.transformation = Some(ActiveTransformation::begin(kind));
            events.push(CombatEvent::Transformed {
                name: actor.name().to_string(),
                kind,
            });
        }
        CombatAction::UseItem(id) => {
            if let Some(inventory) = inventory {
                use_item(state.side_mut(side), &id, inventory, events);
            }
        }
        CombatAction::Flee => {
            let chance = flee_chance(
                state.side(side).character.effective_speed(),
                state.side(side.opponent()).character.effective_speed(),
            );
            let name = state.side(side).name().to_string();
            if rng.gen_bool(chance) {
                events.push(CombatEvent::Fled { name });
                return true;
            }
            events.push(CombatEvent::FleeFailed { name });
        }
    }
    false
}

fn roll_status(app: &StatusApplication, rng: &mut impl Rng) -> bool {
    rng.gen_bool(app.chance.clamp(0.0, 1.0))
}

fn use_item(actor: &mut Combatant, item_id: &str, inventory: &mut Inventory, events: &mut Vec<CombatEvent>) {
    let Some(def) = item_def(item_id) else {
        return;
    };
    let ItemKind::Consumable(effect) = def.kind else {
        return;
    };
    if inventory.remove(item_id, 1).is_err() {
        return;
    }
    let detail = match effect {
        ConsumableEffect::Heal(amount) => format!("+{} HP", actor.character.heal(amount)),
        ConsumableEffect::RestoreEnergy(amount) => {
            format!("+{} cursed energy", actor.character.restore_energy(amount))
        }
        ConsumableEffect::Cleanse => format!("{} affliction(s) purged", cleanse(&mut actor.character.statuses)),
        ConsumableEffect::RestoreStamina(_) => "nothing happens".to_string(),
    };
    events.push(CombatEvent::ItemUsed {
        name: actor.name().to_string(),
        item: def.name.to_string(),
        detail,
    });
}

struct Strike {
    power: i32,
    technique: Option<String>,
    environment: f32,
    status: Option<StatusApplication>,
}

impl Strike {
    fn resolve(self, state: &mut CombatState, side: CombatSide, rng: &mut impl Rng, events: &mut Vec<CombatEvent>) {
        let (attacker, defender) = state.pair_mut(side);

        if defender.stance == Stance::Dodging {
            let chance = dodge_chance(
                defender.character.effective_speed(),
                attacker.character.effective_speed(),
            );
            if rng.gen_bool(chance) {
                events.push(CombatEvent::Dodged {
                    defender: defender.name().to_string(),
                    attacker: attacker.name().to_string(),
                });
                let counter = counter_damage(
                    defender.character.effective_attack(),
                    attacker.character.effective_defense(),
                );
                let (remaining, _) = absorb_with_shield(&mut attacker.character.statuses, counter);
                let dealt = attacker.character.take_damage(remaining);
                events.push(CombatEvent::Countered {
                    attacker: defender.name().to_string(),
                    target: attacker.name().to_string(),
                    amount: dealt,
                });
                return;
            }
            events.push(CombatEvent::DodgeFailed {
                defender: defender.name().to_string(),
            });
        }

        let input = HitInput {
            power: self.power,
            attack: attacker.character.effective_attack(),
            defense: defender.character.effective_defense(),
            attacker_speed: attacker.character.effective_speed(),
            guarding: defender.stance == Stance::Guarding,
            environment: self.environment,
            fatigued: attacker.fatigued,
        };
        let roll = roll_hit(&input, rng);
        let (remaining, absorbed) = absorb_with_shield(&mut defender.character.statuses, roll.amount);
        let dealt = defender.character.take_damage(remaining);
        events.push(CombatEvent::Hit {
            attacker: attacker.name().to_string(),
            target: defender.name().to_string(),
            technique: self.technique,
            amount: dealt,
            critical: roll.critical,
            absorbed,
        });

        if let Some(app) = self.status {
            if !defender.character.is_defeated() && roll_status(&app, rng) {
                apply_status(&mut defender.character.statuses, app.kind, app.duration, app.potency);
                events.push(CombatEvent::StatusApplied {
                    target: defender.name().to_string(),
                    kind: app.kind,
                });
            }
        }
    }
}

fn check_end(state: &CombatState) -> Option<CombatEnd> {
    if state.player.character.is_defeated() {
        Some(CombatEnd::Defeat)
    } else if state.enemy.character.is_defeated() {
        Some(CombatEnd::Victory)
    } else {
        None
    }
}

fn end_of_round(state: &mut CombatState, events: &mut Vec<CombatEvent>) {
    for side in [CombatSide::Player, CombatSide::Enemy] {
        let combatant = state.side_mut(side);
        let name = combatant.name().to_string();
        let character = &mut combatant.character;
        for technique in character.techniques.iter_mut() {
            technique.tick_cooldown();
        }
        character.transform_cooldown = character.transform_cooldown.saturating_sub(1);
        if let Some(active) = character.transformation.as_mut() {
            if active.tick() {
                let kind = active.kind;
                character.transformation = None;
                character.transform_cooldown = TRANSFORM_COOLDOWN_TURNS;
                events.push(CombatEvent::TransformationEnded { name, kind });
            }
        }
        character.restore_energy(ROUND_ENERGY);
    }
}

fn finish_combat(
    state: &mut CombatState,
    end: CombatEnd,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) -> Option<CombatRewards> {
    state.active = false;
    state.outcome = Some(end);
    info!(outcome = %end, round = state.round, enemy = %state.enemy_id, "combat finished");

    match end {
        CombatEnd::Victory => {
            events.push(CombatEvent::Defeated {
                name: state.enemy.name().to_string(),
            });
            let rewards = roll_rewards(state, rng);
            state.rewards = Some(rewards.clone());
            Some(rewards)
        }
        CombatEnd::Defeat => {
            if state.rules.defeat_is_fatal {
                events.push(CombatEvent::Defeated {
                    name: state.player.name().to_string(),
                });
            } else {
                state.player.character.hp = 1;
                events.push(CombatEvent::SpareBreath {
                    name: state.player.name().to_string(),
                });
            }
            None
        }
        CombatEnd::Fled => None,
    }
}

fn roll_rewards(state: &CombatState, rng: &mut impl Rng) -> CombatRewards {
    let xp = state.rules.scale_xp(xp_for_level(state.enemy.character.level));
    let drops = enemy_template(&state.enemy_id)
        .map(|template| {
            template
                .drops
                .iter()
                .filter(|drop| rng.gen_bool(drop.chance.clamp(0.0, 1.0)))
                .map(|drop| (drop.item_id.to_string(), drop.quantity))
                .collect()
        })
        .unwrap_or_default();
    CombatRewards { xp, drops }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::techniques::technique;
    use crate::simulation::modes::{Difficulty, GameMode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorcerer() -> Character {
        let mut c = Character::new("Yuji", 200, 100, 10, 8, 6);
        c.level = 3;
        c.learn_technique(technique("divergent_fist").expect("fist"));
        c
    }

    fn dummy_fight(rules: ModeRules) -> CombatState {
        let dummy = enemy_template("training_dummy").expect("dummy").spawn();
        start_combat(sorcerer(), dummy, "training_dummy", Environment::Open, rules, false)
    }

    #[test]
    fn invalid_action_changes_nothing() {
        let mut state = dummy_fight(ModeRules::default());
        let before = state.clone();
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(1);

        let err = combat_round(&mut state, CombatAction::Technique("hollow_void".into()), &mut inventory, &mut rng);
        assert_eq!(err, Err(CombatError::UnknownTechnique("hollow_void".into())));
        let err = combat_round(&mut state, CombatAction::UseItem("healing_talisman".into()), &mut inventory, &mut rng);
        assert_eq!(err, Err(CombatError::NoSuchItem("healing_talisman".into())));
        state.player.character.energy = 0;
        let err = combat_round(&mut state, CombatAction::Technique("divergent_fist".into()), &mut inventory, &mut rng);
        assert!(matches!(err, Err(CombatError::Technique(UseError::NotEnoughEnergy { .. }))));
        state.player.character.energy = before.player.character.energy;
        assert_eq!(state, before);
    }

    #[test]
    fn bosses_cannot_be_fled() {
        let boss = enemy_template("finger_bearer").expect("boss").spawn();
        let mut state = start_combat(sorcerer(), boss, "finger_bearer", Environment::Urban, ModeRules::default(), false);
        let mut rng = StdRng::seed_from_u64(2);
        let result = combat_round(&mut state, CombatAction::Flee, &mut Inventory::default(), &mut rng);
        assert_eq!(result, Err(CombatError::CannotFleeBoss));
        assert_eq!(state.round, 0);
    }

    #[test]
    fn guard_refunds_energy_before_upkeep() {
        let mut state = dummy_fight(ModeRules::default());
        state.player.character.energy = 0;
        let mut rng = StdRng::seed_from_u64(3);
        let report = combat_round(&mut state, CombatAction::Guard, &mut Inventory::default(), &mut rng).expect("round");
        assert!(report.ended.is_none());
        assert_eq!(state.player.character.energy, GUARD_ENERGY + ROUND_ENERGY);
    }

    #[test]
    fn victory_reports_rewards_and_closes_the_fight() {
        let mut state = dummy_fight(ModeRules::default());
        state.enemy.character.hp = 1;
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(4);
        let report = combat_round(&mut state, CombatAction::Attack, &mut inventory, &mut rng).expect("round");
        assert_eq!(report.ended, Some(CombatEnd::Victory));
        let rewards = report.rewards.expect("rewards");
        assert_eq!(rewards.xp, 40);
        assert!(rewards.drops.is_empty());
        assert!(!state.active);
        assert_eq!(
            combat_round(&mut state, CombatAction::Attack, &mut inventory, &mut rng),
            Err(CombatError::NotActive)
        );
    }

    #[test]
    fn training_defeat_leaves_one_hp() {
        let mut state = dummy_fight(ModeRules::new(GameMode::Training, Difficulty::Normal));
        state.player.character.hp = 1;
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let report = combat_round(&mut state, CombatAction::Guard, &mut inventory, &mut rng).expect("round");
            if report.ended.is_some() {
                break;
            }
        }
        assert_eq!(state.outcome, Some(CombatEnd::Defeat));
        assert_eq!(state.player.character.hp, 1);
    }

    #[test]
    fn stunned_player_loses_the_turn() {
        let mut state = dummy_fight(ModeRules::default());
        apply_status(&mut state.player.character.statuses, StatusKind::Stun, 1, 0);
        let mut rng = StdRng::seed_from_u64(6);
        let report = combat_round(&mut state, CombatAction::Attack, &mut Inventory::default(), &mut rng).expect("round");
        assert!(report.events.contains(&CombatEvent::Stunned { name: "Yuji".into() }));
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::Hit { attacker, .. } if attacker == "Yuji")));
        assert!(state.player.character.statuses.is_empty());
    }

    #[test]
    fn transformation_expires_into_cooldown() {
        let mut state = dummy_fight(ModeRules::default());
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(7);
        let surge = TransformationKind::CursedSurge;
        combat_round(&mut state, CombatAction::Transform(surge), &mut inventory, &mut rng).expect("transform");
        assert!(state.player.character.transformation.is_some());
        assert_eq!(
            combat_round(&mut state, CombatAction::Transform(surge), &mut inventory, &mut rng),
            Err(CombatError::AlreadyTransformed)
        );
        combat_round(&mut state, CombatAction::Guard, &mut inventory, &mut rng).expect("round two");
        let report = combat_round(&mut state, CombatAction::Guard, &mut inventory, &mut rng).expect("round three");
        assert!(report
            .events
            .contains(&CombatEvent::TransformationEnded { name: "Yuji".into(), kind: surge }));
        assert_eq!(state.player.character.transform_cooldown, TRANSFORM_COOLDOWN_TURNS);
        assert_eq!(
            combat_round(&mut state, CombatAction::Transform(surge), &mut inventory, &mut rng),
            Err(CombatError::TransformOnCooldown(TRANSFORM_COOLDOWN_TURNS))
        );
    }

    #[test]
    fn quick_dodger_counters() {
        let mut state = dummy_fight(ModeRules::default());
        state.player.character.speed = 100;
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(8);
        let mut countered = false;
        for _ in 0..30 {
            let report = combat_round(&mut state, CombatAction::Dodge, &mut inventory, &mut rng).expect("round");
            countered |= report.events.iter().any(|e| matches!(e, CombatEvent::Countered { .. }));
            if report.ended.is_some() {
                break;
            }
        }
        assert!(countered);
    }

    #[test]
    fn healing_item_is_consumed() {
        let mut state = dummy_fight(ModeRules::default());
        state.player.character.hp = 50;
        let mut inventory = Inventory::default();
        inventory.add("healing_talisman", 1);
        let mut rng = StdRng::seed_from_u64(9);
        let report = combat_round(&mut state, CombatAction::UseItem("healing_talisman".into()), &mut inventory, &mut rng)
            .expect("round");
        assert_eq!(inventory.count("healing_talisman"), 0);
        assert!(report.events.iter().any(|e| matches!(e, CombatEvent::ItemUsed { .. })));
    }

    #[test]
    fn stamina_items_stay_in_the_bag_during_a_fight() {
        let mut state = dummy_fight(ModeRules::default());
        let before = state.clone();
        let mut inventory = Inventory::default();
        inventory.add("field_ration", 1);
        let mut rng = StdRng::seed_from_u64(10);
        let result = combat_round(&mut state, CombatAction::UseItem("field_ration".into()), &mut inventory, &mut rng);
        assert_eq!(result, Err(CombatError::ItemNotUsable("Field Ration".into())));
        assert_eq!(inventory.count("field_ration"), 1);
        assert_eq!(state, before);
    }

    #[test]
    fn a_fast_sorcerer_gets_away() {
        let mut state = dummy_fight(ModeRules::default());
        state.player.character.speed = 100;
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut ended = None;
        for _ in 0..30 {
            let report = combat_round(&mut state, CombatAction::Flee, &mut inventory, &mut rng).expect("round");
            if report.ended.is_some() {
                assert!(report.events.contains(&CombatEvent::Fled { name: "Yuji".into() }));
                ended = report.ended;
                break;
            }
        }
        assert_eq!(ended, Some(CombatEnd::Fled));
        assert!(!state.active);
        assert_eq!(state.outcome, Some(CombatEnd::Fled));
    }
}
