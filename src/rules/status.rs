use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    Burn,
    Poison,
    Bleed,
    Stun,
    Weaken,
    Shield,
    Regen,
}

impl StatusKind {
    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Burn => "Burn",
            StatusKind::Poison => "Poison",
            StatusKind::Bleed => "Bleed",
            StatusKind::Stun => "Stun",
            StatusKind::Weaken => "Weaken",
            StatusKind::Shield => "Shield",
            StatusKind::Regen => "Regen",
        }
    }

    pub fn is_damage_over_time(self) -> bool {
        matches!(self, StatusKind::Burn | StatusKind::Poison | StatusKind::Bleed)
    }

    pub fn is_harmful(self) -> bool {
        !matches!(self, StatusKind::Shield | StatusKind::Regen)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub remaining_turns: u32,
    pub potency: i32,
}

/// How a technique inflicts a status on its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusApplication {
    pub kind: StatusKind,
    pub duration: u32,
    pub potency: i32,
    pub chance: f64,
}

/// What a single status did when the owner's turn started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTick {
    Damage { kind: StatusKind, amount: i32 },
    Heal { amount: i32 },
    Expired { kind: StatusKind },
}

/// Apply or refresh a status. Refreshing keeps the longer duration and higher potency.
pub fn apply_status(statuses: &mut Vec<StatusEffect>, kind: StatusKind, duration: u32, potency: i32) {
    if duration == 0 {
        return;
    }
    if let Some(existing) = statuses.iter_mut().find(|s| s.kind == kind) {
        existing.remaining_turns = existing.remaining_turns.max(duration);
        existing.potency = existing.potency.max(potency);
        return;
    }
    statuses.push(StatusEffect {
        kind,
        remaining_turns: duration,
        potency,
    });
}

pub fn has_status(statuses: &[StatusEffect], kind: StatusKind) -> bool {
    statuses
        .iter()
        .any(|s| s.kind == kind && s.remaining_turns > 0)
}

pub fn status_potency(statuses: &[StatusEffect], kind: StatusKind) -> i32 {
    statuses
        .iter()
        .filter(|s| s.kind == kind && s.remaining_turns > 0)
        .map(|s| s.potency)
        .max()
        .unwrap_or(0)
}

/// Advance every status by one turn. Damage and healing amounts are returned for the
/// caller to apply; expired statuses are dropped.
pub fn tick_statuses(statuses: &mut Vec<StatusEffect>) -> Vec<StatusTick> {
    let mut ticks = Vec::new();
    for status in statuses.iter_mut() {
        if status.kind.is_damage_over_time() {
            ticks.push(StatusTick::Damage {
                kind: status.kind,
                amount: status.potency.max(1),
            });
        } else if status.kind == StatusKind::Regen {
            ticks.push(StatusTick::Heal {
                amount: status.potency.max(1),
            });
        }
        status.remaining_turns = status.remaining_turns.saturating_sub(1);
        if status.remaining_turns == 0 {
            ticks.push(StatusTick::Expired { kind: status.kind });
        }
    }
    statuses.retain(|s| s.remaining_turns > 0);
    ticks
}

/// Shield soaks damage first. Returns `(remaining, absorbed)`.
pub fn absorb_with_shield(statuses: &mut Vec<StatusEffect>, damage: i32) -> (i32, i32) {
    let Some(shield) = statuses
        .iter_mut()
        .find(|s| s.kind == StatusKind::Shield && s.remaining_turns > 0)
    else {
        return (damage, 0);
    };
    let absorbed = shield.potency.min(damage).max(0);
    shield.potency -= absorbed;
    if shield.potency <= 0 {
        shield.remaining_turns = 0;
    }
    statuses.retain(|s| s.remaining_turns > 0);
    (damage - absorbed, absorbed)
}

pub fn cleanse(statuses: &mut Vec<StatusEffect>) -> usize {
    let before = statuses.len();
    statuses.retain(|s| !s.kind.is_harmful());
    before - statuses.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_keeps_longer_duration_and_higher_potency() {
        let mut statuses = Vec::new();
        apply_status(&mut statuses, StatusKind::Burn, 3, 4);
        apply_status(&mut statuses, StatusKind::Burn, 2, 6);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].remaining_turns, 3);
        assert_eq!(statuses[0].potency, 6);
    }

    #[test]
    fn tick_reports_damage_and_expiry() {
        let mut statuses = Vec::new();
        apply_status(&mut statuses, StatusKind::Poison, 1, 5);
        let ticks = tick_statuses(&mut statuses);
        assert!(ticks.contains(&StatusTick::Damage {
            kind: StatusKind::Poison,
            amount: 5
        }));
        assert!(ticks.contains(&StatusTick::Expired {
            kind: StatusKind::Poison
        }));
        assert!(statuses.is_empty());
    }

    #[test]
    fn shield_absorbs_then_breaks() {
        let mut statuses = Vec::new();
        apply_status(&mut statuses, StatusKind::Shield, 3, 10);
        assert_eq!(absorb_with_shield(&mut statuses, 6), (0, 6));
        assert_eq!(absorb_with_shield(&mut statuses, 9), (5, 4));
        assert!(!has_status(&statuses, StatusKind::Shield));
    }

    #[test]
    fn cleanse_removes_only_harmful() {
        let mut statuses = Vec::new();
        apply_status(&mut statuses, StatusKind::Bleed, 2, 3);
        apply_status(&mut statuses, StatusKind::Regen, 2, 3);
        assert_eq!(cleanse(&mut statuses), 1);
        assert!(has_status(&statuses, StatusKind::Regen));
    }
}
