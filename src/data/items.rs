use crate::components::character::StatBonus;
use crate::components::inventory::EquipSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumableEffect {
    Heal(i32),
    RestoreEnergy(i32),
    RestoreStamina(i32),
    Cleanse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Consumable(ConsumableEffect),
    Equipment { slot: EquipSlot, bonus: StatBonus },
    Material,
    KeyItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    pub id: &'static str,
    pub name: &'static str,
    pub inputs: &'static [(&'static str, u32)],
    pub output: &'static str,
    pub output_quantity: u32,
}

const fn bonus(attack: i32, defense: i32, speed: i32, max_hp: i32) -> StatBonus {
    StatBonus {
        attack,
        defense,
        speed,
        max_hp,
    }
}

pub static ITEMS: &[ItemDef] = &[
    ItemDef {
        id: "healing_talisman",
        name: "Healing Talisman",
        description: "A paper ward soaked in reversed energy. Restores 40 HP.",
        kind: ItemKind::Consumable(ConsumableEffect::Heal(40)),
    },
    ItemDef {
        id: "greater_talisman",
        name: "Greater Healing Talisman",
        description: "Layered wards that knit flesh quickly. Restores 90 HP.",
        kind: ItemKind::Consumable(ConsumableEffect::Heal(90)),
    },
    ItemDef {
        id: "energy_vial",
        name: "Energy Vial",
        description: "Condensed cursed energy in a sealed vial. Restores 30 energy.",
        kind: ItemKind::Consumable(ConsumableEffect::RestoreEnergy(30)),
    },
    ItemDef {
        id: "purifying_salt",
        name: "Purifying Salt",
        description: "Shrine salt that burns away lingering curses.",
        kind: ItemKind::Consumable(ConsumableEffect::Cleanse),
    },
    ItemDef {
        id: "field_ration",
        name: "Field Ration",
        description: "Rice balls from the academy canteen. Restores 30 stamina.",
        kind: ItemKind::Consumable(ConsumableEffect::RestoreStamina(30)),
    },
    ItemDef {
        id: "iron_staff",
        name: "Iron Staff",
        description: "A training staff etched with simple seals.",
        kind: ItemKind::Equipment {
            slot: EquipSlot::Weapon,
            bonus: bonus(3, 1, 0, 0),
        },
    },
    ItemDef {
        id: "split_soul_blade",
        name: "Split Soul Blade",
        description: "A cursed tool that cuts the soul as easily as the body.",
        kind: ItemKind::Equipment {
            slot: EquipSlot::Weapon,
            bonus: bonus(8, 0, 1, 0),
        },
    },
    ItemDef {
        id: "chain_of_a_thousand_miles",
        name: "Chain of a Thousand Miles",
        description: "A chain with no visible end. Fast and unpredictable.",
        kind: ItemKind::Equipment {
            slot: EquipSlot::Weapon,
            bonus: bonus(5, 0, 4, 0),
        },
    },
    ItemDef {
        id: "warding_charm",
        name: "Warding Charm",
        description: "A bell charm that dulls incoming curses.",
        kind: ItemKind::Equipment {
            slot: EquipSlot::Charm,
            bonus: bonus(0, 4, 0, 10),
        },
    },
    ItemDef {
        id: "swift_charm",
        name: "Swift Charm",
        description: "A feather knotted in red thread.",
        kind: ItemKind::Equipment {
            slot: EquipSlot::Charm,
            bonus: bonus(0, 0, 3, 0),
        },
    },
    ItemDef {
        id: "talisman_paper",
        name: "Talisman Paper",
        description: "Blank ward paper.",
        kind: ItemKind::Material,
    },
    ItemDef {
        id: "curse_residue",
        name: "Curse Residue",
        description: "Sticky black residue left by exorcised spirits.",
        kind: ItemKind::Material,
    },
    ItemDef {
        id: "spirit_bone",
        name: "Spirit Bone",
        description: "A bone that hums faintly when held.",
        kind: ItemKind::Material,
    },
    ItemDef {
        id: "sealed_finger",
        name: "Sealed Finger",
        description: "A withered finger wrapped in seals. It is warm.",
        kind: ItemKind::KeyItem,
    },
    ItemDef {
        id: "academy_badge",
        name: "Academy Badge",
        description: "Proof of enrolment at the Tokyo academy.",
        kind: ItemKind::KeyItem,
    },
];

pub static RECIPES: &[Recipe] = &[
    Recipe {
        id: "healing_talisman",
        name: "Healing Talisman",
        inputs: &[("talisman_paper", 2), ("curse_residue", 1)],
        output: "healing_talisman",
        output_quantity: 1,
    },
    Recipe {
        id: "greater_talisman",
        name: "Greater Healing Talisman",
        inputs: &[("healing_talisman", 2), ("spirit_bone", 1)],
        output: "greater_talisman",
        output_quantity: 1,
    },
    Recipe {
        id: "purifying_salt",
        name: "Purifying Salt",
        inputs: &[("curse_residue", 2)],
        output: "purifying_salt",
        output_quantity: 2,
    },
    Recipe {
        id: "warding_charm",
        name: "Warding Charm",
        inputs: &[("spirit_bone", 2), ("talisman_paper", 1)],
        output: "warding_charm",
        output_quantity: 1,
    },
];

pub fn item_def(id: &str) -> Option<&'static ItemDef> {
    ITEMS.iter().find(|item| item.id == id)
}

pub fn item_name(id: &str) -> &str {
    item_def(id).map(|def| def.name).unwrap_or(id)
}

pub fn recipe(id: &str) -> Option<&'static Recipe> {
    RECIPES.iter().find(|recipe| recipe.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipes_reference_known_items() {
        for recipe in RECIPES {
            assert!(item_def(recipe.output).is_some(), "{}", recipe.id);
            for (input, qty) in recipe.inputs {
                assert!(item_def(input).is_some(), "{} -> {}", recipe.id, input);
                assert!(*qty > 0);
            }
        }
    }
}
