use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::character::{Character, StatBonus};
use crate::data::items::{item_def, ItemDef, ItemKind, Recipe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipSlot {
    Weapon,
    Charm,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("unknown item {0}")]
    UnknownItem(String),
    #[error("not enough {item}: need {needed}, have {have}")]
    NotEnough { item: String, needed: u32, have: u32 },
    #[error("{0} cannot be equipped")]
    NotEquipment(String),
    #[error("{0} cannot be used")]
    NotConsumable(String),
    #[error("nothing equipped in the {0:?} slot")]
    SlotEmpty(EquipSlot),
    #[error("unknown recipe {0}")]
    UnknownRecipe(String),
}

/// Items carried by the player plus what is currently equipped.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub items: BTreeMap<String, u32>,
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default)]
    pub charm: Option<String>,
}

impl Inventory {
    pub fn count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    pub fn has(&self, item_id: &str, quantity: u32) -> bool {
        self.count(item_id) >= quantity
    }

    pub fn add(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.items.entry(item_id.to_string()).or_insert(0) += quantity;
    }

    pub fn remove(&mut self, item_id: &str, quantity: u32) -> Result<(), InventoryError> {
        let have = self.count(item_id);
        if have < quantity {
            return Err(InventoryError::NotEnough {
                item: item_id.to_string(),
                needed: quantity,
                have,
            });
        }
        if have == quantity {
            self.items.remove(item_id);
        } else {
            self.items.insert(item_id.to_string(), have - quantity);
        }
        Ok(())
    }

    pub fn equipped(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_deref(),
            EquipSlot::Charm => self.charm.as_deref(),
        }
    }

    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<String> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Charm => &mut self.charm,
        }
    }

    /// Equip an item from the bag. Whatever was in the slot goes back into the bag.
    /// Returns the id of the replaced item, if any.
    pub fn equip(&mut self, character: &mut Character, item_id: &str) -> Result<Option<String>, InventoryError> {
        let def = item_def(item_id).ok_or_else(|| InventoryError::UnknownItem(item_id.to_string()))?;
        let ItemKind::Equipment { slot, bonus } = def.kind else {
            return Err(InventoryError::NotEquipment(def.name.to_string()));
        };
        self.remove(item_id, 1)?;

        let replaced = match self.slot_mut(slot).take() {
            Some(previous) => {
                character.bonus.subtract(equipment_bonus(&previous));
                self.add(&previous, 1);
                Some(previous)
            }
            None => None,
        };

        character.bonus.add(bonus);
        character.hp = character.hp.min(character.total_max_hp());
        *self.slot_mut(slot) = Some(item_id.to_string());
        Ok(replaced)
    }

    pub fn unequip(&mut self, character: &mut Character, slot: EquipSlot) -> Result<String, InventoryError> {
        let item_id = self.slot_mut(slot).take().ok_or(InventoryError::SlotEmpty(slot))?;
        character.bonus.subtract(equipment_bonus(&item_id));
        character.hp = character.hp.min(character.total_max_hp());
        self.add(&item_id, 1);
        Ok(item_id)
    }

    /// Consume every input of a recipe and add its output. Nothing is consumed
    /// unless all inputs are present.
    pub fn craft(&mut self, recipe: &Recipe) -> Result<(), InventoryError> {
        for (input, quantity) in recipe.inputs {
            let have = self.count(input);
            if have < *quantity {
                return Err(InventoryError::NotEnough {
                    item: input.to_string(),
                    needed: *quantity,
                    have,
                });
            }
        }
        for (input, quantity) in recipe.inputs {
            self.remove(input, *quantity)?;
        }
        self.add(recipe.output, recipe.output_quantity);
        Ok(())
    }

    pub fn consumables(&self) -> Vec<(&'static ItemDef, u32)> {
        self.items
            .iter()
            .filter_map(|(id, qty)| {
                let def = item_def(id)?;
                matches!(def.kind, ItemKind::Consumable(_)).then_some((def, *qty))
            })
            .collect()
    }
}

fn equipment_bonus(item_id: &str) -> StatBonus {
    match item_def(item_id).map(|def| def.kind) {
        Some(ItemKind::Equipment { bonus, .. }) => bonus,
        _ => StatBonus::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::recipe;

    #[test]
    fn remove_rejects_overdraw() {
        let mut inv = Inventory::default();
        inv.add("talisman_paper", 2);
        assert!(inv.remove("talisman_paper", 3).is_err());
        assert!(inv.remove("talisman_paper", 2).is_ok());
        assert!(!inv.items.contains_key("talisman_paper"));
    }

    #[test]
    fn craft_is_all_or_nothing() {
        let mut inv = Inventory::default();
        inv.add("talisman_paper", 2);
        let recipe = recipe("healing_talisman").expect("recipe");
        assert!(inv.craft(recipe).is_err());
        assert_eq!(inv.count("talisman_paper"), 2);

        inv.add("curse_residue", 1);
        inv.craft(recipe).expect("craft");
        assert_eq!(inv.count("healing_talisman"), 1);
        assert_eq!(inv.count("talisman_paper"), 0);
    }

    #[test]
    fn equip_swaps_and_moves_bonus() {
        let mut inv = Inventory::default();
        let mut c = Character::new("Test", 100, 50, 10, 10, 10);
        inv.add("split_soul_blade", 1);
        inv.add("iron_staff", 1);

        assert_eq!(inv.equip(&mut c, "iron_staff").expect("equip"), None);
        let staff_attack = c.effective_attack();
        let replaced = inv.equip(&mut c, "split_soul_blade").expect("equip");
        assert_eq!(replaced.as_deref(), Some("iron_staff"));
        assert_eq!(inv.count("iron_staff"), 1);
        assert!(c.effective_attack() > staff_attack);

        inv.unequip(&mut c, EquipSlot::Weapon).expect("unequip");
        assert_eq!(c.bonus, StatBonus::default());
        assert!(matches!(
            inv.equip(&mut c, "talisman_paper"),
            Err(InventoryError::NotEquipment(_)) | Err(InventoryError::UnknownItem(_))
        ));
    }
}
