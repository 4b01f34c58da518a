use crate::core::serialization::SaveState;
use crate::world::sqlite::{PersistenceError, SaveDb, SlotSummary};

/// Storage for named save slots.
pub trait SaveRepository {
    fn save_slot(&mut self, slot: &str, state: &SaveState) -> Result<(), PersistenceError>;
    fn load_slot(&self, slot: &str) -> Result<SaveState, PersistenceError>;
    fn list_slots(&self) -> Result<Vec<SlotSummary>, PersistenceError>;
    fn delete_slot(&mut self, slot: &str) -> Result<bool, PersistenceError>;
}

impl SaveRepository for SaveDb {
    fn save_slot(&mut self, slot: &str, state: &SaveState) -> Result<(), PersistenceError> {
        SaveDb::save_slot(self, slot, state)
    }

    fn load_slot(&self, slot: &str) -> Result<SaveState, PersistenceError> {
        SaveDb::load_slot(self, slot)
    }

    fn list_slots(&self) -> Result<Vec<SlotSummary>, PersistenceError> {
        SaveDb::list_slots(self)
    }

    fn delete_slot(&mut self, slot: &str) -> Result<bool, PersistenceError> {
        SaveDb::delete_slot(self, slot)
    }
}
