pub mod character;
pub mod identity;
pub mod inventory;
pub mod stamina;
pub mod world;
