//! City layer - buildings and storage

pub mod building;
pub mod stockpile;

pub use building::{Building, BuildingId, BuildingKind, BuildingRegistry, Facing};
pub use stockpile::{FoodKind, FoodProfile, Meal, Portion, ResourceKind, ResourceService, Stockpile};
