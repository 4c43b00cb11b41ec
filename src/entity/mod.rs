//! Agent components

pub mod citizen;
pub mod family;
pub mod movement;
pub mod needs;
pub mod worker;

pub use citizen::{Citizen, LeisureActivity, Pursuit, PursuitStage, PursuitTarget, Sex, Trait};
pub use family::{Family, RelationshipStatus};
pub use movement::{Movement, Position};
pub use needs::{NeedType, Needs};
pub use worker::{Carry, GatherState, GatherTarget, PendingPickup, Profession, Skill, Worker};
