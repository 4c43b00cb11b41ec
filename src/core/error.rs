use thiserror::Error;

use crate::city::building::BuildingId;
use crate::core::types::EntityId;

#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Building not found: {0:?}")]
    BuildingNotFound(BuildingId),

    #[error("Traits {0:?} and {1:?} cannot be combined")]
    ConflictingTraits(crate::entity::citizen::Trait, crate::entity::citizen::Trait),

    #[error("A citizen can carry at most 2 traits, got {0}")]
    TooManyTraits(usize),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HearthError>;
