//! Events emitted by the simulation
//!
//! Pushed fire-and-forget into the world's event buffer and drained by
//! `run_simulation_tick` for display or logging.

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingId;
use crate::city::stockpile::{FoodKind, ResourceKind};
use crate::core::types::{EntityId, Tick};
use crate::entity::citizen::LeisureActivity;
use crate::entity::worker::Skill;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// A gatherer finished extracting and is now carrying the goods
    Gathered {
        agent: EntityId,
        resource: ResourceKind,
        amount: u32,
        tick: Tick,
    },
    /// Carried goods went into storage
    Deposited {
        agent: EntityId,
        resource: ResourceKind,
        amount: u32,
        tick: Tick,
    },
    /// A secondary pickup (leather) could not be reached and was left behind
    PickupAbandoned { agent: EntityId, resource: ResourceKind },
    /// A required tool was used up by an extraction
    ToolConsumed { agent: EntityId },
    Ate {
        agent: EntityId,
        food: FoodKind,
        emergency: bool,
    },
    FellAsleep { agent: EntityId, outdoors: bool },
    WokeUp { agent: EntityId },
    ChatStarted { agent: EntityId, partner: EntityId },
    LeisureCompleted { agent: EntityId, activity: LeisureActivity },
    SkillLevelUp { agent: EntityId, skill: Skill, level: u8 },
    BuildingCompleted { building: BuildingId, tick: Tick },
    Graduated { agent: EntityId },
    /// Stuck recovery removed an auto-assigned worker from their job
    WorkerUnassigned { agent: EntityId, building: BuildingId },
}

impl SimulationEvent {
    /// Short name of the event variant, for tallies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationEvent::Gathered { .. } => "gathered",
            SimulationEvent::Deposited { .. } => "deposited",
            SimulationEvent::PickupAbandoned { .. } => "pickup_abandoned",
            SimulationEvent::ToolConsumed { .. } => "tool_consumed",
            SimulationEvent::Ate { .. } => "ate",
            SimulationEvent::FellAsleep { .. } => "fell_asleep",
            SimulationEvent::WokeUp { .. } => "woke_up",
            SimulationEvent::ChatStarted { .. } => "chat_started",
            SimulationEvent::LeisureCompleted { .. } => "leisure_completed",
            SimulationEvent::SkillLevelUp { .. } => "skill_level_up",
            SimulationEvent::BuildingCompleted { .. } => "building_completed",
            SimulationEvent::Graduated { .. } => "graduated",
            SimulationEvent::WorkerUnassigned { .. } => "worker_unassigned",
        }
    }
}
