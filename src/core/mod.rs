pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{Calendar, Season, SeasonalActivity, TimePeriod};
pub use config::SimulationConfig;
pub use error::{HearthError, Result};
pub use types::{Cell, EntityId, Tick, Vec2};
