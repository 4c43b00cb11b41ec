//! Agent behavior: the per-tick scheduler and the handlers it drives

pub mod dispatch;
pub mod events;
pub mod gather;
pub mod leisure;
pub mod movement;
pub mod navigation;
pub mod needs;
pub mod social;
pub mod tick;
pub mod vitals;
pub mod work;

pub use dispatch::{evaluate, Decision};
pub use events::SimulationEvent;
pub use tick::{run_simulation_tick, run_tick_with_decisions, run_ticks};
