//! Tick system - orchestrates simulation updates
//!
//! Each tick runs, in order:
//! movement -> vitals -> (daily regrowth) -> scheduled AI evaluations -> clock
//!
//! Movement and vitals touch every agent every tick. The decision tree is
//! amortized: agent `id` is evaluated only on ticks where
//! `(tick + id) % ai_interval == 0`, in ascending id order.

use tracing::trace;

use crate::core::types::{EntityId, Tick};
use crate::ecs::world::World;
use crate::simulation::dispatch::{evaluate, Decision};
use crate::simulation::events::SimulationEvent;
use crate::simulation::movement::movement_step;
use crate::simulation::vitals::{daily_regrowth, vitals_step};

/// Whether `id` gets a decision-tree evaluation on `tick`
pub fn is_scheduled(tick: Tick, id: EntityId, ai_interval: u64) -> bool {
    (tick + id.index()) % ai_interval.max(1) == 0
}

/// Agents due for evaluation this tick, ascending
fn scheduled_agents(world: &World) -> Vec<EntityId> {
    let tick = world.current_tick();
    let interval = world.config.ai_interval;
    world
        .store
        .citizens
        .keys()
        .copied()
        .filter(|id| is_scheduled(tick, *id, interval))
        .collect()
}

/// Run one tick and return the decisions made, for tests and debugging
pub fn run_tick_with_decisions(world: &mut World) -> (Vec<(EntityId, Decision)>, Vec<SimulationEvent>) {
    movement_step(world);
    vitals_step(world);

    if world.current_tick() % world.calendar.ticks_per_day() == 0 {
        daily_regrowth(world);
    }

    let mut decisions = Vec::new();
    for id in scheduled_agents(world) {
        let decision = evaluate(world, id);
        trace!("tick {} agent {} -> {:?}", world.current_tick(), id, decision);
        decisions.push((id, decision));
    }

    world.calendar.advance();
    (decisions, std::mem::take(&mut world.events))
}

/// Run one simulation tick, returning the events it produced
pub fn run_simulation_tick(world: &mut World) -> Vec<SimulationEvent> {
    run_tick_with_decisions(world).1
}

/// Run `ticks` ticks, collecting every event
pub fn run_ticks(world: &mut World, ticks: u64) -> Vec<SimulationEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(run_simulation_tick(world));
    }
    events
}
