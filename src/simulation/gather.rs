//! Gather handler - the seek, extract, carry and deposit cycle of
//! extractive professions
//!
//! The cycle lives on the worker as `Option<GatherState>`. `None` means it was
//! interrupted; it resumes at `Returning` when the worker still carries goods
//! and at `Seeking` otherwise.

use rand::Rng;
use tracing::debug;

use crate::city::building::{BuildingId, BuildingKind};
use crate::city::stockpile::ResourceKind;
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::worker::{deposit_yield, GatherProfile, MAX_SKILL_LEVEL};
use crate::entity::{Carry, Citizen, GatherState, GatherTarget, PendingPickup, Worker};
use crate::simulation::events::SimulationEvent;
use crate::simulation::navigation::{approach_building, approach_cell, Approach};

/// Experience granted per completed extraction
pub const GATHER_XP: u32 = 10;

/// Education bonus to work speed
pub const EDUCATION_BONUS: f32 = 0.15;

fn set_activity(world: &mut World, id: EntityId, label: &str) {
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.set_activity(label);
    }
}

/// Run one evaluation of the gather cycle for a worker at `workplace`
pub fn gather_step(world: &mut World, id: EntityId, workplace: BuildingId) {
    let Some(worker) = world.store.get::<Worker>(id) else {
        return;
    };
    let Some(profile) = worker.profession.gather_profile() else {
        return;
    };
    let state = worker.gather.unwrap_or_else(|| worker.resume_state());

    let next = match state {
        GatherState::Seeking { target } => seek(world, id, workplace, &profile, target),
        GatherState::Gathering { target, elapsed } => extract(world, id, &profile, target, elapsed),
        GatherState::Returning => return_to_workplace(world, id, workplace),
        GatherState::SeekingPickup { pickup } => fetch_pickup(world, id, pickup),
    };

    if let Some(worker) = world.store.get_mut::<Worker>(id) {
        worker.gather = Some(next);
    }
}

/// Walk to the workplace and stand there
fn idle_at_workplace(world: &mut World, id: EntityId, workplace: BuildingId) {
    if approach_building(world, id, workplace) == Approach::Arrived {
        set_activity(world, id, "idle at workplace");
    } else {
        set_activity(world, id, "heading to workplace");
    }
}

fn start_gathering(world: &mut World, id: EntityId, target: GatherTarget) -> GatherState {
    set_activity(world, id, "gathering");
    GatherState::Gathering { target, elapsed: 0 }
}

fn seek(
    world: &mut World,
    id: EntityId,
    workplace: BuildingId,
    profile: &GatherProfile,
    target: Option<GatherTarget>,
) -> GatherState {
    let multiplier = world.calendar.seasonal_multiplier(profile.activity);
    if multiplier <= 0.0 || world.storage.is_storage_full() {
        idle_at_workplace(world, id, workplace);
        return GatherState::Seeking { target: None };
    }

    // Re-validate the committed target
    if let Some(t) = target {
        if world.grid.resource(t.tile, t.deposit) > 0 {
            match approach_cell(world, id, t.tile, true) {
                Approach::Arrived => return start_gathering(world, id, t),
                Approach::EnRoute => return GatherState::Seeking { target: Some(t) },
                Approach::Unreachable => {}
            }
        }
    }

    let Some(here) = world.agent_cell(id) else {
        return GatherState::Seeking { target: None };
    };
    let Some((center, radius, deposits)) = world
        .buildings
        .get(workplace)
        .map(|b| (b.center(), b.kind.work_radius(), b.kind.target_deposits()))
    else {
        return GatherState::Seeking { target: None };
    };

    let mut candidates = world.grid.cells_with_deposits(center, radius, deposits);
    candidates.sort_by_key(|(cell, _)| (cell.manhattan(&here), *cell));

    for (tile, deposit) in candidates.into_iter().take(world.config.gather_candidates) {
        let t = GatherTarget { tile, deposit };
        match approach_cell(world, id, tile, true) {
            Approach::Arrived => return start_gathering(world, id, t),
            Approach::EnRoute => {
                debug!("agent {} committed to {:?} at {}", id, deposit, tile);
                set_activity(world, id, "walking to resource");
                return GatherState::Seeking { target: Some(t) };
            }
            Approach::Unreachable => continue,
        }
    }

    idle_at_workplace(world, id, workplace);
    GatherState::Seeking { target: None }
}

fn extract(
    world: &mut World,
    id: EntityId,
    profile: &GatherProfile,
    target: GatherTarget,
    elapsed: u32,
) -> GatherState {
    let multiplier = world.calendar.seasonal_multiplier(profile.activity);
    if multiplier <= 0.0 || world.grid.resource(target.tile, target.deposit) == 0 {
        return GatherState::Seeking { target: None };
    }

    let elapsed = elapsed + world.config.ai_interval as u32;
    let (Some(worker), Some(citizen)) = (world.store.get::<Worker>(id), world.store.get::<Citizen>(id)) else {
        return GatherState::Seeking { target: None };
    };
    let skill = worker.profession.skill();
    let level = worker.skill_level(skill);
    let education = if citizen.educated { EDUCATION_BONUS } else { 0.0 };
    let bonus = 1.0 + level as f32 * 0.1 + citizen.work_bonus() + education + worker.milestone_bonus();
    let required = profile.base_ticks as f32 / (multiplier * bonus.max(0.1));

    if (elapsed as f32) < required {
        return GatherState::Gathering { target, elapsed };
    }

    // A neighbour may have emptied the tile since the last evaluation
    if world.grid.deplete(target.tile, target.deposit, 1) == 0 {
        return GatherState::Seeking { target: None };
    }

    let mut amount = profile.base_yield + level as u32 / 2;
    if profile.needs_tool {
        if world.storage.amount(ResourceKind::Tools) == 0 {
            amount = (amount / 2).max(1);
        } else {
            world.storage.remove_resource(ResourceKind::Tools, 1);
            world.emit(SimulationEvent::ToolConsumed { agent: id });
        }
    }
    if level >= MAX_SKILL_LEVEL && world.rng.gen::<f32>() < world.config.master_bonus_chance {
        amount += 1;
    }

    let resource = deposit_yield(target.deposit);
    let mut level_up = None;
    if let Some(worker) = world.store.get_mut::<Worker>(id) {
        worker.carrying = Some(Carry { resource, amount });
        worker.lifetime_gathers += 1;
        level_up = worker.grant_xp(skill, GATHER_XP);
        if let Some((resource, amount)) = profile.secondary {
            worker.pending_pickup = Some(PendingPickup { tile: target.tile, resource, amount });
        }
    }

    let tick = world.current_tick();
    world.emit(SimulationEvent::Gathered { agent: id, resource, amount, tick });
    if let Some(level) = level_up {
        world.emit(SimulationEvent::SkillLevelUp { agent: id, skill, level });
    }
    set_activity(world, id, "carrying goods");
    GatherState::Returning
}

fn return_to_workplace(world: &mut World, id: EntityId, workplace: BuildingId) -> GatherState {
    let carrying = world.store.get::<Worker>(id).and_then(|w| w.carrying);
    let Some(carry) = carrying else {
        return after_deposit(world, id);
    };

    match approach_building(world, id, workplace) {
        Approach::Arrived => {}
        Approach::EnRoute => return GatherState::Returning,
        Approach::Unreachable => {
            set_activity(world, id, "lost");
            return GatherState::Returning;
        }
    }

    if !deposit_carry(world, id, carry) {
        return GatherState::Returning;
    }
    after_deposit(world, id)
}

/// Put as much of `carry` into storage as fits; true once nothing is left
fn deposit_carry(world: &mut World, id: EntityId, carry: Carry) -> bool {
    if world.storage.is_storage_full() {
        set_activity(world, id, "waiting for storage space");
        return false;
    }

    let added = world.storage.add_resource(carry.resource, carry.amount);
    let remaining = carry.amount.saturating_sub(added);
    if let Some(worker) = world.store.get_mut::<Worker>(id) {
        worker.carrying = (remaining > 0).then_some(Carry { resource: carry.resource, amount: remaining });
    }
    if added > 0 {
        debug!("agent {} deposited {} {:?}", id, added, carry.resource);
        let tick = world.current_tick();
        world.emit(SimulationEvent::Deposited { agent: id, resource: carry.resource, amount: added, tick });
    }
    if remaining > 0 {
        set_activity(world, id, "waiting for storage space");
        return false;
    }
    true
}

/// Bring goods still carried after losing a job to the nearest storehouse.
/// Returns false when there is nothing to deliver or nowhere to take it.
pub fn deliver_leftovers(world: &mut World, id: EntityId) -> bool {
    let Some(worker) = world.store.get::<Worker>(id) else {
        return false;
    };
    let Some(carry) = worker.carrying.filter(|_| worker.workplace.is_none()) else {
        return false;
    };
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let Some(storehouse) = world
        .buildings
        .nearest(here, |b| b.kind == BuildingKind::Storehouse && b.complete)
    else {
        return false;
    };

    match approach_building(world, id, storehouse) {
        Approach::Arrived => {
            deposit_carry(world, id, carry);
            true
        }
        Approach::EnRoute => {
            set_activity(world, id, "delivering goods");
            true
        }
        Approach::Unreachable => false,
    }
}

fn after_deposit(world: &mut World, id: EntityId) -> GatherState {
    let pickup = world.store.get_mut::<Worker>(id).and_then(|w| w.pending_pickup.take());
    match pickup {
        Some(pickup) => GatherState::SeekingPickup { pickup },
        None => GatherState::Seeking { target: None },
    }
}

fn fetch_pickup(world: &mut World, id: EntityId, pickup: PendingPickup) -> GatherState {
    match approach_cell(world, id, pickup.tile, true) {
        Approach::Arrived => {
            if let Some(worker) = world.store.get_mut::<Worker>(id) {
                worker.carrying = Some(Carry { resource: pickup.resource, amount: pickup.amount });
            }
            set_activity(world, id, "carrying goods");
            GatherState::Returning
        }
        Approach::EnRoute => {
            set_activity(world, id, "fetching");
            GatherState::SeekingPickup { pickup }
        }
        Approach::Unreachable => {
            debug!("agent {} abandoned {:?} pickup", id, pickup.resource);
            world.emit(SimulationEvent::PickupAbandoned { agent: id, resource: pickup.resource });
            GatherState::Seeking { target: None }
        }
    }
}
