//! Non-extractive daytime activities: staffed jobs, construction, school and
//! the seasonal festival

use tracing::info;

use crate::city::building::{BuildingId, BuildingKind};
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::needs::NeedType;
use crate::entity::worker::Skill;
use crate::entity::{Citizen, Needs, Worker};
use crate::simulation::events::SimulationEvent;
use crate::simulation::navigation::{approach_building, enter_building, Approach};

/// Experience per evaluation spent at a staffed job
pub const WORK_XP: u32 = 2;

/// Education is faster when the school has a teacher
const TEACHER_MULTIPLIER: f32 = 1.5;

fn set_activity(world: &mut World, id: EntityId, label: &str) {
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.set_activity(label);
    }
}

fn grant_xp(world: &mut World, id: EntityId, skill: Skill, xp: u32) {
    let level_up = world.store.get_mut::<Worker>(id).and_then(|w| w.grant_xp(skill, xp));
    if let Some(level) = level_up {
        world.emit(SimulationEvent::SkillLevelUp { agent: id, skill, level });
    }
}

/// Go to a non-extractive workplace and put in time there
pub fn work_shift(world: &mut World, id: EntityId, workplace: BuildingId) -> bool {
    match approach_building(world, id, workplace) {
        Approach::Arrived => {
            enter_building(world, id, workplace);
            let skill = world.store.get::<Worker>(id).map(|w| w.profession.skill());
            if let Some(skill) = skill {
                grant_xp(world, id, skill, WORK_XP);
            }
            set_activity(world, id, "working");
            true
        }
        Approach::EnRoute => {
            set_activity(world, id, "commuting");
            true
        }
        Approach::Unreachable => false,
    }
}

/// Contribute work to the nearest unfinished building
pub fn construction_step(world: &mut World, id: EntityId) -> bool {
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let Some(site) = world.buildings.nearest(here, |b| !b.complete) else {
        return false;
    };

    match approach_building(world, id, site) {
        Approach::Arrived => {}
        Approach::EnRoute => {
            set_activity(world, id, "walking to construction site");
            return true;
        }
        Approach::Unreachable => return false,
    }

    let level = world.store.get::<Worker>(id).map(|w| w.skill_level(Skill::Building)).unwrap_or(0);
    let trait_bonus = world.store.get::<Citizen>(id).map(|c| c.work_bonus()).unwrap_or(0.0);
    let work = world.config.construction_work * (1.0 + level as f32 * 0.1 + trait_bonus).max(0.1);

    if world.buildings.add_construction(site, work) {
        world.pathfinder.invalidate();
        let kind = world.buildings.get(site).map(|b| b.kind);
        info!("building {:?} ({:?}) completed", site, kind);
        let tick = world.current_tick();
        world.emit(SimulationEvent::BuildingCompleted { building: site, tick });
    }
    grant_xp(world, id, Skill::Building, WORK_XP);
    set_activity(world, id, "building");
    true
}

/// Children attend the nearest finished school
pub fn attend_school(world: &mut World, id: EntityId) -> bool {
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let Some(school) = world
        .buildings
        .nearest(here, |b| b.kind == BuildingKind::School && b.complete)
    else {
        return false;
    };

    match approach_building(world, id, school) {
        Approach::Arrived => {}
        Approach::EnRoute => {
            set_activity(world, id, "walking to school");
            return true;
        }
        Approach::Unreachable => return false,
    }

    enter_building(world, id, school);
    let staffed = world.buildings.get(school).map(|b| b.is_staffed()).unwrap_or(false);
    let rate = world.config.education_rate * if staffed { TEACHER_MULTIPLIER } else { 1.0 };

    let mut graduated = false;
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.education = (citizen.education + rate).min(100.0);
        if citizen.education >= 100.0 && !citizen.educated {
            citizen.educated = true;
            graduated = true;
        }
        citizen.set_activity("at school");
    }
    if graduated {
        info!("agent {} finished school", id);
        world.emit(SimulationEvent::Graduated { agent: id });
    }
    true
}

/// Join the festival at the town square
pub fn celebrate(world: &mut World, id: EntityId) -> bool {
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let Some(square) = world
        .buildings
        .nearest(here, |b| b.kind == BuildingKind::TownSquare && b.complete)
    else {
        return false;
    };

    match approach_building(world, id, square) {
        Approach::Arrived => {
            let joy = world.config.festival_happiness;
            if let Some(needs) = world.store.get_mut::<Needs>(id) {
                needs.adjust(NeedType::Happiness, joy);
                needs.last_social = world.calendar.current_tick();
            }
            set_activity(world, id, "celebrating");
            true
        }
        Approach::EnRoute => {
            set_activity(world, id, "going to the festival");
            true
        }
        Approach::Unreachable => false,
    }
}
