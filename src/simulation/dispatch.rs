//! Per-agent decision tree
//!
//! Evaluated on the agent's scheduled ticks only. Exactly one branch acts per
//! evaluation and the branch taken is returned as a `Decision`.

use serde::Serialize;
use tracing::{debug, warn};

use crate::city::building::BuildingId;
use crate::core::calendar::TimePeriod;
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::{Citizen, Family, Movement, Needs, Profession, Worker};
use crate::simulation::events::SimulationEvent;
use crate::simulation::gather::{deliver_leftovers, gather_step};
use crate::simulation::leisure::{advance_pursuit, tick_cooldown, try_leisure};
use crate::simulation::navigation::wander;
use crate::simulation::needs::{eat, seek_warmth, sleep, stay_asleep};
use crate::simulation::social::{apply_loneliness, continue_chat, try_chat, try_tavern};
use crate::simulation::work::{attend_school, celebrate, construction_step, work_shift};

/// The branch an evaluation ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Decision {
    Chatting,
    Sleeping,
    StuckRecovery,
    Travelling,
    EmergencyMeal,
    SeekWarmth,
    Rest,
    NightSleep,
    Meal,
    Festival,
    Gathering,
    Working,
    Delivering,
    Construction,
    School,
    Tavern,
    Chat,
    Leisure,
    Wander,
    Idle,
}

/// Snapshot of the fields the tree branches on
struct Snapshot {
    child: bool,
    food: f32,
    warmth: f32,
    energy: f32,
    workplace: Option<BuildingId>,
    profession: Profession,
    educated: bool,
    moving: bool,
}

fn snapshot(world: &World, id: EntityId) -> Option<Snapshot> {
    let citizen = world.store.get::<Citizen>(id)?;
    let needs = world.store.get::<Needs>(id)?;
    let worker = world.store.get::<Worker>(id)?;
    let movement = world.store.get::<Movement>(id)?;
    Some(Snapshot {
        child: citizen.is_child(),
        food: needs.food,
        warmth: needs.warmth,
        energy: needs.energy,
        workplace: worker.workplace,
        profession: worker.profession,
        educated: citizen.educated,
        moving: movement.is_moving(),
    })
}

/// Clear references to entities or buildings that no longer exist
pub fn sweep_stale_references(world: &mut World, id: EntityId) {
    let workplace = world.store.get::<Worker>(id).and_then(|w| w.workplace);
    if let Some(b) = workplace.filter(|b| !world.buildings.contains(*b)) {
        if let Some(worker) = world.store.get_mut::<Worker>(id) {
            worker.unassign();
        }
        debug!("agent {} lost workplace {:?}", id, b);
    }

    let inside = world.store.get::<Citizen>(id).and_then(|c| c.inside);
    if inside.map(|b| !world.buildings.contains(b)).unwrap_or(false) {
        if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
            citizen.inside = None;
        }
    }

    let Some(family) = world.store.get::<Family>(id) else {
        return;
    };
    let home_gone = family.home.map(|h| !world.buildings.contains(h)).unwrap_or(false);
    let partner_gone = family.partner.map(|p| !world.store.contains(p)).unwrap_or(false);
    let live_children: Vec<EntityId> = family
        .children
        .iter()
        .copied()
        .filter(|c| world.store.contains(*c))
        .collect();

    if let Some(family) = world.store.get_mut::<Family>(id) {
        if home_gone {
            family.home = None;
        }
        if partner_gone {
            family.sever_partner();
        }
        family.children = live_children;
    }
}

/// Track progress between evaluations; true when recovery kicked in
fn check_stuck(world: &mut World, id: EntityId) -> bool {
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let threshold = world.config.stuck_threshold;
    let Some(movement) = world.store.get_mut::<Movement>(id) else {
        return false;
    };
    if movement.last_cell != Some(here) {
        movement.stuck_counter = 0;
    } else if movement.is_moving() {
        movement.stuck_counter += 1;
    }
    movement.last_cell = Some(here);
    if movement.stuck_counter < threshold {
        return false;
    }
    movement.stuck_counter = 0;
    movement.clear();

    let radius = world.config.stuck_wander_radius;
    wander(world, id, radius);

    let auto_assigned = world
        .store
        .get::<Worker>(id)
        .and_then(|w| w.workplace.filter(|_| !w.manually_assigned));
    if let Some(building) = auto_assigned {
        world.unassign_worker(id);
        warn!("agent {} stuck at {}, unassigned from {:?}", id, here, building);
        world.emit(SimulationEvent::WorkerUnassigned { agent: id, building });
    } else {
        warn!("agent {} stuck at {}, wandering off", id, here);
    }
    true
}

fn is_working_hours(world: &World) -> bool {
    matches!(
        world.calendar.current_time_period(),
        TimePeriod::Morning | TimePeriod::Afternoon
    )
}

fn wants_night_sleep(world: &World, s: &Snapshot) -> bool {
    world.calendar.is_night() && s.energy < world.config.night_sleep_energy
}

fn set_activity(world: &mut World, id: EntityId, label: &str) {
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.set_activity(label);
    }
}

/// Run one evaluation for `id` and report which branch acted
pub fn evaluate(world: &mut World, id: EntityId) -> Decision {
    if !world.store.has::<Citizen>(id) {
        return Decision::Idle;
    }
    sweep_stale_references(world, id);
    tick_cooldown(world, id);

    if continue_chat(world, id) {
        return Decision::Chatting;
    }
    if stay_asleep(world, id) {
        return Decision::Sleeping;
    }

    apply_loneliness(world, id);

    if check_stuck(world, id) {
        return Decision::StuckRecovery;
    }

    let Some(s) = snapshot(world, id) else {
        return Decision::Idle;
    };
    if s.moving {
        return Decision::Travelling;
    }

    if s.child {
        evaluate_child(world, id, &s)
    } else {
        evaluate_adult(world, id, &s)
    }
}

fn evaluate_child(world: &mut World, id: EntityId, s: &Snapshot) -> Decision {
    if s.food < world.config.starving_threshold && eat(world, id, true) {
        return Decision::EmergencyMeal;
    }
    if s.food < world.config.hungry_threshold && eat(world, id, false) {
        return Decision::Meal;
    }
    if (wants_night_sleep(world, s) || s.energy < world.config.exhausted_threshold) && sleep(world, id) {
        return Decision::NightSleep;
    }
    if world.calendar.is_festival() && celebrate(world, id) {
        return Decision::Festival;
    }
    if is_working_hours(world) && !s.educated && attend_school(world, id) {
        return Decision::School;
    }
    set_activity(world, id, "playing");
    Decision::Idle
}

fn evaluate_adult(world: &mut World, id: EntityId, s: &Snapshot) -> Decision {
    if s.food < world.config.starving_threshold && eat(world, id, true) {
        return Decision::EmergencyMeal;
    }
    if s.warmth < world.config.freezing_threshold && seek_warmth(world, id) {
        return Decision::SeekWarmth;
    }
    if s.energy < world.config.exhausted_threshold && sleep(world, id) {
        return Decision::Rest;
    }
    if wants_night_sleep(world, s) && sleep(world, id) {
        return Decision::NightSleep;
    }
    if s.food < world.config.hungry_threshold && eat(world, id, false) {
        return Decision::Meal;
    }
    if world.calendar.is_festival() && celebrate(world, id) {
        return Decision::Festival;
    }

    if is_working_hours(world) {
        if let Some(workplace) = s.workplace {
            if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
                citizen.pursuit = None;
            }
            if s.profession.is_extractive() {
                gather_step(world, id, workplace);
                return Decision::Gathering;
            }
            if work_shift(world, id, workplace) {
                return Decision::Working;
            }
        } else if deliver_leftovers(world, id) {
            return Decision::Delivering;
        } else if s.profession == Profession::Laborer && construction_step(world, id) {
            return Decision::Construction;
        }
    }

    if advance_pursuit(world, id) {
        return Decision::Leisure;
    }
    if try_tavern(world, id) {
        return Decision::Tavern;
    }
    if try_chat(world, id) {
        return Decision::Chat;
    }
    if try_leisure(world, id) {
        return Decision::Leisure;
    }
    let radius = world.config.wander_radius;
    if wander(world, id, radius) {
        set_activity(world, id, "wandering");
        return Decision::Wander;
    }
    set_activity(world, id, "idle");
    Decision::Idle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::{BuildingKind, Facing};
    use crate::city::stockpile::{FoodKind, ResourceKind};
    use crate::core::config::SimulationConfig;
    use crate::core::types::Cell;
    use crate::entity::Sex;

    fn setup() -> (World, EntityId) {
        let mut world = World::new(30, 30, SimulationConfig::default());
        let c = Citizen::new("Dora", "Test", 30, Sex::Female, &[]).unwrap();
        let id = world.spawn_citizen(c, Cell::new(5, 5));
        // Midmorning
        world.calendar.set_tick(world.calendar.ticks_per_day() * 9 / 24);
        (world, id)
    }

    #[test]
    fn test_starvation_outranks_freezing() {
        let (mut world, id) = setup();
        world.storage.add_resource(ResourceKind::Food(FoodKind::Bread), 5);
        world
            .place_building(BuildingKind::House, Cell::new(10, 10), Facing::South, true)
            .unwrap();
        let needs = world.store.get_mut::<Needs>(id).unwrap();
        needs.food = 10.0;
        needs.warmth = 5.0;
        assert_eq!(evaluate(&mut world, id), Decision::EmergencyMeal);
    }

    #[test]
    fn test_committed_path_short_circuits() {
        let (mut world, id) = setup();
        world
            .store
            .get_mut::<Movement>(id)
            .unwrap()
            .set_path(vec![Cell::new(5, 5), Cell::new(6, 5)]);
        assert_eq!(evaluate(&mut world, id), Decision::Travelling);
    }

    #[test]
    fn test_stale_partner_is_severed() {
        let (mut world, id) = setup();
        let other = world.spawn_citizen(Citizen::new("Ed", "Test", 30, Sex::Male, &[]).unwrap(), Cell::new(1, 1));
        world.store.get_mut::<Family>(id).unwrap().partner = Some(other);
        world.store.despawn(other);
        sweep_stale_references(&mut world, id);
        assert!(world.store.get::<Family>(id).unwrap().partner.is_none());
    }

    #[test]
    fn test_stuck_recovery_unassigns_auto_worker() {
        let (mut world, id) = setup();
        let hut = world
            .place_building(BuildingKind::ForagerHut, Cell::new(20, 20), Facing::South, true)
            .unwrap();
        world.assign_worker(id, hut, false).unwrap();
        world.config.stuck_threshold = 2;

        let mut recovered = false;
        for _ in 0..4 {
            world
                .store
                .get_mut::<Movement>(id)
                .unwrap()
                .set_path(vec![Cell::new(6, 5)]);
            if evaluate(&mut world, id) == Decision::StuckRecovery {
                recovered = true;
                break;
            }
        }
        assert!(recovered);
        assert!(world.store.get::<Worker>(id).unwrap().workplace.is_none());
        assert!(world
            .events
            .contains(&SimulationEvent::WorkerUnassigned { agent: id, building: hut }));
    }

    #[test]
    fn test_manual_worker_keeps_job_when_stuck() {
        let (mut world, id) = setup();
        let hut = world
            .place_building(BuildingKind::ForagerHut, Cell::new(20, 20), Facing::South, true)
            .unwrap();
        world.assign_worker(id, hut, true).unwrap();
        world.config.stuck_threshold = 1;
        for _ in 0..3 {
            world
                .store
                .get_mut::<Movement>(id)
                .unwrap()
                .set_path(vec![Cell::new(6, 5)]);
            evaluate(&mut world, id);
        }
        assert_eq!(world.store.get::<Worker>(id).unwrap().workplace, Some(hut));
    }

    #[test]
    fn test_child_goes_to_school() {
        let mut world = World::new(30, 30, SimulationConfig::default());
        world.calendar.set_tick(world.calendar.ticks_per_day() * 9 / 24);
        let kid = world.spawn_citizen(Citizen::new("Pip", "Test", 9, Sex::Male, &[]).unwrap(), Cell::new(5, 5));
        world
            .place_building(BuildingKind::School, Cell::new(6, 6), Facing::South, true)
            .unwrap();
        assert_eq!(evaluate(&mut world, kid), Decision::School);
    }

    #[test]
    fn test_gatherer_works_in_the_morning() {
        let (mut world, id) = setup();
        let hut = world
            .place_building(BuildingKind::ForagerHut, Cell::new(10, 10), Facing::South, true)
            .unwrap();
        world.assign_worker(id, hut, true).unwrap();
        assert_eq!(evaluate(&mut world, id), Decision::Gathering);
    }
}
