//! Needs handler - meals, warmth and sleep
//!
//! Every function here returns whether it acted this evaluation, so the
//! dispatcher can fall through to the next branch when it could not.

use tracing::{debug, warn};

use crate::city::building::{BuildingId, BuildingKind};
use crate::city::stockpile::Portion;
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::needs::{NeedType, NEED_MAX};
use crate::entity::{Citizen, Family, Movement, Needs, Worker};
use crate::simulation::events::SimulationEvent;
use crate::simulation::navigation::{approach_building, enter_building, exit_building, Approach};

/// Drop whatever the agent was doing so a need can take over
pub fn interrupt(world: &mut World, id: EntityId) {
    if let Some(worker) = world.store.get_mut::<Worker>(id) {
        worker.interrupt();
    }
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.pursuit = None;
    }
}

fn set_activity(world: &mut World, id: EntityId, label: &str) {
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.set_activity(label);
    }
}

/// Eat from settlement storage, or head for the nearest food store when it is empty
///
/// An emergency meal is a small fixed portion taken wherever the agent stands.
pub fn eat(world: &mut World, id: EntityId, emergency: bool) -> bool {
    let Some(history) = world.store.get::<Needs>(id).map(|n| n.diet_slice()) else {
        return false;
    };
    let portion = if emergency {
        Portion::Fixed(world.config.emergency_meal_cost)
    } else {
        Portion::Standard
    };

    if let Some(meal) = world.storage.remove_food_prefer_variety(portion, &history) {
        let profile = meal.food.profile();
        let restore = if emergency { world.config.emergency_meal_restore } else { profile.restore };
        if let Some(needs) = world.store.get_mut::<Needs>(id) {
            needs.adjust(NeedType::Food, restore);
            needs.adjust(NeedType::Happiness, profile.happiness);
            needs.adjust(NeedType::Warmth, profile.warmth);
            needs.adjust(NeedType::Energy, profile.energy);
            needs.remember_meal(meal.food);
        }
        if emergency {
            warn!("agent {} starving, ate {} unit(s) of {:?}", id, meal.units, meal.food);
        } else {
            debug!("agent {} ate {:?}", id, meal.food);
        }
        interrupt(world, id);
        set_activity(world, id, "eating");
        world.emit(SimulationEvent::Ate { agent: id, food: meal.food, emergency });
        return true;
    }

    // Nothing in storage: wait at the nearest place food arrives
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let Some(store) = world
        .buildings
        .nearest(here, |b| b.complete && b.kind.sells_food())
    else {
        return false;
    };
    match approach_building(world, id, store) {
        Approach::Unreachable => false,
        _ => {
            interrupt(world, id);
            set_activity(world, id, "looking for food");
            true
        }
    }
}

/// Candidate shelters in order: own home, then the nearest house with room
fn shelters(world: &World, id: EntityId) -> Vec<BuildingId> {
    let mut found = Vec::new();
    let home = world.store.get::<Family>(id).and_then(|f| f.home);
    if let Some(home) = home.filter(|h| world.buildings.is_complete(*h)) {
        found.push(home);
    }
    if let Some(here) = world.agent_cell(id) {
        let nearest = world.buildings.nearest(here, |b| {
            b.kind == BuildingKind::House && b.complete && b.has_room_inside() && Some(b.id) != home
        });
        found.extend(nearest);
    }
    found
}

/// Get indoors somewhere warm. Does not put the agent to sleep.
pub fn seek_warmth(world: &mut World, id: EntityId) -> bool {
    let inside = world.store.get::<Citizen>(id).and_then(|c| c.inside);
    if inside.and_then(|b| world.buildings.get(b)).map(|b| b.kind.is_heated()).unwrap_or(false) {
        set_activity(world, id, "warming up");
        return true;
    }

    for shelter in shelters(world, id) {
        match approach_building(world, id, shelter) {
            Approach::Arrived => {
                if enter_building(world, id, shelter) {
                    interrupt(world, id);
                    set_activity(world, id, "warming up");
                    return true;
                }
            }
            Approach::EnRoute => {
                interrupt(world, id);
                set_activity(world, id, "seeking warmth");
                return true;
            }
            Approach::Unreachable => {}
        }
    }
    false
}

/// Go to bed: home, else any house with room, else (homeless and spent) the ground
pub fn sleep(world: &mut World, id: EntityId) -> bool {
    for shelter in shelters(world, id) {
        match approach_building(world, id, shelter) {
            Approach::Arrived => {
                if enter_building(world, id, shelter) {
                    fall_asleep(world, id, false);
                    return true;
                }
            }
            Approach::EnRoute => {
                interrupt(world, id);
                set_activity(world, id, "going to bed");
                return true;
            }
            Approach::Unreachable => {}
        }
    }

    let homeless = world.store.get::<Family>(id).map(|f| f.home.is_none()).unwrap_or(true);
    let energy = world.store.get::<Needs>(id).map(|n| n.energy).unwrap_or(NEED_MAX);
    if homeless && energy < world.config.emergency_energy {
        fall_asleep(world, id, true);
        return true;
    }
    false
}

fn fall_asleep(world: &mut World, id: EntityId, outdoors: bool) {
    interrupt(world, id);
    if let Some(movement) = world.store.get_mut::<Movement>(id) {
        movement.clear();
    }
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.sleeping = true;
        citizen.chat = None;
        citizen.set_activity(if outdoors { "sleeping outdoors" } else { "sleeping" });
    }
    debug!("agent {} fell asleep (outdoors: {})", id, outdoors);
    world.emit(SimulationEvent::FellAsleep { agent: id, outdoors });
}

/// Wake a sleeper when rested in daylight, or when starving
///
/// Returns true if the agent is (still) asleep after the check.
pub fn stay_asleep(world: &mut World, id: EntityId) -> bool {
    let sleeping = world.store.get::<Citizen>(id).map(|c| c.sleeping).unwrap_or(false);
    if !sleeping {
        return false;
    }
    let Some(needs) = world.store.get::<Needs>(id) else {
        return true;
    };
    let rested = needs.energy >= NEED_MAX && world.calendar.is_daytime();
    let starving = needs.food < world.config.starving_threshold;
    if !(rested || starving) {
        return true;
    }

    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.sleeping = false;
        citizen.set_activity("idle");
    }
    exit_building(world, id);
    world.emit(SimulationEvent::WokeUp { agent: id });
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::Facing;
    use crate::city::stockpile::{FoodKind, ResourceKind};
    use crate::core::config::SimulationConfig;
    use crate::core::types::Cell;
    use crate::entity::Sex;

    fn setup() -> (World, EntityId) {
        let mut world = World::new(30, 30, SimulationConfig::default());
        let c = Citizen::new("Nell", "Test", 30, Sex::Female, &[]).unwrap();
        let id = world.spawn_citizen(c, Cell::new(5, 5));
        (world, id)
    }

    #[test]
    fn test_meal_restores_food_and_records_diet() {
        let (mut world, id) = setup();
        world.storage.add_resource(ResourceKind::Food(FoodKind::Bread), 3);
        world.store.get_mut::<Needs>(id).unwrap().food = 30.0;

        assert!(eat(&mut world, id, false));
        let needs = world.store.get::<Needs>(id).unwrap();
        assert_eq!(needs.food, 70.0);
        assert_eq!(needs.diet.back(), Some(&FoodKind::Bread));
        assert_eq!(world.storage.amount(ResourceKind::Food(FoodKind::Bread)), 2);
    }

    #[test]
    fn test_emergency_meal_is_fixed_portion() {
        let (mut world, id) = setup();
        world.storage.add_resource(ResourceKind::Food(FoodKind::Venison), 5);
        world.store.get_mut::<Needs>(id).unwrap().food = 5.0;

        assert!(eat(&mut world, id, true));
        assert_eq!(world.storage.amount(ResourceKind::Food(FoodKind::Venison)), 4);
        assert_eq!(world.store.get::<Needs>(id).unwrap().food, 25.0);
    }

    #[test]
    fn test_no_food_walks_to_storehouse() {
        let (mut world, id) = setup();
        world
            .place_building(BuildingKind::Storehouse, Cell::new(20, 20), Facing::South, true)
            .unwrap();
        assert!(eat(&mut world, id, false));
        assert!(world.store.get::<Movement>(id).unwrap().is_moving());
    }

    #[test]
    fn test_no_food_no_store_does_not_act() {
        let (mut world, id) = setup();
        assert!(!eat(&mut world, id, false));
    }

    #[test]
    fn test_sleep_walks_home_then_sleeps() {
        let (mut world, id) = setup();
        let house = world
            .place_building(BuildingKind::House, Cell::new(6, 6), Facing::South, true)
            .unwrap();
        world.set_home(id, house).unwrap();

        assert!(sleep(&mut world, id));
        let citizen = world.store.get::<Citizen>(id).unwrap();
        assert!(citizen.sleeping);
        assert_eq!(citizen.inside, Some(house));
    }

    #[test]
    fn test_homeless_sleeps_outdoors_only_when_spent() {
        let (mut world, id) = setup();
        world.store.get_mut::<Needs>(id).unwrap().energy = 50.0;
        assert!(!sleep(&mut world, id));

        world.store.get_mut::<Needs>(id).unwrap().energy = 5.0;
        assert!(sleep(&mut world, id));
        assert!(world.events.contains(&SimulationEvent::FellAsleep { agent: id, outdoors: true }));
    }

    #[test]
    fn test_wake_conditions() {
        let (mut world, id) = setup();
        world.store.get_mut::<Citizen>(id).unwrap().sleeping = true;

        // Rested but night: keep sleeping
        world.store.get_mut::<Needs>(id).unwrap().energy = 100.0;
        world.calendar.set_tick(0);
        assert!(stay_asleep(&mut world, id));

        // Rested and day: wake
        world.calendar.set_tick(world.calendar.ticks_per_day() / 2);
        assert!(!stay_asleep(&mut world, id));
        assert!(!world.store.get::<Citizen>(id).unwrap().sleeping);

        // Starving wakes at night regardless of energy
        world.store.get_mut::<Citizen>(id).unwrap().sleeping = true;
        world.calendar.set_tick(0);
        let needs = world.store.get_mut::<Needs>(id).unwrap();
        needs.energy = 30.0;
        needs.food = 5.0;
        assert!(!stay_asleep(&mut world, id));
    }

    #[test]
    fn test_warmth_enters_without_sleeping() {
        let (mut world, id) = setup();
        let house = world
            .place_building(BuildingKind::House, Cell::new(6, 6), Facing::South, true)
            .unwrap();
        assert!(seek_warmth(&mut world, id));
        let citizen = world.store.get::<Citizen>(id).unwrap();
        assert_eq!(citizen.inside, Some(house));
        assert!(!citizen.sleeping);
    }
}
