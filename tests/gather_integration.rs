//! Integration tests for the gather cycle driven by the full tick loop
//!
//! These run the scheduler end to end (movement, vitals, staggered AI) and
//! check the gather cycle from the outside: what went into storage, what the
//! worker still carries, and which branch the dispatcher took.

use hearthstead::city::building::{BuildingId, BuildingKind, Facing};
use hearthstead::city::stockpile::{FoodKind, ResourceKind, Stockpile};
use hearthstead::core::config::SimulationConfig;
use hearthstead::core::types::{Cell, EntityId};
use hearthstead::ecs::world::World;
use hearthstead::entity::{Carry, Citizen, GatherState, GatherTarget, Needs, Sex, Worker};
use hearthstead::simulation::dispatch::evaluate;
use hearthstead::simulation::gather::gather_step;
use hearthstead::simulation::needs::interrupt;
use hearthstead::simulation::tick::run_tick_with_decisions;
use hearthstead::simulation::{Decision, SimulationEvent};
use hearthstead::spatial::tilemap::{Deposit, Terrain};

/// Morning of the first day
fn morning(world: &World) -> u64 {
    world.calendar.ticks_per_day() * 6 / 24
}

fn forager_world() -> (World, EntityId, BuildingId) {
    let mut world = World::new(40, 40, SimulationConfig::default());
    world.calendar.set_tick(morning(&world));
    let hut = world
        .place_building(BuildingKind::ForagerHut, Cell::new(10, 10), Facing::South, true)
        .unwrap();
    for (x, y) in [(14, 12), (15, 13), (16, 12)] {
        world.grid.set_deposit(Cell::new(x, y), Deposit::Berries, 3);
    }
    let citizen = Citizen::new("Rowan", "Field", 30, Sex::Female, &[]).unwrap();
    let id = world.spawn_citizen(citizen, Cell::new(11, 12));
    world.assign_worker(id, hut, true).unwrap();
    (world, id, hut)
}

/// A woodcutter one evaluation away from felling a tree
fn woodcutter_world() -> (World, EntityId, BuildingId) {
    let mut world = World::new(40, 40, SimulationConfig::default());
    world.calendar.set_tick(morning(&world));
    let camp = world
        .place_building(BuildingKind::WoodcutterCamp, Cell::new(10, 10), Facing::South, true)
        .unwrap();
    let tile = Cell::new(12, 13);
    world.grid.set_terrain(tile, Terrain::Forest);
    world.grid.set_deposit(tile, Deposit::Trees, 3);
    let citizen = Citizen::new("Wren", "Ash", 30, Sex::Male, &[]).unwrap();
    let id = world.spawn_citizen(citizen, Cell::new(12, 12));
    world.assign_worker(id, camp, true).unwrap();
    world.store.get_mut::<Worker>(id).unwrap().gather = Some(GatherState::Gathering {
        target: GatherTarget { tile, deposit: Deposit::Trees },
        elapsed: 1000,
    });
    (world, id, camp)
}

fn run(world: &mut World, ticks: u64) -> (Vec<(EntityId, Decision)>, Vec<SimulationEvent>) {
    let mut decisions = Vec::new();
    let mut events = Vec::new();
    for _ in 0..ticks {
        let (d, e) = run_tick_with_decisions(world);
        decisions.extend(d);
        events.extend(e);
    }
    (decisions, events)
}

fn sum_amounts(events: &[SimulationEvent], gathered: bool) -> u32 {
    events
        .iter()
        .filter_map(|e| match (e, gathered) {
            (SimulationEvent::Gathered { amount, .. }, true) => Some(*amount),
            (SimulationEvent::Deposited { amount, .. }, false) => Some(*amount),
            _ => None,
        })
        .sum()
}

// ============================================================================
// Conservation
// ============================================================================

#[test]
fn test_storage_delta_matches_carried_amounts() {
    let (mut world, id, _) = forager_world();
    let before = world.storage.amount(ResourceKind::Food(FoodKind::Berries));
    assert!(world.store.get::<Worker>(id).unwrap().carrying.is_none());

    let (_, events) = run(&mut world, 1000);

    let gathered = sum_amounts(&events, true);
    let deposited = sum_amounts(&events, false);
    let still_carrying = world
        .store
        .get::<Worker>(id)
        .unwrap()
        .carrying
        .map(|c| c.amount)
        .unwrap_or(0);

    assert!(deposited > 0, "expected at least one completed cycle");
    assert_eq!(gathered, deposited + still_carrying);
    assert_eq!(world.storage.amount(ResourceKind::Food(FoodKind::Berries)) - before, deposited);
}

// ============================================================================
// Interruption
// ============================================================================

#[test]
fn test_interrupted_worker_resumes_by_carry_state() {
    let (mut world, id, hut) = forager_world();

    // Not carrying: back to seeking
    interrupt(&mut world, id);
    let worker = world.store.get::<Worker>(id).unwrap();
    assert!(worker.gather.is_none());
    assert_eq!(worker.resume_state(), GatherState::Seeking { target: None });

    // Carrying: straight back to the hut
    world.store.get_mut::<Worker>(id).unwrap().carrying =
        Some(Carry { resource: ResourceKind::Food(FoodKind::Berries), amount: 2 });
    interrupt(&mut world, id);
    assert_eq!(world.store.get::<Worker>(id).unwrap().resume_state(), GatherState::Returning);

    gather_step(&mut world, id, hut);
    assert_eq!(world.store.get::<Worker>(id).unwrap().carrying, None);
    assert_eq!(world.storage.amount(ResourceKind::Food(FoodKind::Berries)), 2);
}

#[test]
fn test_starving_gatherer_eats_then_starts_the_cycle_over() {
    let (mut world, id, _) = forager_world();
    world.storage.add_resource(ResourceKind::Food(FoodKind::Bread), 5);
    world.store.get_mut::<Worker>(id).unwrap().gather = Some(GatherState::Gathering {
        target: GatherTarget { tile: Cell::new(14, 12), deposit: Deposit::Berries },
        elapsed: 50,
    });
    world.store.get_mut::<Needs>(id).unwrap().food = 5.0;

    assert_eq!(evaluate(&mut world, id), Decision::EmergencyMeal);
    assert!(world
        .events
        .iter()
        .any(|e| matches!(e, SimulationEvent::Ate { agent, emergency: true, .. } if *agent == id)));
    assert!(world.store.get::<Worker>(id).unwrap().gather.is_none());

    world.store.get_mut::<Needs>(id).unwrap().food = 90.0;
    assert_eq!(evaluate(&mut world, id), Decision::Gathering);

    // The old timer is gone: no harvest, and any new timer starts from zero
    assert!(!world.events.iter().any(|e| matches!(e, SimulationEvent::Gathered { .. })));
    match world.store.get::<Worker>(id).unwrap().gather {
        Some(GatherState::Seeking { .. }) => {}
        Some(GatherState::Gathering { elapsed, .. }) => assert_eq!(elapsed, 0),
        other => panic!("unexpected gather state {:?}", other),
    }
    assert_eq!(world.grid.resource(Cell::new(14, 12), Deposit::Berries), 3);
}

// ============================================================================
// Tools
// ============================================================================

#[test]
fn test_every_tooled_extraction_uses_up_a_tool() {
    let (mut world, id, camp) = woodcutter_world();
    world.storage.add_resource(ResourceKind::Tools, 12);

    gather_step(&mut world, id, camp);

    assert_eq!(world.storage.amount(ResourceKind::Tools), 11);
    assert!(world.events.contains(&SimulationEvent::ToolConsumed { agent: id }));
    assert_eq!(
        world.store.get::<Worker>(id).unwrap().carrying,
        Some(Carry { resource: ResourceKind::Logs, amount: 3 })
    );
}

#[test]
fn test_missing_tools_halve_the_yield() {
    let (mut world, id, camp) = woodcutter_world();
    assert_eq!(world.storage.amount(ResourceKind::Tools), 0);

    gather_step(&mut world, id, camp);

    assert_eq!(
        world.store.get::<Worker>(id).unwrap().carrying,
        Some(Carry { resource: ResourceKind::Logs, amount: 1 })
    );
    assert!(!world.events.iter().any(|e| matches!(e, SimulationEvent::ToolConsumed { .. })));
}

// ============================================================================
// Lost jobs
// ============================================================================

#[test]
fn test_unassigned_worker_delivers_its_carry() {
    let (mut world, id, _) = forager_world();
    world
        .place_building(BuildingKind::Storehouse, Cell::new(20, 16), Facing::South, true)
        .unwrap();
    // Nothing left to forage, so the only berries stored are the delivered ones
    for (x, y) in [(14, 12), (15, 13), (16, 12)] {
        world.grid.set_deposit(Cell::new(x, y), Deposit::Berries, 0);
    }
    world.store.get_mut::<Worker>(id).unwrap().carrying =
        Some(Carry { resource: ResourceKind::Food(FoodKind::Berries), amount: 2 });
    world.unassign_worker(id);

    let (decisions, events) = run(&mut world, 400);

    assert!(decisions.iter().any(|(_, d)| *d == Decision::Delivering));
    assert_eq!(world.store.get::<Worker>(id).unwrap().carrying, None);
    assert_eq!(world.storage.amount(ResourceKind::Food(FoodKind::Berries)), 2);
    assert_eq!(sum_amounts(&events, false), 2);
}

// ============================================================================
// Seasons and storage limits
// ============================================================================

#[test]
fn test_winter_forager_idles_at_hut() {
    let (mut world, id, hut) = forager_world();
    let tpd = world.calendar.ticks_per_day();
    let winter_start = world.calendar.ticks_per_season() * 3;
    world.calendar.set_tick(winter_start + tpd * 6 / 24);

    let (decisions, events) = run(&mut world, 600);

    assert!(decisions.iter().any(|(_, d)| *d == Decision::Gathering));
    assert!(!events.iter().any(|e| matches!(e, SimulationEvent::Gathered { .. })));
    let worker = world.store.get::<Worker>(id).unwrap();
    assert!(!matches!(worker.gather, Some(GatherState::Gathering { .. })));
    let at_hut = world
        .buildings
        .get(hut)
        .map(|b| b.is_near(world.agent_cell(id).unwrap()))
        .unwrap();
    assert!(at_hut);
}

#[test]
fn test_full_storage_keeps_the_carry() {
    let (world, id, _) = forager_world();
    let mut world = world.with_storage(Box::new(Stockpile::new(3)));
    world.storage.add_resource(ResourceKind::Logs, 3);
    assert!(world.storage.is_storage_full());

    world.store.get_mut::<Worker>(id).unwrap().carrying =
        Some(Carry { resource: ResourceKind::Food(FoodKind::Berries), amount: 2 });
    world.store.get_mut::<Worker>(id).unwrap().gather = Some(GatherState::Returning);

    let (_, events) = run(&mut world, 300);

    assert!(!events.iter().any(|e| matches!(e, SimulationEvent::Deposited { .. })));
    assert_eq!(
        world.store.get::<Worker>(id).unwrap().carrying,
        Some(Carry { resource: ResourceKind::Food(FoodKind::Berries), amount: 2 })
    );
}
