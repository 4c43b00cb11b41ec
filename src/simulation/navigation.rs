//! Navigation helpers shared by every behavior handler
//!
//! All of these degrade quietly: an unreachable goal is reported as
//! `Approach::Unreachable` and the caller decides what to do instead.

use rand::Rng;

use crate::city::building::BuildingId;
use crate::core::types::{Cell, EntityId};
use crate::ecs::world::World;
use crate::entity::{Citizen, Movement};
use crate::spatial::pathfinding::PathResult;

/// Random picks tried before a wander gives up
const WANDER_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// Already there
    Arrived,
    /// A path has been committed
    EnRoute,
    Unreachable,
}

fn plan(world: &mut World, id: EntityId, target: Cell) -> Option<PathResult> {
    let start = world.agent_cell(id)?;
    let result = world.pathfinder.find_path(&world.grid, start, target);
    result.found.then_some(result)
}

fn commit(world: &mut World, id: EntityId, path: Vec<Cell>) {
    exit_building(world, id);
    if let Some(movement) = world.store.get_mut::<Movement>(id) {
        movement.set_path(path);
    }
}

/// Walk to `target`, or next to it when `adjacent_ok`
pub fn approach_cell(world: &mut World, id: EntityId, target: Cell, adjacent_ok: bool) -> Approach {
    let Some(here) = world.agent_cell(id) else {
        return Approach::Unreachable;
    };
    let close_enough = |c: Cell| c == target || (adjacent_ok && c.is_adjacent(&target));
    if close_enough(here) {
        return Approach::Arrived;
    }
    match plan(world, id, target) {
        Some(result) if result.destination().map(close_enough).unwrap_or(false) => {
            commit(world, id, result.path);
            Approach::EnRoute
        }
        _ => Approach::Unreachable,
    }
}

/// Walk to a building, preferring its door and falling back to any cell
/// beside the footprint
pub fn approach_building(world: &mut World, id: EntityId, building: BuildingId) -> Approach {
    let Some(here) = world.agent_cell(id) else {
        return Approach::Unreachable;
    };
    let Some((door, center)) = world.buildings.get(building).map(|b| (b.door, b.center())) else {
        return Approach::Unreachable;
    };
    if is_at_building(world, id, building) {
        return Approach::Arrived;
    }

    for goal in [door, center] {
        let Some(result) = plan(world, id, goal) else {
            continue;
        };
        let reaches = result
            .destination()
            .zip(world.buildings.get(building))
            .map(|(dest, b)| b.is_near(dest) && dest != here)
            .unwrap_or(false);
        if reaches {
            commit(world, id, result.path);
            return Approach::EnRoute;
        }
    }
    Approach::Unreachable
}

pub fn is_at_building(world: &World, id: EntityId, building: BuildingId) -> bool {
    let inside = world
        .store
        .get::<Citizen>(id)
        .map(|c| c.inside == Some(building))
        .unwrap_or(false);
    if inside {
        return true;
    }
    match (world.agent_cell(id), world.buildings.get(building)) {
        (Some(cell), Some(b)) => b.is_near(cell),
        _ => false,
    }
}

/// Step inside a building; false when it is full, unfinished or missing
pub fn enter_building(world: &mut World, id: EntityId, building: BuildingId) -> bool {
    let current = world.store.get::<Citizen>(id).and_then(|c| c.inside);
    if current == Some(building) {
        return true;
    }
    if current.is_some() {
        exit_building(world, id);
    }
    if !world.buildings.enter(building, id) {
        return false;
    }
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.inside = Some(building);
    }
    true
}

pub fn exit_building(world: &mut World, id: EntityId) {
    let Some(citizen) = world.store.get_mut::<Citizen>(id) else {
        return;
    };
    if let Some(building) = citizen.inside.take() {
        world.buildings.exit(building, id);
    }
}

/// Walk to a random reachable cell within `radius`
pub fn wander(world: &mut World, id: EntityId, radius: i32) -> bool {
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let radius = radius.max(1);
    for _ in 0..WANDER_ATTEMPTS {
        let dx = world.rng.gen_range(-radius..=radius);
        let dy = world.rng.gen_range(-radius..=radius);
        let target = here.offset(dx, dy);
        if target == here || !world.grid.is_walkable(target) {
            continue;
        }
        if let Some(result) = plan(world, id, target) {
            if result.path.len() > 1 {
                commit(world, id, result.path);
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::{BuildingKind, Facing};
    use crate::core::config::SimulationConfig;
    use crate::entity::Sex;
    use crate::spatial::tilemap::Terrain;

    fn setup() -> (World, EntityId) {
        let mut world = World::new(30, 30, SimulationConfig::default());
        let c = Citizen::new("Nav", "Test", 30, Sex::Male, &[]).unwrap();
        let id = world.spawn_citizen(c, Cell::new(1, 1));
        (world, id)
    }

    #[test]
    fn test_approach_building_targets_door() {
        let (mut world, id) = setup();
        let house = world
            .place_building(BuildingKind::House, Cell::new(10, 10), Facing::South, true)
            .unwrap();
        assert_eq!(approach_building(&mut world, id, house), Approach::EnRoute);
        let dest = world.store.get::<Movement>(id).unwrap().destination();
        assert_eq!(dest, Some(Cell::new(11, 12)));
    }

    #[test]
    fn test_door_blocked_falls_back_to_side() {
        let (mut world, id) = setup();
        let house = world
            .place_building(BuildingKind::House, Cell::new(10, 10), Facing::South, true)
            .unwrap();
        world.grid.set_terrain(Cell::new(11, 12), Terrain::Water);
        assert_eq!(approach_building(&mut world, id, house), Approach::EnRoute);
        let dest = world.store.get::<Movement>(id).unwrap().destination().unwrap();
        assert!(world.buildings.get(house).unwrap().is_near(dest));
    }

    #[test]
    fn test_arrived_when_beside_building() {
        let (mut world, id) = setup();
        let house = world
            .place_building(BuildingKind::House, Cell::new(2, 2), Facing::South, true)
            .unwrap();
        assert_eq!(approach_building(&mut world, id, house), Approach::Arrived);
        assert!(enter_building(&mut world, id, house));
        assert_eq!(world.store.get::<Citizen>(id).unwrap().inside, Some(house));
        assert!(world.buildings.get(house).unwrap().occupants.contains(&id));

        exit_building(&mut world, id);
        assert!(world.buildings.get(house).unwrap().occupants.is_empty());
    }

    #[test]
    fn test_unreachable_cell() {
        let (mut world, id) = setup();
        for y in 0..30 {
            world.grid.set_terrain(Cell::new(15, y), Terrain::Water);
        }
        assert_eq!(approach_cell(&mut world, id, Cell::new(25, 25), false), Approach::Unreachable);
        assert!(!world.store.get::<Movement>(id).unwrap().is_moving());
    }

    #[test]
    fn test_wander_commits_path() {
        let (mut world, id) = setup();
        assert!(wander(&mut world, id, 5));
        assert!(world.store.get::<Movement>(id).unwrap().is_moving());
    }
}
