//! Movement step - advances every agent along its committed path each tick
//!
//! Steps are computed from immutable state (in parallel with rayon for large
//! populations) and then applied serially in id order.

use rayon::prelude::*;

use crate::core::types::{Cell, EntityId};
use crate::ecs::world::World;
use crate::entity::{Movement, Position};
use crate::spatial::tilemap::TileMap;

/// Result of moving one agent for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
struct MoveStep {
    id: EntityId,
    x: f32,
    y: f32,
    /// Reached the front waypoint
    arrived: bool,
    /// Front waypoint became unwalkable; path must be dropped
    blocked: bool,
}

fn compute_step(grid: &TileMap, id: EntityId, pos: &Position, movement: &Movement) -> Option<MoveStep> {
    let waypoint = movement.next_waypoint()?;

    if waypoint != pos.cell && !grid.is_walkable(waypoint) {
        return Some(MoveStep { id, x: pos.x, y: pos.y, arrived: false, blocked: true });
    }

    let target = waypoint.center();
    let delta = target - pos.vec();
    let dist = delta.length();

    // Speed is divided by the cost of the tile being entered
    let cost = grid.path_cost(waypoint);
    let cost = if cost.is_finite() && cost > 0.0 { cost } else { 1.0 };
    let step = movement.effective_speed() / cost;

    if dist <= step {
        Some(MoveStep { id, x: target.x, y: target.y, arrived: true, blocked: false })
    } else {
        let next = pos.vec() + delta.normalize() * step;
        Some(MoveStep { id, x: next.x, y: next.y, arrived: false, blocked: false })
    }
}

/// Advance every moving agent by one tick
pub fn movement_step(world: &mut World) {
    let grid = &world.grid;
    let positions = &world.store.positions;
    let movers: Vec<(EntityId, &Position, &Movement)> = world
        .store
        .movements
        .iter()
        .filter(|(_, m)| m.is_moving())
        .filter_map(|(id, m)| positions.get(id).map(|p| (*id, p, m)))
        .collect();

    let steps: Vec<MoveStep> = if movers.len() >= world.config.parallel_threshold {
        movers
            .par_iter()
            .filter_map(|(id, pos, m)| compute_step(grid, *id, pos, m))
            .collect()
    } else {
        movers
            .iter()
            .filter_map(|(id, pos, m)| compute_step(grid, *id, pos, m))
            .collect()
    };

    for step in steps {
        apply_step(world, step);
    }
}

fn apply_step(world: &mut World, step: MoveStep) {
    let clamped: Cell = world.grid.clamp_cell(step.x, step.y);
    if let Some(pos) = world.store.positions.get_mut(&step.id) {
        if clamped == Cell::new(step.x.floor() as i32, step.y.floor() as i32) {
            pos.set(step.x, step.y);
        } else {
            let c = clamped.center();
            pos.set(c.x, c.y);
        }
    }
    if let Some(movement) = world.store.movements.get_mut(&step.id) {
        if step.blocked {
            movement.clear();
            movement.stuck_counter += 1;
            tracing::debug!("agent {} path blocked, dropping it", step.id);
        } else if step.arrived {
            movement.path.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::entity::{Citizen, Sex};
    use crate::spatial::tilemap::Terrain;

    fn world_with_walker(path: Vec<Cell>) -> (World, EntityId) {
        let mut world = World::new(10, 10, SimulationConfig::default());
        let citizen = Citizen::new("Walker", "Test", 30, Sex::Male, &[]).unwrap();
        let id = world.spawn_citizen(citizen, Cell::new(0, 0));
        if let Some(m) = world.store.get_mut::<Movement>(id) {
            m.set_path(path);
        }
        (world, id)
    }

    #[test]
    fn test_walks_along_path() {
        let (mut world, id) = world_with_walker(vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)]);
        for _ in 0..40 {
            movement_step(&mut world);
        }
        assert_eq!(world.agent_cell(id), Some(Cell::new(2, 0)));
        assert!(!world.store.get::<Movement>(id).unwrap().is_moving());
    }

    #[test]
    fn test_speed_scaled_by_terrain() {
        let (mut world, id) = world_with_walker(vec![Cell::new(1, 0)]);
        world.grid.set_terrain(Cell::new(1, 0), Terrain::Road);
        movement_step(&mut world);
        let x = world.store.get::<Position>(id).unwrap().x;
        // Road costs 0.5, so one tick covers 0.2 tiles
        assert!((x - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_blocked_waypoint_clears_path() {
        let (mut world, id) = world_with_walker(vec![Cell::new(1, 0), Cell::new(2, 0)]);
        world.grid.set_terrain(Cell::new(1, 0), Terrain::Water);
        movement_step(&mut world);
        let m = world.store.get::<Movement>(id).unwrap();
        assert!(!m.is_moving());
        assert_eq!(m.stuck_counter, 1);
        assert_eq!(world.agent_cell(id), Some(Cell::new(0, 0)));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let path = vec![Cell::new(1, 1), Cell::new(2, 2), Cell::new(3, 2)];
        let (mut serial, _) = world_with_walker(path.clone());
        let (mut parallel, _) = world_with_walker(path);
        parallel.config.parallel_threshold = 0;
        for _ in 0..15 {
            movement_step(&mut serial);
            movement_step(&mut parallel);
        }
        assert_eq!(serial.store.positions, parallel.store.positions);
    }
}
