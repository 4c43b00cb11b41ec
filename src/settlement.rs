//! Demonstration settlement used by the binary and the integration tests
//!
//! A 48x48 valley with a river on the east side, woods to the southwest,
//! berry bushes and a rock outcrop to the north. Citizens get homes, partners
//! and jobs assigned automatically.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::city::building::{BuildingId, BuildingKind, Facing};
use crate::city::stockpile::{FoodKind, ResourceKind};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{Cell, EntityId};
use crate::ecs::world::World;
use crate::entity::citizen::Trait;
use crate::entity::family::RelationshipStatus;
use crate::entity::{Citizen, Family, Sex};
use crate::spatial::pathfinding::nearest_walkable;
use crate::spatial::tilemap::{Deposit, Terrain};

pub const MAP_SIZE: i32 = 48;

const FIRST_NAMES: [&str; 16] = [
    "Alda", "Bram", "Cora", "Dunstan", "Edda", "Finn", "Greta", "Hal", "Ida", "Jory", "Kestrel", "Lorn",
    "Mira", "Nils", "Osric", "Petra",
];
const LAST_NAMES: [&str; 6] = ["Ashford", "Brook", "Coldwell", "Dale", "Fenwick", "Holt"];

const TRAIT_PAIRS: [(Trait, Trait); 4] = [
    (Trait::Sociable, Trait::Shy),
    (Trait::Hardworking, Trait::Lazy),
    (Trait::Cheerful, Trait::Grumpy),
    (Trait::Adventurous, Trait::Homebody),
];

/// Every n-th citizen is a child
const CHILD_EVERY: usize = 6;

/// Every n-th adult stays an unassigned laborer
const LABORER_EVERY: usize = 4;

fn paint_terrain(world: &mut World) {
    for y in 0..MAP_SIZE {
        for x in 38..=40 {
            let cell = Cell::new(x, y);
            world.grid.set_terrain(cell, Terrain::Water);
            if x == 38 {
                world.grid.set_deposit(cell, Deposit::Fish, 10);
            }
        }
        world.grid.set_terrain(Cell::new(37, y), Terrain::Sand);
    }

    for x in 0..37 {
        world.grid.set_terrain(Cell::new(x, 20), Terrain::Road);
    }

    for y in 30..44 {
        for x in 2..12 {
            let cell = Cell::new(x, y);
            world.grid.set_terrain(cell, Terrain::Forest);
            world.grid.set_deposit(cell, Deposit::Trees, 5);
            if (x + y) % 3 == 0 {
                world.grid.set_deposit(cell, Deposit::Wildlife, 3);
            }
        }
    }

    for y in 2..6 {
        for x in 14..22 {
            let kind = if (x + y) % 2 == 0 { Deposit::Berries } else { Deposit::Mushrooms };
            world.grid.set_deposit(Cell::new(x, y), kind, 6);
        }
    }

    for y in 34..40 {
        for x in 24..30 {
            world.grid.set_deposit(Cell::new(x, y), Deposit::Herbs, 4);
        }
    }

    for y in 2..7 {
        for x in 30..35 {
            let cell = Cell::new(x, y);
            world.grid.set_terrain(cell, Terrain::Rock);
            world.grid.set_deposit(cell, Deposit::Stone, 20);
            if x == 34 {
                world.grid.set_deposit(cell, Deposit::Iron, 8);
            }
        }
    }
}

fn place(world: &mut World, kind: BuildingKind, x: i32, y: i32, complete: bool) -> Option<BuildingId> {
    let id = world.place_building(kind, Cell::new(x, y), Facing::South, complete);
    if id.is_none() {
        tracing::warn!("could not place {:?} at ({}, {})", kind, x, y);
    }
    id
}

fn random_traits(world: &mut World) -> Vec<Trait> {
    let count = world.rng.gen_range(0..=2);
    let mut pairs = TRAIT_PAIRS.to_vec();
    pairs.shuffle(&mut world.rng);
    pairs
        .into_iter()
        .take(count)
        .map(|(a, b)| if world.rng.gen_bool(0.5) { a } else { b })
        .collect()
}

fn link_partners(world: &mut World, a: EntityId, b: EntityId) {
    for (who, with) in [(a, b), (b, a)] {
        if let Some(family) = world.store.get_mut::<Family>(who) {
            family.partner = Some(with);
            family.status = RelationshipStatus::Married;
        }
    }
}

/// Build the demonstration settlement with `citizens` inhabitants
pub fn build(config: SimulationConfig, citizens: usize) -> Result<World> {
    config.validate()?;
    let mut world = World::new(MAP_SIZE, MAP_SIZE, config);
    paint_terrain(&mut world);

    let storehouse = place(&mut world, BuildingKind::Storehouse, 18, 17, true);
    place(&mut world, BuildingKind::TownSquare, 22, 22, true);
    let workplaces: Vec<BuildingId> = [
        (BuildingKind::ForagerHut, 17, 7),
        (BuildingKind::FishingDock, 35, 18),
        (BuildingKind::WoodcutterCamp, 10, 27),
        (BuildingKind::HunterLodge, 14, 27),
        (BuildingKind::HerbalistHut, 26, 30),
        (BuildingKind::Quarry, 29, 8),
        (BuildingKind::Tavern, 24, 16),
        (BuildingKind::School, 28, 16),
        (BuildingKind::Library, 28, 24),
    ]
    .into_iter()
    .filter_map(|(kind, x, y)| place(&mut world, kind, x, y, true))
    .collect();
    place(&mut world, BuildingKind::Chapel, 32, 24, false);
    place(&mut world, BuildingKind::Bathhouse, 14, 16, false);

    let house_count = citizens.div_ceil(BuildingKind::House.housing_capacity()).clamp(1, 12);
    let houses: Vec<BuildingId> = (0..house_count)
        .filter_map(|i| place(&mut world, BuildingKind::House, 2 + i as i32 * 3, 12, true))
        .collect();

    world.storage.add_resource(ResourceKind::Food(FoodKind::Bread), 40);
    world.storage.add_resource(ResourceKind::Food(FoodKind::Berries), 20);
    world.storage.add_resource(ResourceKind::Food(FoodKind::Fish), 10);
    world.storage.add_resource(ResourceKind::Tools, 12);

    let mut adults: Vec<EntityId> = Vec::new();
    let mut previous_adult: Option<EntityId> = None;
    let mut last_couple: Option<(EntityId, EntityId)> = None;
    for i in 0..citizens {
        let child = i % CHILD_EVERY == CHILD_EVERY - 1;
        let age = if child { world.rng.gen_range(5..14) } else { world.rng.gen_range(18..60) };
        let sex = if i % 2 == 0 { Sex::Female } else { Sex::Male };
        let traits = random_traits(&mut world);
        let first = FIRST_NAMES[i % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i / 2) % LAST_NAMES.len()];
        let citizen = Citizen::new(first, last, age, sex, &traits)?;

        let spot = Cell::new(18 + (i % 10) as i32, 26 + ((i / 10) % 4) as i32);
        let spot = if world.grid.is_walkable(spot) {
            spot
        } else {
            nearest_walkable(&world.grid, spot, 8).unwrap_or(spot)
        };
        let id = world.spawn_citizen(citizen, spot);

        let household = houses.get((i / BuildingKind::House.housing_capacity()) % houses.len().max(1));
        if let Some(house) = household {
            world.set_home(id, *house)?;
        }

        if child {
            if let Some((a, b)) = last_couple {
                for parent in [a, b] {
                    if let Some(family) = world.store.get_mut::<Family>(parent) {
                        family.children.push(id);
                    }
                }
            }
            continue;
        }

        match previous_adult.take() {
            Some(other) => {
                link_partners(&mut world, other, id);
                last_couple = Some((other, id));
            }
            None => previous_adult = Some(id),
        }

        let n = adults.len();
        if n % LABORER_EVERY != LABORER_EVERY - 1 && !workplaces.is_empty() {
            let workplace = workplaces[n % workplaces.len()];
            world.assign_worker(id, workplace, false)?;
        }
        adults.push(id);
    }

    info!(
        "settlement ready: {} citizens, {} buildings, storehouse {:?}",
        world.citizen_count(),
        world.buildings.len(),
        storehouse
    );
    Ok(world)
}
