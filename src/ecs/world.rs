//! World - the single context every system operates on

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::city::building::{Building, BuildingId, BuildingKind, BuildingRegistry, Facing};
use crate::city::stockpile::{ResourceService, Stockpile};
use crate::core::calendar::Calendar;
use crate::core::config::SimulationConfig;
use crate::core::error::{HearthError, Result};
use crate::core::types::{Cell, EntityId, Tick};
use crate::ecs::store::ComponentStore;
use crate::entity::{Citizen, Family, Movement, Needs, Position, Profession, Worker};
use crate::simulation::events::SimulationEvent;
use crate::spatial::pathfinding::Pathfinder;
use crate::spatial::tilemap::TileMap;

/// Default shared storage capacity of a new settlement
pub const DEFAULT_STORAGE_CAPACITY: u32 = 500;

/// The game world: map, agents, buildings, storage, clock and randomness
pub struct World {
    pub grid: TileMap,
    pub pathfinder: Pathfinder,
    pub store: ComponentStore,
    pub buildings: BuildingRegistry,
    pub storage: Box<dyn ResourceService>,
    pub calendar: Calendar,
    pub rng: ChaCha8Rng,
    pub events: Vec<SimulationEvent>,
    pub config: SimulationConfig,
}

impl World {
    pub fn new(width: i32, height: i32, config: SimulationConfig) -> Self {
        Self {
            grid: TileMap::new(width, height),
            pathfinder: Pathfinder::from_config(&config),
            store: ComponentStore::new(),
            buildings: BuildingRegistry::new(),
            storage: Box::new(Stockpile::new(DEFAULT_STORAGE_CAPACITY)),
            calendar: Calendar::new(config.ticks_per_day, config.days_per_season),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            events: Vec::new(),
            config,
        }
    }

    /// Swap in a different storage backend
    pub fn with_storage(mut self, storage: Box<dyn ResourceService>) -> Self {
        self.storage = storage;
        self
    }

    pub fn current_tick(&self) -> Tick {
        self.calendar.current_tick()
    }

    pub fn emit(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Create an agent with every behavioral component attached
    pub fn spawn_citizen(&mut self, citizen: Citizen, cell: Cell) -> EntityId {
        let id = self.store.spawn();
        let needs = Needs { last_social: self.current_tick(), ..Needs::default() };
        self.store.add(id, Position::at(cell));
        self.store.add(id, Movement::default());
        self.store.add(id, citizen);
        self.store.add(id, Worker::default());
        self.store.add(id, needs);
        self.store.add(id, Family::default());
        id
    }

    pub fn agent_cell(&self, id: EntityId) -> Option<Cell> {
        self.store.get::<Position>(id).map(|p| p.cell)
    }

    pub fn citizen_count(&self) -> usize {
        self.store.citizens.len()
    }

    /// Place a building; the footprint becomes unwalkable immediately
    pub fn place_building(
        &mut self,
        kind: BuildingKind,
        origin: Cell,
        facing: Facing,
        complete: bool,
    ) -> Option<BuildingId> {
        let id = self.buildings.place(&mut self.grid, kind, origin, facing, complete)?;
        self.pathfinder.invalidate();
        Some(id)
    }

    pub fn remove_building(&mut self, id: BuildingId) -> Option<Building> {
        let building = self.buildings.remove(&mut self.grid, id)?;
        self.pathfinder.invalidate();
        Some(building)
    }

    /// Finish a building outright (bootstrap and tests)
    pub fn complete_building(&mut self, id: BuildingId) -> Result<()> {
        let kind = self
            .buildings
            .get(id)
            .map(|b| b.kind)
            .ok_or(HearthError::BuildingNotFound(id))?;
        if self.buildings.add_construction(id, kind.work_required()) {
            self.pathfinder.invalidate();
            let tick = self.current_tick();
            self.emit(SimulationEvent::BuildingCompleted { building: id, tick });
        }
        Ok(())
    }

    /// Give `agent` a job at `building`; returns false when the roster is full
    pub fn assign_worker(&mut self, agent: EntityId, building: BuildingId, manual: bool) -> Result<bool> {
        let profession = self
            .buildings
            .get(building)
            .ok_or(HearthError::BuildingNotFound(building))?
            .kind
            .profession();
        if !self.store.has::<Worker>(agent) {
            return Err(HearthError::EntityNotFound(agent));
        }

        self.unassign_worker(agent);
        if !self.buildings.assign_worker(building, agent) {
            return Ok(false);
        }
        if let Some(worker) = self.store.get_mut::<Worker>(agent) {
            worker.workplace = Some(building);
            worker.manually_assigned = manual;
            worker.profession = profession.unwrap_or(Profession::Laborer);
            worker.gather = None;
        }
        Ok(true)
    }

    /// Remove `agent` from their workplace roster, if any
    pub fn unassign_worker(&mut self, agent: EntityId) -> Option<BuildingId> {
        let worker = self.store.get_mut::<Worker>(agent)?;
        let building = worker.workplace?;
        worker.unassign();
        self.buildings.unassign_worker(building, agent);
        Some(building)
    }

    /// Register `agent` as a resident of `building`
    pub fn set_home(&mut self, agent: EntityId, building: BuildingId) -> Result<bool> {
        if !self.buildings.contains(building) {
            return Err(HearthError::BuildingNotFound(building));
        }
        let previous = self
            .store
            .get::<Family>(agent)
            .ok_or(HearthError::EntityNotFound(agent))?
            .home;
        if let Some(old) = previous {
            self.buildings.remove_resident(old, agent);
        }
        if !self.buildings.add_resident(building, agent) {
            return Ok(false);
        }
        if let Some(family) = self.store.get_mut::<Family>(agent) {
            family.home = Some(building);
        }
        Ok(true)
    }
}
