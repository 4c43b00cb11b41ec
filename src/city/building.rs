//! Buildings and the registry that owns them

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{Cell, EntityId};
use crate::entity::worker::Profession;
use crate::spatial::tilemap::{Deposit, TileMap};

/// Building identifier, issued sequentially by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Storehouse,
    Market,
    Tavern,
    Chapel,
    School,
    Bathhouse,
    Library,
    TownSquare,
    Infirmary,
    ForagerHut,
    HunterLodge,
    FishingDock,
    HerbalistHut,
    WoodcutterCamp,
    Quarry,
    Mine,
}

impl BuildingKind {
    /// Footprint (width, height) in tiles
    pub fn size(&self) -> (i32, i32) {
        match self {
            BuildingKind::Market | BuildingKind::Chapel | BuildingKind::TownSquare => (3, 3),
            BuildingKind::Storehouse | BuildingKind::Tavern | BuildingKind::School => (3, 2),
            BuildingKind::FishingDock => (2, 1),
            _ => (2, 2),
        }
    }

    /// Construction work needed to complete
    pub fn work_required(&self) -> f32 {
        match self {
            BuildingKind::House => 100.0,
            BuildingKind::TownSquare => 60.0,
            BuildingKind::ForagerHut | BuildingKind::HerbalistHut | BuildingKind::FishingDock => 80.0,
            BuildingKind::Chapel | BuildingKind::Market => 200.0,
            BuildingKind::Mine => 180.0,
            _ => 150.0,
        }
    }

    pub fn worker_capacity(&self) -> usize {
        match self {
            BuildingKind::ForagerHut
            | BuildingKind::HunterLodge
            | BuildingKind::FishingDock
            | BuildingKind::HerbalistHut
            | BuildingKind::WoodcutterCamp
            | BuildingKind::Quarry
            | BuildingKind::Mine => 3,
            BuildingKind::Market
            | BuildingKind::Tavern
            | BuildingKind::Chapel
            | BuildingKind::School
            | BuildingKind::Library
            | BuildingKind::Infirmary => 1,
            _ => 0,
        }
    }

    pub fn housing_capacity(&self) -> usize {
        match self {
            BuildingKind::House => 4,
            _ => 0,
        }
    }

    /// How many agents fit inside at once
    pub fn indoor_capacity(&self) -> usize {
        match self {
            BuildingKind::House => 6,
            BuildingKind::Tavern => 10,
            BuildingKind::Chapel => 15,
            BuildingKind::School => 12,
            BuildingKind::Market => 8,
            BuildingKind::Bathhouse | BuildingKind::Library | BuildingKind::Infirmary => 6,
            BuildingKind::Storehouse => 4,
            BuildingKind::TownSquare => 0,
            _ => 3,
        }
    }

    /// Radius around the building searched for resource tiles
    pub fn work_radius(&self) -> i32 {
        match self {
            BuildingKind::ForagerHut
            | BuildingKind::HunterLodge
            | BuildingKind::HerbalistHut
            | BuildingKind::WoodcutterCamp => 12,
            BuildingKind::FishingDock | BuildingKind::Quarry | BuildingKind::Mine => 10,
            _ => 0,
        }
    }

    pub fn is_heated(&self) -> bool {
        matches!(
            self,
            BuildingKind::House
                | BuildingKind::Tavern
                | BuildingKind::Chapel
                | BuildingKind::School
                | BuildingKind::Bathhouse
                | BuildingKind::Library
                | BuildingKind::Infirmary
        )
    }

    /// Profession practiced by workers assigned here
    pub fn profession(&self) -> Option<Profession> {
        match self {
            BuildingKind::ForagerHut => Some(Profession::Forager),
            BuildingKind::HunterLodge => Some(Profession::Hunter),
            BuildingKind::FishingDock => Some(Profession::Fisher),
            BuildingKind::HerbalistHut => Some(Profession::Herbalist),
            BuildingKind::WoodcutterCamp => Some(Profession::Woodcutter),
            BuildingKind::Quarry => Some(Profession::Quarrier),
            BuildingKind::Mine => Some(Profession::Miner),
            BuildingKind::School => Some(Profession::Teacher),
            BuildingKind::Chapel => Some(Profession::Priest),
            BuildingKind::Tavern => Some(Profession::Tavernkeeper),
            BuildingKind::Infirmary => Some(Profession::Healer),
            BuildingKind::Market => Some(Profession::Merchant),
            BuildingKind::Library => Some(Profession::Librarian),
            _ => None,
        }
    }

    /// Deposits harvested by this building's workers
    pub fn target_deposits(&self) -> &'static [Deposit] {
        match self {
            BuildingKind::ForagerHut => &[Deposit::Berries, Deposit::Mushrooms],
            BuildingKind::HunterLodge => &[Deposit::Wildlife],
            BuildingKind::FishingDock => &[Deposit::Fish],
            BuildingKind::HerbalistHut => &[Deposit::Herbs],
            BuildingKind::WoodcutterCamp => &[Deposit::Trees],
            BuildingKind::Quarry => &[Deposit::Stone],
            BuildingKind::Mine => &[Deposit::Iron],
            _ => &[],
        }
    }

    /// Places where food can be had
    pub fn sells_food(&self) -> bool {
        matches!(self, BuildingKind::Storehouse | BuildingKind::Market)
    }
}

/// Side of the footprint the door opens onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    North,
    #[default]
    South,
    East,
    West,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub origin: Cell,
    pub width: i32,
    pub height: i32,
    /// Walkable cell just outside the footprint
    pub door: Cell,
    pub facing: Facing,
    pub complete: bool,
    pub construction_progress: f32,
    pub workers: Vec<EntityId>,
    pub residents: Vec<EntityId>,
    pub occupants: Vec<EntityId>,
}

impl Building {
    fn new(id: BuildingId, kind: BuildingKind, origin: Cell, facing: Facing, complete: bool) -> Self {
        let (width, height) = kind.size();
        let door = match facing {
            Facing::South => origin.offset(width / 2, height),
            Facing::North => origin.offset(width / 2, -1),
            Facing::East => origin.offset(width, height / 2),
            Facing::West => origin.offset(-1, height / 2),
        };
        Self {
            id,
            kind,
            origin,
            width,
            height,
            door,
            facing,
            complete,
            construction_progress: if complete { kind.work_required() } else { 0.0 },
            workers: Vec::new(),
            residents: Vec::new(),
            occupants: Vec::new(),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.origin.x
            && cell.y >= self.origin.y
            && cell.x < self.origin.x + self.width
            && cell.y < self.origin.y + self.height
    }

    /// Standing at the door or touching the footprint
    pub fn is_near(&self, cell: Cell) -> bool {
        cell == self.door
            || (cell.x >= self.origin.x - 1
                && cell.y >= self.origin.y - 1
                && cell.x <= self.origin.x + self.width
                && cell.y <= self.origin.y + self.height)
    }

    pub fn center(&self) -> Cell {
        self.origin.offset(self.width / 2, self.height / 2)
    }

    pub fn has_worker_slot(&self) -> bool {
        self.workers.len() < self.kind.worker_capacity()
    }

    pub fn has_room_inside(&self) -> bool {
        self.occupants.len() < self.kind.indoor_capacity()
    }

    pub fn has_housing_space(&self) -> bool {
        self.residents.len() < self.kind.housing_capacity()
    }

    pub fn is_staffed(&self) -> bool {
        !self.workers.is_empty()
    }
}

/// Owns every building. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct BuildingRegistry {
    buildings: BTreeMap<BuildingId, Building>,
    next_id: u32,
}

impl BuildingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a building if its footprint is free; marks the footprint blocked
    pub fn place(
        &mut self,
        grid: &mut TileMap,
        kind: BuildingKind,
        origin: Cell,
        facing: Facing,
        complete: bool,
    ) -> Option<BuildingId> {
        let (w, h) = kind.size();
        if !grid.is_area_buildable(origin, w, h) {
            return None;
        }
        self.next_id += 1;
        let id = BuildingId(self.next_id);
        grid.occupy(origin, w, h, id);
        self.buildings.insert(id, Building::new(id, kind, origin, facing, complete));
        Some(id)
    }

    pub fn remove(&mut self, grid: &mut TileMap, id: BuildingId) -> Option<Building> {
        let building = self.buildings.remove(&id)?;
        grid.vacate(id);
        Some(building)
    }

    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    pub fn contains(&self, id: BuildingId) -> bool {
        self.buildings.contains_key(&id)
    }

    pub fn is_complete(&self, id: BuildingId) -> bool {
        self.get(id).map(|b| b.complete).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    /// Closest building (by door distance) matching `filter`; ties go to the lower id
    pub fn nearest(&self, from: Cell, filter: impl Fn(&Building) -> bool) -> Option<BuildingId> {
        self.buildings
            .values()
            .filter(|b| filter(b))
            .min_by_key(|b| (b.door.manhattan(&from), b.id))
            .map(|b| b.id)
    }

    pub fn assign_worker(&mut self, id: BuildingId, worker: EntityId) -> bool {
        match self.buildings.get_mut(&id) {
            Some(b) if b.workers.contains(&worker) => true,
            Some(b) if b.has_worker_slot() => {
                b.workers.push(worker);
                true
            }
            _ => false,
        }
    }

    pub fn unassign_worker(&mut self, id: BuildingId, worker: EntityId) {
        if let Some(b) = self.buildings.get_mut(&id) {
            b.workers.retain(|w| *w != worker);
        }
    }

    pub fn add_resident(&mut self, id: BuildingId, resident: EntityId) -> bool {
        match self.buildings.get_mut(&id) {
            Some(b) if b.residents.contains(&resident) => true,
            Some(b) if b.has_housing_space() => {
                b.residents.push(resident);
                true
            }
            _ => false,
        }
    }

    pub fn remove_resident(&mut self, id: BuildingId, resident: EntityId) {
        if let Some(b) = self.buildings.get_mut(&id) {
            b.residents.retain(|r| *r != resident);
        }
    }

    /// Record `agent` as inside; false when the building is full or missing
    pub fn enter(&mut self, id: BuildingId, agent: EntityId) -> bool {
        match self.buildings.get_mut(&id) {
            Some(b) if b.occupants.contains(&agent) => true,
            Some(b) if b.complete && b.has_room_inside() => {
                b.occupants.push(agent);
                true
            }
            _ => false,
        }
    }

    pub fn exit(&mut self, id: BuildingId, agent: EntityId) {
        if let Some(b) = self.buildings.get_mut(&id) {
            b.occupants.retain(|o| *o != agent);
        }
    }

    /// Add construction work; returns true on the call that completes the building
    pub fn add_construction(&mut self, id: BuildingId, work: f32) -> bool {
        let Some(b) = self.buildings.get_mut(&id) else {
            return false;
        };
        if b.complete {
            return false;
        }
        b.construction_progress += work;
        if b.construction_progress >= b.kind.work_required() {
            b.construction_progress = b.kind.work_required();
            b.complete = true;
            return true;
        }
        false
    }
}
