//! Tile map - terrain, building occupancy and depletable resource deposits
//!
//! The map is a dense row-major array of tiles. Every change that alters
//! walkability bumps `revision`, which the pathfinder uses to drop stale
//! cached routes.

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingId;
use crate::core::types::Cell;

/// Ground type of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Grass,
    Forest,
    Water,
    Rock,
    Sand,
    Road,
}

impl Terrain {
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Terrain::Water)
    }

    /// Movement cost for entering a tile of this terrain
    pub fn movement_cost(&self) -> f32 {
        match self {
            Terrain::Road => 0.5,
            Terrain::Grass => 1.0,
            Terrain::Sand => 1.2,
            Terrain::Forest => 1.5,
            Terrain::Rock => 2.0,
            Terrain::Water => f32::INFINITY,
        }
    }
}

/// Harvestable deposit stored on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Deposit {
    Berries,
    Mushrooms,
    Herbs,
    Fish,
    Wildlife,
    Trees,
    Stone,
    Iron,
}

impl Deposit {
    pub const ALL: [Deposit; 8] = [
        Deposit::Berries,
        Deposit::Mushrooms,
        Deposit::Herbs,
        Deposit::Fish,
        Deposit::Wildlife,
        Deposit::Trees,
        Deposit::Stone,
        Deposit::Iron,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Renewable deposits grow back toward their original amount
    pub fn is_renewable(&self) -> bool {
        matches!(
            self,
            Deposit::Berries | Deposit::Mushrooms | Deposit::Herbs | Deposit::Fish | Deposit::Wildlife
        )
    }
}

/// A single map tile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    /// Building whose footprint covers this tile
    pub occupant: Option<BuildingId>,
    deposits: [u32; 8],
    /// Regrowth ceiling per deposit, set when the deposit is seeded
    ceilings: [u32; 8],
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        self.terrain.is_walkable() && self.occupant.is_none()
    }

    pub fn deposit(&self, kind: Deposit) -> u32 {
        self.deposits[kind.slot()]
    }
}

/// Dense 2D tile array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMap {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    revision: u64,
}

impl TileMap {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
            revision: 0,
        }
    }

    /// Walkability revision; changes whenever a tile becomes (un)walkable
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some((cell.y * self.width + cell.x) as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> Option<&Tile> {
        self.index(cell).map(|i| &self.tiles[i])
    }

    #[inline]
    fn get_mut(&mut self, cell: Cell) -> Option<&mut Tile> {
        self.index(cell).map(move |i| &mut self.tiles[i])
    }

    /// Clamp a continuous position into a valid cell
    pub fn clamp_cell(&self, x: f32, y: f32) -> Cell {
        Cell::new(
            (x.floor() as i32).clamp(0, self.width - 1),
            (y.floor() as i32).clamp(0, self.height - 1),
        )
    }

    pub fn terrain(&self, cell: Cell) -> Option<Terrain> {
        self.get(cell).map(|t| t.terrain)
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.get(cell).map(|t| t.is_walkable()).unwrap_or(false)
    }

    /// Cost of stepping onto a tile; infinite when out of bounds or blocked
    pub fn path_cost(&self, cell: Cell) -> f32 {
        match self.get(cell) {
            Some(tile) if tile.is_walkable() => tile.terrain.movement_cost(),
            _ => f32::INFINITY,
        }
    }

    /// True if every tile in the rectangle is free, dry land
    pub fn is_area_buildable(&self, origin: Cell, width: i32, height: i32) -> bool {
        (0..height).all(|dy| {
            (0..width).all(|dx| {
                self.get(origin.offset(dx, dy))
                    .map(|t| t.is_walkable())
                    .unwrap_or(false)
            })
        })
    }

    pub fn set_terrain(&mut self, cell: Cell, terrain: Terrain) {
        let Some(tile) = self.get_mut(cell) else {
            return;
        };
        let was_walkable = tile.is_walkable();
        tile.terrain = terrain;
        if tile.is_walkable() != was_walkable {
            self.revision += 1;
        }
    }

    /// Mark a building footprint as occupied
    pub fn occupy(&mut self, origin: Cell, width: i32, height: i32, building: BuildingId) {
        for dy in 0..height {
            for dx in 0..width {
                if let Some(tile) = self.get_mut(origin.offset(dx, dy)) {
                    tile.occupant = Some(building);
                }
            }
        }
        self.revision += 1;
    }

    /// Clear every tile occupied by `building`
    pub fn vacate(&mut self, building: BuildingId) {
        let mut changed = false;
        for tile in self.tiles.iter_mut().filter(|t| t.occupant == Some(building)) {
            tile.occupant = None;
            changed = true;
        }
        if changed {
            self.revision += 1;
        }
    }

    /// Seed a deposit; the amount also becomes the regrowth ceiling
    pub fn set_deposit(&mut self, cell: Cell, kind: Deposit, amount: u32) {
        if let Some(tile) = self.get_mut(cell) {
            tile.deposits[kind.slot()] = amount;
            tile.ceilings[kind.slot()] = amount;
        }
    }

    pub fn resource(&self, cell: Cell, kind: Deposit) -> u32 {
        self.get(cell).map(|t| t.deposit(kind)).unwrap_or(0)
    }

    /// Remove up to `amount` units; returns what was actually taken
    ///
    /// Felling the last tree turns forest into grass.
    pub fn deplete(&mut self, cell: Cell, kind: Deposit, amount: u32) -> u32 {
        let Some(tile) = self.get_mut(cell) else {
            return 0;
        };
        let slot = &mut tile.deposits[kind.slot()];
        let taken = amount.min(*slot);
        *slot -= taken;
        if *slot == 0 && kind == Deposit::Trees && tile.terrain == Terrain::Forest {
            tile.terrain = Terrain::Grass;
        }
        taken
    }

    /// Grow every renewable deposit of `kind` back by `amount`, up to its ceiling
    pub fn regrow(&mut self, kind: Deposit, amount: u32) {
        if !kind.is_renewable() {
            return;
        }
        let slot = kind.slot();
        for tile in &mut self.tiles {
            let ceiling = tile.ceilings[slot];
            tile.deposits[slot] = (tile.deposits[slot] + amount).min(ceiling);
        }
    }

    /// Cells within `radius` (Chebyshev) of `center` holding any of `kinds`
    pub fn cells_with_deposits(&self, center: Cell, radius: i32, kinds: &[Deposit]) -> Vec<(Cell, Deposit)> {
        let mut found = Vec::new();
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                let cell = Cell::new(x, y);
                let Some(tile) = self.get(cell) else {
                    continue;
                };
                if let Some(kind) = kinds.iter().copied().find(|k| tile.deposit(*k) > 0) {
                    found.push((cell, kind));
                }
            }
        }
        found
    }
}
