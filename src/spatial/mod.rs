//! Spatial layer - tile map and pathfinding

pub mod pathfinding;
pub mod tilemap;

pub use pathfinding::{PathResult, Pathfinder};
pub use tilemap::{Deposit, Terrain, Tile, TileMap};
