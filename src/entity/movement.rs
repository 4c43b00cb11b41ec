//! Position and path-following state

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{Cell, Vec2};

/// Base walking speed in tiles per tick
pub const BASE_SPEED: f32 = 0.1;

/// Where an agent stands
///
/// `x`/`y` are continuous tile coordinates; `cell` is always their floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub cell: Cell,
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Stand at the center of `cell`
    pub fn at(cell: Cell) -> Self {
        let c = cell.center();
        Self { cell, x: c.x, y: c.y }
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.cell = Cell::new(x.floor() as i32, y.floor() as i32);
    }

    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Path-following state
///
/// A non-empty path means the agent is committed to it; decisions are not
/// re-made until it drains or is cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub path: VecDeque<Cell>,
    pub speed: f32,
    pub speed_modifier: Option<f32>,
    /// Consecutive evaluations without leaving the current cell
    pub stuck_counter: u32,
    /// Cell recorded at the previous evaluation
    pub last_cell: Option<Cell>,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            path: VecDeque::new(),
            speed: BASE_SPEED,
            speed_modifier: None,
            stuck_counter: 0,
            last_cell: None,
        }
    }
}

impl Movement {
    pub fn is_moving(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn set_path(&mut self, path: impl IntoIterator<Item = Cell>) {
        self.path = path.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.path.clear();
    }

    pub fn next_waypoint(&self) -> Option<Cell> {
        self.path.front().copied()
    }

    pub fn destination(&self) -> Option<Cell> {
        self.path.back().copied()
    }

    /// Tiles per tick before terrain cost is applied
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.speed_modifier.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_tracks_cell() {
        let mut pos = Position::at(Cell::new(2, 3));
        assert_eq!(pos.x, 2.5);
        pos.set(4.99, 0.01);
        assert_eq!(pos.cell, Cell::new(4, 0));
    }

    #[test]
    fn test_movement_path_queue() {
        let mut mv = Movement::default();
        assert!(!mv.is_moving());
        mv.set_path(vec![Cell::new(0, 0), Cell::new(1, 0)]);
        assert_eq!(mv.next_waypoint(), Some(Cell::new(0, 0)));
        assert_eq!(mv.destination(), Some(Cell::new(1, 0)));
        mv.speed_modifier = Some(2.0);
        assert!((mv.effective_speed() - 0.2).abs() < 1e-6);
        mv.clear();
        assert!(!mv.is_moving());
    }
}
