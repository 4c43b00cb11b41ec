//! Biological and emotional needs that drive citizen behavior

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::city::stockpile::FoodKind;
use crate::core::types::Tick;

pub const NEED_MAX: f32 = 100.0;

/// Meals remembered for variety
pub const DIET_MEMORY: usize = 8;

/// Needs, each in 0..=100 where 100 is fully satisfied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Needs {
    pub food: f32,
    pub warmth: f32,
    pub health: f32,
    pub energy: f32,
    pub happiness: f32,
    /// Most recent meal at the back
    pub diet: VecDeque<FoodKind>,
    pub sick: bool,
    pub last_social: Tick,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            food: 80.0,
            warmth: 80.0,
            health: 100.0,
            energy: 80.0,
            happiness: 60.0,
            diet: VecDeque::with_capacity(DIET_MEMORY),
            sick: false,
            last_social: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedType {
    Food,
    Warmth,
    Health,
    Energy,
    Happiness,
}

impl Needs {
    fn slot(&mut self, need: NeedType) -> &mut f32 {
        match need {
            NeedType::Food => &mut self.food,
            NeedType::Warmth => &mut self.warmth,
            NeedType::Health => &mut self.health,
            NeedType::Energy => &mut self.energy,
            NeedType::Happiness => &mut self.happiness,
        }
    }

    /// Add (or with a negative amount, remove) and clamp to 0..=100
    pub fn adjust(&mut self, need: NeedType, amount: f32) {
        let v = self.slot(need);
        *v = (*v + amount).clamp(0.0, NEED_MAX);
    }

    pub fn remember_meal(&mut self, food: FoodKind) {
        if self.diet.len() == DIET_MEMORY {
            self.diet.pop_front();
        }
        self.diet.push_back(food);
    }

    pub fn diet_slice(&self) -> Vec<FoodKind> {
        self.diet.iter().copied().collect()
    }
}
