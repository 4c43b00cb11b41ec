//! Stockpile - settlement-level resource storage behind the `ResourceService` seam

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Edible goods, cooked dishes first. Declaration order is the final tie-break
/// when choosing a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FoodKind {
    Bread,
    CookedFish,
    Stew,
    VenisonRoast,
    Berries,
    Mushrooms,
    Fish,
    Venison,
}

/// What eating one portion of a food does
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodProfile {
    pub cooked: bool,
    /// Units removed from storage for a standard portion
    pub cost: u32,
    pub restore: f32,
    pub happiness: f32,
    pub warmth: f32,
    pub energy: f32,
}

impl FoodKind {
    pub const ALL: [FoodKind; 8] = [
        FoodKind::Bread,
        FoodKind::CookedFish,
        FoodKind::Stew,
        FoodKind::VenisonRoast,
        FoodKind::Berries,
        FoodKind::Mushrooms,
        FoodKind::Fish,
        FoodKind::Venison,
    ];

    pub fn profile(&self) -> FoodProfile {
        let (cooked, cost, restore, happiness, warmth, energy) = match self {
            FoodKind::Bread => (true, 1, 40.0, 2.0, 0.0, 5.0),
            FoodKind::CookedFish => (true, 1, 42.0, 3.0, 0.0, 0.0),
            FoodKind::Stew => (true, 1, 45.0, 4.0, 10.0, 0.0),
            FoodKind::VenisonRoast => (true, 1, 50.0, 5.0, 5.0, 5.0),
            FoodKind::Berries => (false, 2, 20.0, 1.0, 0.0, 0.0),
            FoodKind::Mushrooms => (false, 2, 22.0, 0.0, 0.0, 0.0),
            FoodKind::Fish => (false, 2, 25.0, 0.0, 0.0, 0.0),
            FoodKind::Venison => (false, 2, 28.0, 0.0, 0.0, 0.0),
        };
        FoodProfile { cooked, cost, restore, happiness, warmth, energy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Food(FoodKind),
    Herbs,
    Leather,
    Logs,
    Stone,
    Iron,
    Tools,
}

impl ResourceKind {
    /// Every storable resource, foods first
    pub fn all() -> impl Iterator<Item = ResourceKind> {
        FoodKind::ALL.into_iter().map(ResourceKind::Food).chain([
            ResourceKind::Herbs,
            ResourceKind::Leather,
            ResourceKind::Logs,
            ResourceKind::Stone,
            ResourceKind::Iron,
            ResourceKind::Tools,
        ])
    }
}

/// How much of the chosen food to take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portion {
    /// The food's own standard cost
    Standard,
    /// A fixed number of units regardless of kind
    Fixed(u32),
}

/// Food taken from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meal {
    pub food: FoodKind,
    pub units: u32,
}

/// Storage contract consumed by agent behavior
pub trait ResourceService: Send + Sync + std::fmt::Debug {
    /// Store up to `amount`; returns the amount actually stored
    fn add_resource(&mut self, kind: ResourceKind, amount: u32) -> u32;
    /// Take up to `amount`; returns the amount actually removed
    fn remove_resource(&mut self, kind: ResourceKind, amount: u32) -> u32;
    /// Take a meal, preferring cooked food then variety against `history`
    fn remove_food_prefer_variety(&mut self, portion: Portion, history: &[FoodKind]) -> Option<Meal>;
    fn is_storage_full(&self) -> bool;
    fn total_food(&self) -> u32;
    fn amount(&self, kind: ResourceKind) -> u32;
}

/// Pooled settlement storage with a single shared capacity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stockpile {
    resources: AHashMap<ResourceKind, u32>,
    capacity: u32,
}

impl Stockpile {
    pub fn new(capacity: u32) -> Self {
        Self { resources: AHashMap::new(), capacity }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    pub fn total(&self) -> u32 {
        self.resources.values().sum()
    }

    fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.total())
    }

    /// Pick the food to eat without removing it
    fn choose_food(&self, portion: Portion, history: &[FoodKind]) -> Option<(FoodKind, u32)> {
        let available: Vec<(usize, FoodKind, u32, u32)> = FoodKind::ALL
            .iter()
            .enumerate()
            .filter_map(|(order, food)| {
                let needed = match portion {
                    Portion::Standard => food.profile().cost,
                    Portion::Fixed(n) => n,
                };
                let stock = self.amount(ResourceKind::Food(*food));
                (stock >= needed && stock > 0).then_some((order, *food, stock, needed))
            })
            .collect();

        let any_cooked = available.iter().any(|(_, f, _, _)| f.profile().cooked);

        available
            .into_iter()
            .filter(|(_, f, _, _)| f.profile().cooked == any_cooked)
            .min_by_key(|(order, food, stock, _)| {
                let eaten = history.iter().filter(|h| *h == food).count();
                (eaten, std::cmp::Reverse(*stock), *order)
            })
            .map(|(_, food, _, needed)| (food, needed))
    }
}

impl ResourceService for Stockpile {
    fn add_resource(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let added = amount.min(self.free_space());
        if added > 0 {
            *self.resources.entry(kind).or_insert(0) += added;
        }
        added
    }

    fn remove_resource(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        match self.resources.get_mut(&kind) {
            Some(current) => {
                let removed = amount.min(*current);
                *current -= removed;
                removed
            }
            None => 0,
        }
    }

    fn remove_food_prefer_variety(&mut self, portion: Portion, history: &[FoodKind]) -> Option<Meal> {
        let (food, needed) = self.choose_food(portion, history)?;
        let units = self.remove_resource(ResourceKind::Food(food), needed);
        Some(Meal { food, units })
    }

    fn is_storage_full(&self) -> bool {
        self.free_space() == 0
    }

    fn total_food(&self) -> u32 {
        FoodKind::ALL
            .iter()
            .map(|f| self.amount(ResourceKind::Food(*f)))
            .sum()
    }

    fn amount(&self, kind: ResourceKind) -> u32 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stockpile_add_remove() {
        let mut stockpile = Stockpile::new(50);

        assert_eq!(stockpile.add_resource(ResourceKind::Logs, 30), 30);
        assert_eq!(stockpile.amount(ResourceKind::Logs), 30);

        // Shared capacity
        assert_eq!(stockpile.add_resource(ResourceKind::Stone, 30), 20);
        assert!(stockpile.is_storage_full());

        assert_eq!(stockpile.remove_resource(ResourceKind::Logs, 40), 30);
        assert_eq!(stockpile.remove_resource(ResourceKind::Iron, 1), 0);
        assert!(!stockpile.is_storage_full());
    }

    #[test]
    fn test_cooked_food_preferred() {
        let mut stockpile = Stockpile::new(100);
        stockpile.add_resource(ResourceKind::Food(FoodKind::Berries), 20);
        stockpile.add_resource(ResourceKind::Food(FoodKind::Stew), 1);

        let meal = stockpile.remove_food_prefer_variety(Portion::Standard, &[]).unwrap();
        assert_eq!(meal.food, FoodKind::Stew);
        assert_eq!(meal.units, 1);

        let meal = stockpile.remove_food_prefer_variety(Portion::Standard, &[]).unwrap();
        assert_eq!(meal, Meal { food: FoodKind::Berries, units: 2 });
    }

    #[test]
    fn test_variety_beats_stock() {
        let mut stockpile = Stockpile::new(100);
        stockpile.add_resource(ResourceKind::Food(FoodKind::Berries), 30);
        stockpile.add_resource(ResourceKind::Food(FoodKind::Mushrooms), 4);
        let history = [FoodKind::Berries, FoodKind::Berries, FoodKind::Berries];

        let meal = stockpile.remove_food_prefer_variety(Portion::Standard, &history).unwrap();
        assert_eq!(meal.food, FoodKind::Mushrooms);
    }

    #[test]
    fn test_stock_then_declaration_order_break_ties() {
        let mut stockpile = Stockpile::new(100);
        stockpile.add_resource(ResourceKind::Food(FoodKind::Fish), 6);
        stockpile.add_resource(ResourceKind::Food(FoodKind::Venison), 9);
        let meal = stockpile.remove_food_prefer_variety(Portion::Standard, &[]).unwrap();
        assert_eq!(meal.food, FoodKind::Venison);

        let mut even = Stockpile::new(100);
        even.add_resource(ResourceKind::Food(FoodKind::Fish), 5);
        even.add_resource(ResourceKind::Food(FoodKind::Berries), 5);
        let meal = even.remove_food_prefer_variety(Portion::Standard, &[]).unwrap();
        assert_eq!(meal.food, FoodKind::Berries);
    }

    #[test]
    fn test_fixed_portion_and_empty() {
        let mut stockpile = Stockpile::new(100);
        assert!(stockpile.remove_food_prefer_variety(Portion::Fixed(1), &[]).is_none());

        stockpile.add_resource(ResourceKind::Food(FoodKind::Berries), 1);
        // A standard raw portion needs 2 units, the emergency portion only 1
        assert!(stockpile.remove_food_prefer_variety(Portion::Standard, &[]).is_none());
        let meal = stockpile.remove_food_prefer_variety(Portion::Fixed(1), &[]).unwrap();
        assert_eq!(meal.units, 1);
        assert_eq!(stockpile.total_food(), 0);
    }
}
