//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. A partial TOML file may override any
//! subset of them; missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{HearthError, Result};

/// Configuration for the simulation systems
///
/// These values have been tuned to produce readable settlement behavior.
/// Changing them will affect pacing and feel, never correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === SCHEDULING ===
    /// Seed for the single world RNG. Same seed + same tick count = same world.
    pub seed: u64,

    /// Agents are re-evaluated every `ai_interval` ticks
    ///
    /// Evaluation is staggered by entity id so that roughly 1/N of the
    /// population thinks on any given tick. Movement still runs every tick.
    pub ai_interval: u64,

    /// Minimum population before movement steps are computed with rayon
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,

    /// Ticks in one day (day/night cycle length)
    pub ticks_per_day: u64,

    /// Days in one season (spring, summer, autumn, winter)
    pub days_per_season: u64,

    // === PATHFINDING ===
    /// Maximum number of cached (start, end) path results
    pub path_cache_size: usize,

    /// Hard cap on A* node expansions before giving up
    pub max_path_iterations: usize,

    /// Ring radius searched for a walkable substitute when the goal is blocked
    pub walkable_search_radius: i32,

    // === NEEDS THRESHOLDS (all needs are 0..=100) ===
    /// Below this food level the agent eats anything, right now
    pub starving_threshold: f32,

    /// Below this warmth the agent drops everything to find shelter
    pub freezing_threshold: f32,

    /// Below this energy the agent sleeps regardless of time of day
    pub exhausted_threshold: f32,

    /// Below this food level the agent takes a normal meal when convenient
    pub hungry_threshold: f32,

    /// At night, agents below this energy go to bed
    pub night_sleep_energy: f32,

    /// Homeless agents below this energy sleep outdoors where they stand
    pub emergency_energy: f32,

    /// Agents below this warmth favour heated leisure venues
    pub cold_threshold: f32,

    /// Units of food removed by an emergency meal
    pub emergency_meal_cost: u32,

    /// Food restored by an emergency meal
    pub emergency_meal_restore: f32,

    // === VITALS DRIFT (per tick) ===
    pub food_decay: f32,
    pub energy_decay: f32,
    pub sleep_energy_recovery: f32,
    /// Warmth lost per tick outdoors in winter; other seasons scale this down
    pub warmth_decay_winter: f32,
    /// Warmth gained per tick inside a heated building
    pub heated_warmth_gain: f32,
    pub happiness_decay: f32,
    /// Health lost per tick while food is at zero
    pub starvation_damage: f32,

    // === SOCIAL ===
    /// Base chance per evaluation of striking up a conversation
    pub chat_chance: f32,
    /// Radius (tiles) in which a chat partner is searched
    pub chat_radius: i32,
    /// Ticks a conversation lasts
    pub chat_duration: u32,
    /// Happiness gained from one conversation (before trait modifiers)
    pub chat_happiness: f32,
    /// Ticks without social contact before loneliness sets in
    pub lonely_after_ticks: u64,
    /// Happiness lost per evaluation while lonely
    pub loneliness_penalty: f32,
    /// Base chance per evening evaluation of heading to the tavern
    pub tavern_chance: f32,
    /// Chance per idle evaluation of picking a leisure activity instead of wandering
    pub leisure_chance: f32,

    // === MOVEMENT / RECOVERY ===
    /// Radius of an ordinary idle wander
    pub wander_radius: i32,
    /// Evaluations without progress before an agent counts as stuck
    pub stuck_threshold: u32,
    /// Radius of the forced wander used to shake a stuck agent loose
    pub stuck_wander_radius: i32,

    // === GATHERING ===
    /// Number of nearest resource tiles tried with the pathfinder before giving up
    pub gather_candidates: usize,
    /// Chance of one bonus unit when the gatherer's skill is maxed
    pub master_bonus_chance: f32,

    // === CONSTRUCTION / SCHOOL / FESTIVAL ===
    /// Construction progress contributed per laborer evaluation
    pub construction_work: f32,
    /// Education progress gained per school evaluation (graduates at 100)
    pub education_rate: f32,
    /// Happiness gained per festival evaluation
    pub festival_happiness: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Scheduling
            seed: 42,
            ai_interval: 10,
            parallel_threshold: 1000,
            ticks_per_day: 2400,
            days_per_season: 10,

            // Pathfinding
            path_cache_size: 64,
            max_path_iterations: 5000,
            walkable_search_radius: 5,

            // Needs thresholds (starving < freezing < exhausted ordering is not required)
            starving_threshold: 15.0,
            freezing_threshold: 20.0,
            exhausted_threshold: 15.0,
            hungry_threshold: 40.0,
            night_sleep_energy: 90.0,
            emergency_energy: 10.0,
            cold_threshold: 40.0,
            emergency_meal_cost: 1,
            emergency_meal_restore: 20.0,

            // Vitals
            food_decay: 0.01,
            energy_decay: 0.015,
            sleep_energy_recovery: 0.08,
            warmth_decay_winter: 0.03,
            heated_warmth_gain: 0.1,
            happiness_decay: 0.002,
            starvation_damage: 0.05,

            // Social
            chat_chance: 0.08,
            chat_radius: 3,
            chat_duration: 60,
            chat_happiness: 4.0,
            lonely_after_ticks: 4800,
            loneliness_penalty: 0.5,
            tavern_chance: 0.15,
            leisure_chance: 0.5,

            // Movement
            wander_radius: 6,
            stuck_threshold: 5,
            stuck_wander_radius: 15,

            // Gathering
            gather_candidates: 5,
            master_bonus_chance: 0.25,

            // Construction / school / festival
            construction_work: 5.0,
            education_rate: 0.5,
            festival_happiness: 2.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.ai_interval == 0 {
            return Err(HearthError::InvalidConfig("ai_interval must be at least 1".into()));
        }

        if self.ticks_per_day < 24 || self.days_per_season == 0 {
            return Err(HearthError::InvalidConfig(format!(
                "ticks_per_day ({}) must be >= 24 and days_per_season ({}) >= 1",
                self.ticks_per_day, self.days_per_season
            )));
        }

        if self.path_cache_size == 0 {
            return Err(HearthError::InvalidConfig("path_cache_size must be positive".into()));
        }

        for (name, radius) in [
            ("wander_radius", self.wander_radius),
            ("stuck_wander_radius", self.stuck_wander_radius),
        ] {
            if radius < 1 {
                return Err(HearthError::InvalidConfig(format!("{} ({}) must be at least 1", name, radius)));
            }
        }

        // Eating must kick in before starvation does
        if self.starving_threshold >= self.hungry_threshold {
            return Err(HearthError::InvalidConfig(format!(
                "starving_threshold ({}) should be < hungry_threshold ({})",
                self.starving_threshold, self.hungry_threshold
            )));
        }

        for (name, p) in [
            ("chat_chance", self.chat_chance),
            ("tavern_chance", self.tavern_chance),
            ("leisure_chance", self.leisure_chance),
            ("master_bonus_chance", self.master_bonus_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(HearthError::InvalidConfig(format!(
                    "{} ({}) must be a probability",
                    name, p
                )));
            }
        }

        Ok(())
    }
}
