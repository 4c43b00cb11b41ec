//! Citizen identity, personality and behavioral scratch state

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingId;
use crate::core::error::{HearthError, Result};
use crate::core::types::{Cell, EntityId};

/// Age at which a citizen stops being a child
pub const ADULT_AGE: u32 = 16;

pub const MAX_TRAITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

/// Personality trait. Traits come in opposing pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Trait {
    Sociable,
    Shy,
    Hardworking,
    Lazy,
    Cheerful,
    Grumpy,
    Adventurous,
    Homebody,
}

impl Trait {
    pub fn opposite(&self) -> Trait {
        match self {
            Trait::Sociable => Trait::Shy,
            Trait::Shy => Trait::Sociable,
            Trait::Hardworking => Trait::Lazy,
            Trait::Lazy => Trait::Hardworking,
            Trait::Cheerful => Trait::Grumpy,
            Trait::Grumpy => Trait::Cheerful,
            Trait::Adventurous => Trait::Homebody,
            Trait::Homebody => Trait::Adventurous,
        }
    }
}

/// An ongoing conversation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub partner: EntityId,
    /// Ticks left
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeisureActivity {
    Reading,
    Tavern,
    Exploring,
    PartnerTime,
    SkillPractice,
    RecreationalFishing,
    RecreationalHunting,
    VisitNeighbor,
    Napping,
    Mentoring,
    Chapel,
    Foraging,
    TeachingChild,
    Bathing,
    MarketBrowsing,
    Stargazing,
    Campfire,
    Swimming,
    Gardening,
    ComfortingSick,
}

/// Where a pursuit takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PursuitTarget {
    Building(BuildingId),
    Agent(EntityId),
    Tile(Cell),
    InPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PursuitStage {
    Travelling,
    Performing { remaining: u32 },
}

/// A leisure activity in progress, resumed across evaluations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pursuit {
    pub activity: LeisureActivity,
    pub target: PursuitTarget,
    pub stage: PursuitStage,
}

impl Pursuit {
    pub fn new(activity: LeisureActivity, target: PursuitTarget) -> Self {
        Self { activity, target, stage: PursuitStage::Travelling }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citizen {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub sex: Sex,
    pub educated: bool,
    /// School progress toward `educated`, 0..=100
    pub education: f32,
    traits: Vec<Trait>,
    /// Human-readable label of the current activity. Never read by logic.
    pub activity: String,
    pub sleeping: bool,
    pub chat: Option<Chat>,
    /// Ticks before another leisure activity may be picked
    pub leisure_cooldown: u32,
    /// Building the citizen is currently inside
    pub inside: Option<BuildingId>,
    pub pursuit: Option<Pursuit>,
}

impl Citizen {
    /// Create a citizen, rejecting more than two traits or an opposing pair
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: u32,
        sex: Sex,
        traits: &[Trait],
    ) -> Result<Self> {
        if traits.len() > MAX_TRAITS {
            return Err(HearthError::TooManyTraits(traits.len()));
        }
        for (i, a) in traits.iter().enumerate() {
            for b in &traits[i + 1..] {
                if a.opposite() == *b || a == b {
                    return Err(HearthError::ConflictingTraits(*a, *b));
                }
            }
        }

        Ok(Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
            sex,
            educated: false,
            education: 0.0,
            traits: traits.to_vec(),
            activity: String::from("idle"),
            sleeping: false,
            chat: None,
            leisure_cooldown: 0,
            inside: None,
            pursuit: None,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_child(&self) -> bool {
        self.age < ADULT_AGE
    }

    pub fn traits(&self) -> &[Trait] {
        &self.traits
    }

    pub fn has_trait(&self, t: Trait) -> bool {
        self.traits.contains(&t)
    }

    pub fn is_chatting(&self) -> bool {
        self.chat.is_some()
    }

    pub fn set_activity(&mut self, label: &str) {
        if self.activity != label {
            self.activity.clear();
            self.activity.push_str(label);
        }
    }

    /// Multiplier on the chance to start a conversation
    pub fn chat_chance_modifier(&self) -> f32 {
        let mut m = 1.0;
        if self.has_trait(Trait::Sociable) {
            m *= 1.5;
        }
        if self.has_trait(Trait::Shy) {
            m *= 0.5;
        }
        m
    }

    /// Multiplier on happiness gained from social contact
    pub fn social_happiness_modifier(&self) -> f32 {
        let mut m = 1.0;
        if self.has_trait(Trait::Sociable) {
            m *= 1.25;
        }
        if self.has_trait(Trait::Shy) {
            m *= 0.75;
        }
        if self.has_trait(Trait::Cheerful) {
            m *= 1.2;
        }
        if self.has_trait(Trait::Grumpy) {
            m *= 0.8;
        }
        m
    }

    /// Additive work-speed bonus from personality
    pub fn work_bonus(&self) -> f32 {
        if self.has_trait(Trait::Hardworking) {
            0.2
        } else if self.has_trait(Trait::Lazy) {
            -0.2
        } else {
            0.0
        }
    }
}
