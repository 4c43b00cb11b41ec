//! Worker component: profession, workplace, skills and the gather cycle state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingId;
use crate::city::stockpile::{FoodKind, ResourceKind};
use crate::core::calendar::SeasonalActivity;
use crate::core::types::Cell;
use crate::spatial::tilemap::Deposit;

pub const MAX_SKILL_LEVEL: u8 = 5;
pub const XP_PER_LEVEL: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    Foraging,
    Hunting,
    Fishing,
    Herbalism,
    Woodcutting,
    Quarrying,
    Mining,
    Building,
    Teaching,
    Ministry,
    Hospitality,
    Healing,
    Trading,
    Scholarship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Profession {
    #[default]
    Laborer,
    Forager,
    Hunter,
    Fisher,
    Herbalist,
    Woodcutter,
    Quarrier,
    Miner,
    Teacher,
    Priest,
    Tavernkeeper,
    Healer,
    Merchant,
    Librarian,
}

/// Static parameters of an extractive profession
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatherProfile {
    /// Ticks of work per extraction at multiplier 1.0
    pub base_ticks: u32,
    /// Units carried per extraction before bonuses
    pub base_yield: u32,
    pub needs_tool: bool,
    pub activity: SeasonalActivity,
    /// Left at the extraction site and fetched after the deposit run
    pub secondary: Option<(ResourceKind, u32)>,
}

impl Profession {
    pub fn skill(&self) -> Skill {
        match self {
            Profession::Laborer => Skill::Building,
            Profession::Forager => Skill::Foraging,
            Profession::Hunter => Skill::Hunting,
            Profession::Fisher => Skill::Fishing,
            Profession::Herbalist => Skill::Herbalism,
            Profession::Woodcutter => Skill::Woodcutting,
            Profession::Quarrier => Skill::Quarrying,
            Profession::Miner => Skill::Mining,
            Profession::Teacher => Skill::Teaching,
            Profession::Priest => Skill::Ministry,
            Profession::Tavernkeeper => Skill::Hospitality,
            Profession::Healer => Skill::Healing,
            Profession::Merchant => Skill::Trading,
            Profession::Librarian => Skill::Scholarship,
        }
    }

    /// Gather parameters, `None` for non-extractive jobs
    pub fn gather_profile(&self) -> Option<GatherProfile> {
        use SeasonalActivity as A;
        let (base_ticks, base_yield, needs_tool, activity, secondary) = match self {
            Profession::Forager => (60, 2, false, A::Foraging, None),
            Profession::Hunter => (120, 2, true, A::Hunting, Some((ResourceKind::Leather, 1))),
            Profession::Fisher => (90, 2, false, A::Fishing, None),
            Profession::Herbalist => (80, 1, false, A::Herbalism, None),
            Profession::Woodcutter => (100, 3, true, A::Logging, None),
            Profession::Quarrier => (120, 2, true, A::Quarrying, None),
            Profession::Miner => (150, 1, true, A::Mining, None),
            _ => return None,
        };
        Some(GatherProfile { base_ticks, base_yield, needs_tool, activity, secondary })
    }

    pub fn is_extractive(&self) -> bool {
        self.gather_profile().is_some()
    }
}

/// What a deposit turns into once carried home
pub fn deposit_yield(deposit: Deposit) -> ResourceKind {
    match deposit {
        Deposit::Berries => ResourceKind::Food(FoodKind::Berries),
        Deposit::Mushrooms => ResourceKind::Food(FoodKind::Mushrooms),
        Deposit::Herbs => ResourceKind::Herbs,
        Deposit::Fish => ResourceKind::Food(FoodKind::Fish),
        Deposit::Wildlife => ResourceKind::Food(FoodKind::Venison),
        Deposit::Trees => ResourceKind::Logs,
        Deposit::Stone => ResourceKind::Stone,
        Deposit::Iron => ResourceKind::Iron,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carry {
    pub resource: ResourceKind,
    pub amount: u32,
}

/// Resource tile a gatherer has committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherTarget {
    pub tile: Cell,
    pub deposit: Deposit,
}

/// Secondary resource waiting at an extraction site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPickup {
    pub tile: Cell,
    pub resource: ResourceKind,
    pub amount: u32,
}

/// Gather cycle. `None` on the worker means the cycle was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatherState {
    Seeking { target: Option<GatherTarget> },
    Gathering { target: GatherTarget, elapsed: u32 },
    Returning,
    SeekingPickup { pickup: PendingPickup },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillProgress {
    pub xp: u32,
}

impl SkillProgress {
    pub fn level(&self) -> u8 {
        ((self.xp / XP_PER_LEVEL) as u8).min(MAX_SKILL_LEVEL)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Worker {
    pub profession: Profession,
    pub workplace: Option<BuildingId>,
    /// Set by the player; stuck recovery never unassigns these
    pub manually_assigned: bool,
    pub carrying: Option<Carry>,
    pub gather: Option<GatherState>,
    pub pending_pickup: Option<PendingPickup>,
    pub skills: BTreeMap<Skill, SkillProgress>,
    /// Completed extractions over the worker's life
    pub lifetime_gathers: u32,
}

impl Worker {
    pub fn new(profession: Profession) -> Self {
        Self { profession, ..Self::default() }
    }

    pub fn skill_level(&self, skill: Skill) -> u8 {
        self.skills.get(&skill).map(|s| s.level()).unwrap_or(0)
    }

    /// Add xp; returns the new level when it went up
    pub fn grant_xp(&mut self, skill: Skill, xp: u32) -> Option<u8> {
        let progress = self.skills.entry(skill).or_default();
        let before = progress.level();
        progress.xp = progress.xp.saturating_add(xp);
        let after = progress.level();
        (after > before).then_some(after)
    }

    /// Bonus from accumulated experience
    pub fn milestone_bonus(&self) -> f32 {
        match self.lifetime_gathers {
            0..=49 => 0.0,
            50..=199 => 0.1,
            _ => 0.2,
        }
    }

    /// Where to pick the gather cycle back up after an interruption
    pub fn resume_state(&self) -> GatherState {
        if self.carrying.is_some() {
            GatherState::Returning
        } else {
            GatherState::Seeking { target: None }
        }
    }

    /// Drop the cycle and any committed target
    pub fn interrupt(&mut self) {
        self.gather = None;
    }

    /// Leave the workplace and fall back to general labor. Carried goods
    /// stay with the worker until they are delivered to a storehouse.
    pub fn unassign(&mut self) {
        self.profession = Profession::Laborer;
        self.workplace = None;
        self.manually_assigned = false;
        self.gather = None;
        self.pending_pickup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_levels_cap() {
        let mut w = Worker::new(Profession::Forager);
        assert_eq!(w.skill_level(Skill::Foraging), 0);
        assert_eq!(w.grant_xp(Skill::Foraging, 99), None);
        assert_eq!(w.grant_xp(Skill::Foraging, 1), Some(1));
        w.grant_xp(Skill::Foraging, 10_000);
        assert_eq!(w.skill_level(Skill::Foraging), MAX_SKILL_LEVEL);
    }

    #[test]
    fn test_resume_state_depends_on_carry() {
        let mut w = Worker::new(Profession::Woodcutter);
        assert_eq!(w.resume_state(), GatherState::Seeking { target: None });
        w.carrying = Some(Carry { resource: ResourceKind::Logs, amount: 3 });
        assert_eq!(w.resume_state(), GatherState::Returning);
    }

    #[test]
    fn test_extractive_professions() {
        assert!(Profession::Hunter.is_extractive());
        assert!(!Profession::Teacher.is_extractive());
        let hunter = Profession::Hunter.gather_profile().unwrap();
        assert_eq!(hunter.secondary, Some((ResourceKind::Leather, 1)));
        assert_eq!(deposit_yield(Deposit::Wildlife), ResourceKind::Food(FoodKind::Venison));
    }

    #[test]
    fn test_milestones() {
        let mut w = Worker::default();
        w.lifetime_gathers = 60;
        assert!((w.milestone_bonus() - 0.1).abs() < 1e-6);
        w.lifetime_gathers = 500;
        assert!((w.milestone_bonus() - 0.2).abs() < 1e-6);
    }
}
