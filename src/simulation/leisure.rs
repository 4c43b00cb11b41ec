//! Leisure handler
//!
//! An idle adult picks one activity from a weighted menu built from what the
//! settlement currently offers. The choice is stored on the citizen as a
//! `Pursuit` and resumed on later evaluations: travel to the target, spend
//! the activity's duration there, then collect the reward. Targets are
//! re-checked on every evaluation and a pursuit whose target went away is
//! dropped.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::city::building::{BuildingId, BuildingKind};
use crate::city::stockpile::{FoodKind, ResourceKind};
use crate::core::calendar::Season;
use crate::core::types::{Cell, EntityId};
use crate::ecs::world::World;
use crate::entity::citizen::Trait;
use crate::entity::needs::NeedType;
use crate::entity::{
    Citizen, Family, LeisureActivity, Needs, Pursuit, PursuitStage, PursuitTarget, Worker,
};
use crate::simulation::events::SimulationEvent;
use crate::simulation::navigation::{
    approach_building, approach_cell, enter_building, exit_building, Approach,
};
use crate::spatial::tilemap::{Deposit, Terrain};

/// Ticks after a finished activity before another one is picked
pub const LEISURE_COOLDOWN: u32 = 240;

/// Search radius for outdoor leisure spots and people to visit
const LEISURE_RADIUS: i32 = 10;

/// Experience granted by practice and mentoring
const PRACTICE_XP: u32 = 5;
const MENTOR_XP: u32 = 10;

/// Skill level needed to mentor someone
const MENTOR_LEVEL: u8 = 3;

/// How long an activity lasts once started, and what it gives back
#[derive(Debug, Clone, Copy)]
struct Reward {
    duration: u32,
    happiness: f32,
    /// Counts as social contact
    social: bool,
}

fn reward(activity: LeisureActivity) -> Reward {
    use LeisureActivity::*;
    let (duration, happiness, social) = match activity {
        Reading => (120, 6.0, false),
        Tavern => (150, 8.0, true),
        Exploring => (60, 5.0, false),
        PartnerTime => (120, 10.0, true),
        SkillPractice => (100, 3.0, false),
        RecreationalFishing => (120, 6.0, false),
        RecreationalHunting => (150, 6.0, false),
        VisitNeighbor => (90, 7.0, true),
        Napping => (150, 2.0, false),
        Mentoring => (100, 5.0, true),
        Chapel => (90, 6.0, true),
        Foraging => (80, 4.0, false),
        TeachingChild => (100, 6.0, true),
        Bathing => (60, 5.0, false),
        MarketBrowsing => (60, 4.0, true),
        Stargazing => (80, 7.0, false),
        Campfire => (100, 6.0, true),
        Swimming => (60, 8.0, false),
        Gardening => (100, 5.0, false),
        ComfortingSick => (80, 4.0, true),
    };
    Reward { duration, happiness, social }
}

fn label(activity: LeisureActivity) -> &'static str {
    use LeisureActivity::*;
    match activity {
        Reading => "reading",
        Tavern => "at the tavern",
        Exploring => "exploring",
        PartnerTime => "with partner",
        SkillPractice => "practicing",
        RecreationalFishing => "fishing for fun",
        RecreationalHunting => "hunting for sport",
        VisitNeighbor => "visiting a neighbor",
        Napping => "napping",
        Mentoring => "mentoring",
        Chapel => "at chapel",
        Foraging => "foraging",
        TeachingChild => "teaching a child",
        Bathing => "bathing",
        MarketBrowsing => "browsing the market",
        Stargazing => "stargazing",
        Campfire => "at the campfire",
        Swimming => "swimming",
        Gardening => "gardening",
        ComfortingSick => "comforting the sick",
    }
}

/// Personality pull toward an activity
fn trait_weight(citizen: &Citizen, activity: LeisureActivity) -> f32 {
    use LeisureActivity::*;
    let social = reward(activity).social;
    let mut w = 1.0;
    for &t in citizen.traits() {
        w *= match (t, activity) {
            (Trait::Sociable, _) if social => 2.0,
            (Trait::Shy, _) if social => 0.5,
            (Trait::Shy, Reading | Stargazing | Gardening) => 1.5,
            (Trait::Adventurous, Exploring | RecreationalHunting | Swimming) => 2.0,
            (Trait::Homebody, Exploring | RecreationalHunting | Swimming) => 0.5,
            (Trait::Homebody, Reading | Gardening | Napping) => 1.5,
            (Trait::Lazy, Napping) => 2.0,
            (Trait::Lazy, SkillPractice | Mentoring) => 0.5,
            (Trait::Hardworking, SkillPractice | Mentoring) => 2.0,
            (Trait::Cheerful, ComfortingSick | Campfire) => 1.5,
            (Trait::Grumpy, _) if social => 0.75,
            _ => 1.0,
        };
    }
    w
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    activity: LeisureActivity,
    target: PursuitTarget,
    weight: f32,
}

fn nearest_building(world: &World, from: Cell, kind: BuildingKind) -> Option<BuildingId> {
    world.buildings.nearest(from, |b| b.kind == kind && b.complete && b.has_room_inside())
}

fn nearest_deposit(world: &World, from: Cell, kinds: &[Deposit]) -> Option<Cell> {
    world
        .grid
        .cells_with_deposits(from, LEISURE_RADIUS, kinds)
        .into_iter()
        .map(|(cell, _)| cell)
        .min_by_key(|cell| (cell.manhattan(&from), cell.y, cell.x))
}

fn nearest_water(world: &World, from: Cell) -> Option<Cell> {
    let mut best: Option<Cell> = None;
    for y in (from.y - LEISURE_RADIUS)..=(from.y + LEISURE_RADIUS) {
        for x in (from.x - LEISURE_RADIUS)..=(from.x + LEISURE_RADIUS) {
            let cell = Cell::new(x, y);
            if world.grid.terrain(cell) != Some(Terrain::Water) {
                continue;
            }
            if best.map(|b| cell.manhattan(&from) < b.manhattan(&from)).unwrap_or(true) {
                best = Some(cell);
            }
        }
    }
    best
}

fn is_awake(world: &World, id: EntityId) -> bool {
    world.store.get::<Citizen>(id).map(|c| !c.sleeping).unwrap_or(false)
}

/// Both agents live in the same house
fn shares_home(world: &World, a: EntityId, b: EntityId) -> bool {
    let home = |id| world.store.get::<Family>(id).and_then(|f| f.home);
    matches!((home(a), home(b)), (Some(x), Some(y)) if x == y)
}

/// A nearby adult of the same profession with a lower skill level
fn find_mentee(world: &World, id: EntityId, here: Cell) -> Option<EntityId> {
    let worker = world.store.get::<Worker>(id)?;
    let skill = worker.profession.skill();
    let level = worker.skill_level(skill);
    if level < MENTOR_LEVEL {
        return None;
    }
    world
        .store
        .workers
        .iter()
        .filter(|(other, w)| **other != id && w.profession == worker.profession && w.skill_level(skill) < level)
        .filter(|(other, _)| is_awake(world, **other))
        .filter_map(|(other, _)| world.agent_cell(*other).map(|c| (*other, c)))
        .filter(|(_, cell)| cell.chebyshev(&here) <= LEISURE_RADIUS)
        .min_by_key(|(other, cell)| (cell.chebyshev(&here), *other))
        .map(|(other, _)| other)
}

/// The home of the nearest other household
fn find_neighbor_home(world: &World, id: EntityId, here: Cell) -> Option<BuildingId> {
    let own = world.store.get::<Family>(id).and_then(|f| f.home);
    world
        .store
        .families
        .iter()
        .filter(|(other, _)| **other != id)
        .filter_map(|(_, f)| f.home)
        .filter(|home| Some(*home) != own)
        .filter_map(|home| world.buildings.get(home))
        .filter(|b| b.complete && b.has_room_inside())
        .min_by_key(|b| (b.door.manhattan(&here), b.id))
        .map(|b| b.id)
}

fn find_sick(world: &World, id: EntityId, here: Cell) -> Option<EntityId> {
    world
        .store
        .needs
        .iter()
        .filter(|(other, n)| **other != id && n.sick)
        .filter_map(|(other, _)| world.agent_cell(*other).map(|c| (*other, c)))
        .filter(|(_, cell)| cell.chebyshev(&here) <= LEISURE_RADIUS)
        .min_by_key(|(other, cell)| (cell.chebyshev(&here), *other))
        .map(|(other, _)| other)
}

/// Everything this agent could do right now, with weights. `explore` is a
/// pre-rolled destination for a walk.
fn menu(world: &World, id: EntityId, explore: Cell) -> Vec<Candidate> {
    use LeisureActivity::*;
    let (Some(citizen), Some(needs), Some(here)) = (
        world.store.get::<Citizen>(id),
        world.store.get::<Needs>(id),
        world.agent_cell(id),
    ) else {
        return Vec::new();
    };
    let family = world.store.get::<Family>(id);
    let season = world.calendar.season();
    let winter = season == Season::Winter;
    let cold = needs.warmth < world.config.cold_threshold;

    let mut options: Vec<(LeisureActivity, PursuitTarget, f32)> = Vec::new();
    let venue = |activity: LeisureActivity,
                 kind: BuildingKind,
                 base: f32,
                 options: &mut Vec<(LeisureActivity, PursuitTarget, f32)>| {
        if let Some(b) = nearest_building(world, here, kind) {
            let heat = if cold && kind.is_heated() { 2.0 } else { 1.0 };
            options.push((activity, PursuitTarget::Building(b), base * heat));
        }
    };

    venue(Reading, BuildingKind::Library, 3.0, &mut options);
    venue(Chapel, BuildingKind::Chapel, 2.0, &mut options);
    venue(Bathing, BuildingKind::Bathhouse, 2.0, &mut options);
    if world.calendar.is_daytime() {
        venue(MarketBrowsing, BuildingKind::Market, 2.0, &mut options);
    }
    if world.calendar.is_evening() {
        let tavern = world
            .buildings
            .nearest(here, |b| b.kind == BuildingKind::Tavern && b.complete && b.is_staffed() && b.has_room_inside());
        if let Some(t) = tavern {
            options.push((Tavern, PursuitTarget::Building(t), if cold { 6.0 } else { 3.0 }));
        }
        options.push((Campfire, PursuitTarget::InPlace, if winter { 2.0 } else { 1.0 }));
    }

    if explore != here && world.grid.is_walkable(explore) {
        options.push((Exploring, PursuitTarget::Tile(explore), if winter { 0.5 } else { 2.0 }));
    }

    if let Some(partner) = family
        .and_then(|f| f.partner)
        .filter(|p| shares_home(world, id, *p) && is_awake(world, *p))
    {
        options.push((PartnerTime, PursuitTarget::Agent(partner), 3.0));
    }
    if let Some(workplace) = world
        .store
        .get::<Worker>(id)
        .and_then(|w| w.workplace)
        .filter(|b| world.buildings.is_complete(*b))
    {
        options.push((SkillPractice, PursuitTarget::Building(workplace), 1.0));
    }
    if !winter {
        if let Some(cell) = nearest_deposit(world, here, &[Deposit::Fish]) {
            options.push((RecreationalFishing, PursuitTarget::Tile(cell), 1.0));
        }
        if let Some(cell) = nearest_deposit(world, here, &[Deposit::Berries, Deposit::Mushrooms]) {
            options.push((Foraging, PursuitTarget::Tile(cell), 1.0));
        }
    }
    if let Some(cell) = nearest_deposit(world, here, &[Deposit::Wildlife]) {
        options.push((RecreationalHunting, PursuitTarget::Tile(cell), 1.0));
    }
    if let Some(home) = find_neighbor_home(world, id, here) {
        options.push((VisitNeighbor, PursuitTarget::Building(home), 2.0));
    }
    if needs.energy < 60.0 {
        options.push((Napping, PursuitTarget::InPlace, 2.0));
    }
    if let Some(mentee) = find_mentee(world, id, here) {
        options.push((Mentoring, PursuitTarget::Agent(mentee), 1.0));
    }
    if citizen.educated {
        let child = family
            .into_iter()
            .flat_map(|f| f.children.iter().copied())
            .find(|c| is_awake(world, *c));
        if let Some(child) = child {
            options.push((TeachingChild, PursuitTarget::Agent(child), 2.0));
        }
    }
    if world.calendar.is_night() && !winter {
        options.push((Stargazing, PursuitTarget::InPlace, 1.0));
    }
    if season == Season::Summer {
        if let Some(water) = nearest_water(world, here) {
            options.push((Swimming, PursuitTarget::Tile(water), 1.5));
        }
    }
    if matches!(season, Season::Spring | Season::Summer) {
        if let Some(home) = family.and_then(|f| f.home).filter(|h| world.buildings.is_complete(*h)) {
            options.push((Gardening, PursuitTarget::Building(home), 1.0));
        }
    }
    if let Some(sick) = find_sick(world, id, here) {
        options.push((ComfortingSick, PursuitTarget::Agent(sick), 2.0));
    }

    options
        .into_iter()
        .map(|(activity, target, base)| Candidate {
            activity,
            target,
            weight: base * trait_weight(citizen, activity),
        })
        .filter(|c| c.weight > 0.0)
        .collect()
}

/// Whether a pursuit's target still makes sense
fn target_valid(world: &World, id: EntityId, pursuit: &Pursuit) -> bool {
    match pursuit.target {
        PursuitTarget::Building(b) => match world.buildings.get(b) {
            Some(building) if building.complete => {
                pursuit.activity != LeisureActivity::Tavern || building.is_staffed()
            }
            _ => false,
        },
        PursuitTarget::Agent(other) => other != id && world.store.contains(other) && is_awake(world, other),
        PursuitTarget::Tile(cell) => match pursuit.activity {
            LeisureActivity::RecreationalFishing => world.grid.resource(cell, Deposit::Fish) > 0,
            LeisureActivity::RecreationalHunting => world.grid.resource(cell, Deposit::Wildlife) > 0,
            LeisureActivity::Foraging => {
                world.grid.resource(cell, Deposit::Berries) + world.grid.resource(cell, Deposit::Mushrooms) > 0
            }
            LeisureActivity::Swimming => world.grid.terrain(cell) == Some(Terrain::Water),
            _ => world.grid.is_walkable(cell),
        },
        PursuitTarget::InPlace => true,
    }
}

fn abandon(world: &mut World, id: EntityId) {
    exit_building(world, id);
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.pursuit = None;
        citizen.set_activity("idle");
    }
}

fn store_pursuit(world: &mut World, id: EntityId, pursuit: Pursuit, activity_label: &str) {
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.pursuit = Some(pursuit);
        citizen.set_activity(activity_label);
    }
}

/// Move an active pursuit forward by one evaluation; false when there is
/// none or it had to be dropped
pub fn advance_pursuit(world: &mut World, id: EntityId) -> bool {
    let Some(mut pursuit) = world.store.get::<Citizen>(id).and_then(|c| c.pursuit) else {
        return false;
    };
    if !target_valid(world, id, &pursuit) {
        debug!("agent {} dropped {:?}: target gone", id, pursuit.activity);
        abandon(world, id);
        return false;
    }

    match pursuit.stage {
        PursuitStage::Travelling => {
            let approach = match pursuit.target {
                PursuitTarget::Building(b) => approach_building(world, id, b),
                PursuitTarget::Agent(other) => match world.agent_cell(other) {
                    Some(cell) => approach_cell(world, id, cell, true),
                    None => Approach::Unreachable,
                },
                PursuitTarget::Tile(cell) => {
                    let adjacent_ok = !world.grid.is_walkable(cell);
                    approach_cell(world, id, cell, adjacent_ok)
                }
                PursuitTarget::InPlace => Approach::Arrived,
            };
            match approach {
                Approach::Arrived => {
                    if let PursuitTarget::Building(b) = pursuit.target {
                        if !enter_building(world, id, b) {
                            abandon(world, id);
                            return false;
                        }
                    }
                    pursuit.stage = PursuitStage::Performing { remaining: reward(pursuit.activity).duration };
                    store_pursuit(world, id, pursuit, label(pursuit.activity));
                    true
                }
                Approach::EnRoute => {
                    store_pursuit(world, id, pursuit, "heading out");
                    true
                }
                Approach::Unreachable => {
                    abandon(world, id);
                    false
                }
            }
        }
        PursuitStage::Performing { remaining } => {
            // Company that wandered off has to be caught up with again
            if let PursuitTarget::Agent(other) = pursuit.target {
                let close = world
                    .agent_cell(other)
                    .zip(world.agent_cell(id))
                    .map(|(a, b)| a.chebyshev(&b) <= 1)
                    .unwrap_or(false);
                if !close {
                    pursuit.stage = PursuitStage::Travelling;
                    store_pursuit(world, id, pursuit, "heading out");
                    return true;
                }
            }
            let left = remaining.saturating_sub(world.config.ai_interval as u32);
            if left > 0 {
                pursuit.stage = PursuitStage::Performing { remaining: left };
                store_pursuit(world, id, pursuit, label(pursuit.activity));
            } else {
                complete(world, id, pursuit);
            }
            true
        }
    }
}

fn adjust(world: &mut World, id: EntityId, need: NeedType, amount: f32) {
    if let Some(needs) = world.store.get_mut::<Needs>(id) {
        needs.adjust(need, amount);
    }
}

fn grant_xp(world: &mut World, id: EntityId, xp: u32) {
    let level_up = world.store.get_mut::<Worker>(id).and_then(|w| {
        let skill = w.profession.skill();
        w.grant_xp(skill, xp).map(|level| (skill, level))
    });
    if let Some((skill, level)) = level_up {
        world.emit(SimulationEvent::SkillLevelUp { agent: id, skill, level });
    }
}

/// Take one unit from a tile for the settlement, if there is room
fn take_one(world: &mut World, cell: Cell, kinds: &[(Deposit, FoodKind)]) {
    if world.storage.is_storage_full() {
        return;
    }
    for (deposit, food) in kinds {
        if world.grid.deplete(cell, *deposit, 1) > 0 {
            world.storage.add_resource(ResourceKind::Food(*food), 1);
            return;
        }
    }
}

fn complete(world: &mut World, id: EntityId, pursuit: Pursuit) {
    use LeisureActivity::*;
    let reward = reward(pursuit.activity);
    let modifier = world.store.get::<Citizen>(id).map(|c| c.social_happiness_modifier()).unwrap_or(1.0);
    let happiness = if reward.social { reward.happiness * modifier } else { reward.happiness };
    adjust(world, id, NeedType::Happiness, happiness);

    match (pursuit.activity, pursuit.target) {
        (Napping, _) => adjust(world, id, NeedType::Energy, 15.0),
        (Bathing, _) => {
            adjust(world, id, NeedType::Health, 5.0);
            adjust(world, id, NeedType::Warmth, 10.0);
        }
        (Campfire, _) => adjust(world, id, NeedType::Warmth, 8.0),
        (Swimming, _) => adjust(world, id, NeedType::Warmth, -5.0),
        (Reading, _) => {
            if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
                citizen.education = (citizen.education + 1.0).min(100.0);
            }
        }
        (SkillPractice, _) => grant_xp(world, id, PRACTICE_XP),
        (Mentoring, PursuitTarget::Agent(mentee)) => grant_xp(world, mentee, MENTOR_XP),
        (TeachingChild, PursuitTarget::Agent(child)) => {
            if let Some(c) = world.store.get_mut::<Citizen>(child) {
                c.education = (c.education + 5.0).min(100.0);
            }
        }
        (PartnerTime | ComfortingSick, PursuitTarget::Agent(other)) => {
            adjust(world, other, NeedType::Happiness, happiness / 2.0);
        }
        (RecreationalFishing, PursuitTarget::Tile(cell)) => {
            if world.rng.gen_bool(0.5) {
                take_one(world, cell, &[(Deposit::Fish, FoodKind::Fish)]);
            }
        }
        (RecreationalHunting, PursuitTarget::Tile(cell)) => {
            if world.rng.gen_bool(0.3) {
                take_one(world, cell, &[(Deposit::Wildlife, FoodKind::Venison)]);
            }
        }
        (Foraging, PursuitTarget::Tile(cell)) => {
            take_one(
                world,
                cell,
                &[(Deposit::Berries, FoodKind::Berries), (Deposit::Mushrooms, FoodKind::Mushrooms)],
            );
        }
        _ => {}
    }

    if reward.social {
        let now = world.current_tick();
        if let Some(needs) = world.store.get_mut::<Needs>(id) {
            needs.last_social = now;
        }
    }

    exit_building(world, id);
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.pursuit = None;
        citizen.leisure_cooldown = LEISURE_COOLDOWN;
        citizen.set_activity("idle");
    }
    debug!("agent {} finished {:?}", id, pursuit.activity);
    world.emit(SimulationEvent::LeisureCompleted { agent: id, activity: pursuit.activity });
}

/// Count the cooldown down by one evaluation
pub fn tick_cooldown(world: &mut World, id: EntityId) {
    let step = world.config.ai_interval as u32;
    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.leisure_cooldown = citizen.leisure_cooldown.saturating_sub(step);
    }
}

/// Roll for leisure and start a weighted pick from the menu
pub fn try_leisure(world: &mut World, id: EntityId) -> bool {
    let cooling = world.store.get::<Citizen>(id).map(|c| c.leisure_cooldown > 0).unwrap_or(true);
    if cooling || world.rng.gen::<f32>() >= world.config.leisure_chance {
        return false;
    }
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let reach = world.config.wander_radius.max(1) * 2;
    let explore = here.offset(world.rng.gen_range(-reach..=reach), world.rng.gen_range(-reach..=reach));
    let candidates = menu(world, id, explore);
    let Ok(dist) = WeightedIndex::new(candidates.iter().map(|c| c.weight)) else {
        return false;
    };
    let pick = candidates[dist.sample(&mut world.rng)];
    debug!("agent {} chose {:?}", id, pick.activity);
    store_pursuit(world, id, Pursuit::new(pick.activity, pick.target), "heading out");
    advance_pursuit(world, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::Facing;
    use crate::core::config::SimulationConfig;
    use crate::entity::Sex;

    fn setup() -> (World, EntityId) {
        let mut world = World::new(40, 40, SimulationConfig::default());
        world.config.leisure_chance = 1.0;
        let c = Citizen::new("Lea", "Test", 30, Sex::Female, &[]).unwrap();
        let id = world.spawn_citizen(c, Cell::new(5, 5));
        (world, id)
    }

    #[test]
    fn test_library_pursuit_runs_to_completion() {
        let (mut world, id) = setup();
        let library = world
            .place_building(BuildingKind::Library, Cell::new(6, 6), Facing::South, true)
            .unwrap();
        let pursuit = Pursuit::new(LeisureActivity::Reading, PursuitTarget::Building(library));
        store_pursuit(&mut world, id, pursuit, "heading out");

        assert!(advance_pursuit(&mut world, id));
        assert_eq!(world.store.get::<Citizen>(id).unwrap().inside, Some(library));

        let evaluations = reward(LeisureActivity::Reading).duration / world.config.ai_interval as u32;
        for _ in 0..evaluations {
            assert!(advance_pursuit(&mut world, id));
        }
        let citizen = world.store.get::<Citizen>(id).unwrap();
        assert!(citizen.pursuit.is_none());
        assert!(citizen.inside.is_none());
        assert_eq!(citizen.leisure_cooldown, LEISURE_COOLDOWN);
        assert!(world.events.contains(&SimulationEvent::LeisureCompleted {
            agent: id,
            activity: LeisureActivity::Reading
        }));
    }

    #[test]
    fn test_removed_target_drops_pursuit() {
        let (mut world, id) = setup();
        let chapel = world
            .place_building(BuildingKind::Chapel, Cell::new(20, 20), Facing::South, true)
            .unwrap();
        store_pursuit(&mut world, id, Pursuit::new(LeisureActivity::Chapel, PursuitTarget::Building(chapel)), "x");
        assert!(advance_pursuit(&mut world, id));

        world.remove_building(chapel);
        assert!(!advance_pursuit(&mut world, id));
        assert!(world.store.get::<Citizen>(id).unwrap().pursuit.is_none());
    }

    #[test]
    fn test_cold_doubles_heated_venue_weight() {
        let (mut world, id) = setup();
        world
            .place_building(BuildingKind::Library, Cell::new(10, 10), Facing::South, true)
            .unwrap();
        let here = Cell::new(5, 5);
        let warm = menu(&world, id, here)
            .into_iter()
            .find(|c| c.activity == LeisureActivity::Reading)
            .unwrap()
            .weight;
        world.store.get_mut::<Needs>(id).unwrap().warmth = 10.0;
        let cold = menu(&world, id, here)
            .into_iter()
            .find(|c| c.activity == LeisureActivity::Reading)
            .unwrap()
            .weight;
        assert_eq!(cold, warm * 2.0);
    }

    #[test]
    fn test_partner_time_needs_a_shared_home() {
        let (mut world, id) = setup();
        let partner = world.spawn_citizen(Citizen::new("Tam", "Test", 31, Sex::Male, &[]).unwrap(), Cell::new(6, 5));
        world.store.get_mut::<Family>(id).unwrap().partner = Some(partner);
        world.store.get_mut::<Family>(partner).unwrap().partner = Some(id);
        let ours = world
            .place_building(BuildingKind::House, Cell::new(10, 2), Facing::South, true)
            .unwrap();
        let theirs = world
            .place_building(BuildingKind::House, Cell::new(16, 2), Facing::South, true)
            .unwrap();
        let here = Cell::new(5, 5);
        let offered = |world: &World| {
            menu(world, id, here)
                .iter()
                .any(|c| c.activity == LeisureActivity::PartnerTime)
        };

        // Homeless couple
        assert!(!offered(&world));

        world.set_home(id, ours).unwrap();
        world.set_home(partner, theirs).unwrap();
        assert!(!offered(&world));

        world.set_home(partner, ours).unwrap();
        assert!(offered(&world));
    }

    #[test]
    fn test_traits_shift_weights() {
        let social = Citizen::new("A", "B", 30, Sex::Male, &[Trait::Sociable]).unwrap();
        let shy = Citizen::new("C", "D", 30, Sex::Male, &[Trait::Shy]).unwrap();
        assert!(trait_weight(&social, LeisureActivity::VisitNeighbor) > trait_weight(&shy, LeisureActivity::VisitNeighbor));
        assert_eq!(trait_weight(&social, LeisureActivity::Reading), 1.0);
    }

    #[test]
    fn test_cooldown_blocks_new_pick() {
        let (mut world, id) = setup();
        world.store.get_mut::<Citizen>(id).unwrap().leisure_cooldown = 20;
        assert!(!try_leisure(&mut world, id));
        tick_cooldown(&mut world, id);
        tick_cooldown(&mut world, id);
        assert_eq!(world.store.get::<Citizen>(id).unwrap().leisure_cooldown, 0);
    }

    #[test]
    fn test_try_leisure_picks_something() {
        let (mut world, id) = setup();
        world.store.get_mut::<Needs>(id).unwrap().energy = 30.0;
        assert!(try_leisure(&mut world, id));
        assert!(world.store.get::<Citizen>(id).unwrap().pursuit.is_some());
    }
}
