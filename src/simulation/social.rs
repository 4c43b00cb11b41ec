//! Social handler - conversations, loneliness and tavern visits

use rand::Rng;
use tracing::debug;

use crate::city::building::BuildingKind;
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::citizen::Chat;
use crate::entity::needs::NeedType;
use crate::entity::{Citizen, LeisureActivity, Movement, Needs, Pursuit, PursuitTarget};
use crate::simulation::events::SimulationEvent;
use crate::simulation::leisure::advance_pursuit;

/// Count down an active conversation; true while it is still going
pub fn continue_chat(world: &mut World, id: EntityId) -> bool {
    let step = world.config.ai_interval as u32;
    let Some(chat) = world.store.get::<Citizen>(id).and_then(|c| c.chat) else {
        return false;
    };
    let partner_present = world.store.contains(chat.partner);
    let remaining = chat.remaining.saturating_sub(step);

    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        if remaining == 0 || !partner_present {
            citizen.chat = None;
            citizen.set_activity("idle");
            return false;
        }
        citizen.chat = Some(Chat { partner: chat.partner, remaining });
        citizen.set_activity("chatting");
    }
    true
}

/// Lose happiness after too long without company. Never counts as acting.
pub fn apply_loneliness(world: &mut World, id: EntityId) {
    let now = world.current_tick();
    let threshold = world.config.lonely_after_ticks;
    let penalty = world.config.loneliness_penalty;
    if let Some(needs) = world.store.get_mut::<Needs>(id) {
        if now.saturating_sub(needs.last_social) > threshold {
            needs.adjust(NeedType::Happiness, -penalty);
        }
    }
}

fn is_available(world: &World, id: EntityId) -> bool {
    let idle = world
        .store
        .get::<Movement>(id)
        .map(|m| !m.is_moving())
        .unwrap_or(false);
    world
        .store
        .get::<Citizen>(id)
        .map(|c| !c.is_child() && !c.sleeping && !c.is_chatting() && c.pursuit.is_none() && c.inside.is_none())
        .unwrap_or(false)
        && idle
}

/// Roll for a conversation with an idle adult close by
pub fn try_chat(world: &mut World, id: EntityId) -> bool {
    let Some(modifier) = world.store.get::<Citizen>(id).map(|c| c.chat_chance_modifier()) else {
        return false;
    };
    let chance = world.config.chat_chance * modifier;
    if world.rng.gen::<f32>() >= chance {
        return false;
    }

    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let radius = world.config.chat_radius;
    let partner = world
        .store
        .positions
        .iter()
        .filter(|(other, pos)| **other != id && pos.cell.chebyshev(&here) <= radius)
        .filter(|(other, _)| is_available(world, **other))
        .min_by_key(|(other, pos)| (pos.cell.chebyshev(&here), **other))
        .map(|(other, _)| *other);
    let Some(partner) = partner else {
        return false;
    };

    let duration = world.config.chat_duration;
    let base = world.config.chat_happiness;
    let now = world.current_tick();
    for (who, with) in [(id, partner), (partner, id)] {
        let modifier = world
            .store
            .get_mut::<Citizen>(who)
            .map(|c| {
                c.chat = Some(Chat { partner: with, remaining: duration });
                c.set_activity("chatting");
                c.social_happiness_modifier()
            })
            .unwrap_or(1.0);
        if let Some(needs) = world.store.get_mut::<Needs>(who) {
            needs.adjust(NeedType::Happiness, base * modifier);
            needs.last_social = now;
        }
    }

    debug!("agents {} and {} started chatting", id, partner);
    world.emit(SimulationEvent::ChatStarted { agent: id, partner });
    true
}

/// Evening roll to head for a staffed tavern
pub fn try_tavern(world: &mut World, id: EntityId) -> bool {
    if !world.calendar.is_evening() {
        return false;
    }
    let Some(here) = world.agent_cell(id) else {
        return false;
    };
    let Some(tavern) = world
        .buildings
        .nearest(here, |b| b.kind == BuildingKind::Tavern && b.complete && b.is_staffed())
    else {
        return false;
    };
    let modifier = world.store.get::<Citizen>(id).map(|c| c.chat_chance_modifier()).unwrap_or(1.0);
    if world.rng.gen::<f32>() >= world.config.tavern_chance * modifier {
        return false;
    }

    if let Some(citizen) = world.store.get_mut::<Citizen>(id) {
        citizen.pursuit = Some(Pursuit::new(LeisureActivity::Tavern, PursuitTarget::Building(tavern)));
    }
    advance_pursuit(world, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::Facing;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Cell;
    use crate::entity::Sex;

    fn setup() -> (World, EntityId, EntityId) {
        let mut world = World::new(30, 30, SimulationConfig::default());
        world.config.chat_chance = 1.0;
        let a = world.spawn_citizen(Citizen::new("Ana", "Test", 30, Sex::Female, &[]).unwrap(), Cell::new(5, 5));
        let b = world.spawn_citizen(Citizen::new("Ben", "Test", 30, Sex::Male, &[]).unwrap(), Cell::new(6, 6));
        (world, a, b)
    }

    #[test]
    fn test_chat_pairs_both_agents() {
        let (mut world, a, b) = setup();
        world.calendar.set_tick(500);
        assert!(try_chat(&mut world, a));
        assert_eq!(world.store.get::<Citizen>(a).unwrap().chat.map(|c| c.partner), Some(b));
        assert_eq!(world.store.get::<Citizen>(b).unwrap().chat.map(|c| c.partner), Some(a));
        assert_eq!(world.store.get::<Needs>(b).unwrap().last_social, 500);
    }

    #[test]
    fn test_chat_ends_after_duration() {
        let (mut world, a, _) = setup();
        assert!(try_chat(&mut world, a));
        let evaluations = world.config.chat_duration / world.config.ai_interval as u32;
        for _ in 0..evaluations - 1 {
            assert!(continue_chat(&mut world, a));
        }
        assert!(!continue_chat(&mut world, a));
        assert!(world.store.get::<Citizen>(a).unwrap().chat.is_none());
    }

    #[test]
    fn test_no_chat_with_sleeping_or_children() {
        let (mut world, a, b) = setup();
        world.store.get_mut::<Citizen>(b).unwrap().sleeping = true;
        let kid = world.spawn_citizen(Citizen::new("Kit", "Test", 6, Sex::Male, &[]).unwrap(), Cell::new(5, 6));
        assert!(!try_chat(&mut world, a));
        assert!(world.store.get::<Citizen>(kid).unwrap().chat.is_none());
    }

    #[test]
    fn test_loneliness_penalty() {
        let (mut world, a, _) = setup();
        world.calendar.set_tick(world.config.lonely_after_ticks + 10);
        let before = world.store.get::<Needs>(a).unwrap().happiness;
        apply_loneliness(&mut world, a);
        assert!(world.store.get::<Needs>(a).unwrap().happiness < before);
    }

    #[test]
    fn test_tavern_requires_staff_and_evening() {
        let (mut world, a, b) = setup();
        world.config.tavern_chance = 1.0;
        let tavern = world
            .place_building(BuildingKind::Tavern, Cell::new(15, 15), Facing::South, true)
            .unwrap();
        let evening = world.calendar.ticks_per_day() * 19 / 24 + 1;
        world.calendar.set_tick(evening);
        assert!(!try_tavern(&mut world, a));

        world.assign_worker(b, tavern, true).unwrap();
        world.calendar.set_tick(10);
        assert!(!try_tavern(&mut world, a));

        world.calendar.set_tick(evening);
        assert!(try_tavern(&mut world, a));
        let pursuit = world.store.get::<Citizen>(a).unwrap().pursuit.unwrap();
        assert_eq!(pursuit.activity, LeisureActivity::Tavern);
    }
}
