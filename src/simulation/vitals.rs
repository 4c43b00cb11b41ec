//! Per-tick drift of needs: hunger, fatigue, cold and mood

use crate::core::calendar::Season;
use crate::ecs::world::World;
use crate::entity::needs::NeedType;
use crate::spatial::tilemap::Deposit;

/// Warmth regained per tick under any roof, heated or not
const SHELTER_WARMTH: f32 = 0.02;

/// Apply one tick of need drift to every agent
pub fn vitals_step(world: &mut World) {
    let cfg = &world.config;
    let chill = world.calendar.season().chill();

    for (id, needs) in world.store.needs.iter_mut() {
        let Some(citizen) = world.store.citizens.get(id) else {
            continue;
        };

        needs.adjust(NeedType::Food, -cfg.food_decay);
        if needs.food <= 0.0 {
            needs.adjust(NeedType::Health, -cfg.starvation_damage);
        }

        if citizen.sleeping {
            needs.adjust(NeedType::Energy, cfg.sleep_energy_recovery);
        } else {
            needs.adjust(NeedType::Energy, -cfg.energy_decay);
        }

        let shelter = citizen.inside.and_then(|b| world.buildings.get(b));
        let warmth_delta = match shelter {
            Some(b) if b.kind.is_heated() => cfg.heated_warmth_gain,
            Some(_) => SHELTER_WARMTH,
            // Mild seasons slowly warm people back up
            None => -cfg.warmth_decay_winter * (chill - 0.25),
        };
        needs.adjust(NeedType::Warmth, warmth_delta);

        needs.adjust(NeedType::Happiness, -cfg.happiness_decay);
    }
}

/// Once per day, renewable deposits grow back. Plants stay dormant in winter.
pub fn daily_regrowth(world: &mut World) {
    let winter = world.calendar.season() == Season::Winter;
    for kind in Deposit::ALL.into_iter().filter(|d| d.is_renewable()) {
        let plant = matches!(kind, Deposit::Berries | Deposit::Mushrooms | Deposit::Herbs);
        if winter && plant {
            continue;
        }
        world.grid.regrow(kind, 1);
    }
}
