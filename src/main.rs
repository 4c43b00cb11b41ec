//! Hearthstead - entry point
//!
//! Builds the demonstration settlement, runs it for a number of ticks and
//! prints a summary of the final state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use hearthstead::city::stockpile::ResourceKind;
use hearthstead::core::calendar::Season;
use hearthstead::core::config::SimulationConfig;
use hearthstead::core::error::Result;
use hearthstead::ecs::world::World;
use hearthstead::entity::Needs;
use hearthstead::settlement;
use hearthstead::simulation::tick::run_tick_with_decisions;

/// Run a settlement simulation and report what happened
#[derive(Parser, Debug)]
#[command(name = "hearthstead")]
#[command(about = "Simulate a small settlement of citizens")]
struct Args {
    /// Random seed for reproducible runs (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 2400)]
    ticks: u64,

    /// Number of citizens in the settlement
    #[arg(long, default_value_t = 24)]
    citizens: usize,

    /// TOML file with simulation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct NeedAverages {
    food: f32,
    warmth: f32,
    energy: f32,
    happiness: f32,
    health: f32,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    ticks: u64,
    day: u64,
    season: Season,
    citizens: usize,
    total_food: u32,
    stock: BTreeMap<String, u32>,
    events: BTreeMap<&'static str, usize>,
    decisions: BTreeMap<String, usize>,
    needs: NeedAverages,
}

fn average_needs(world: &World) -> NeedAverages {
    let all: Vec<&Needs> = world.store.needs.values().collect();
    if all.is_empty() {
        return NeedAverages::default();
    }
    let n = all.len() as f32;
    let mean = |f: fn(&Needs) -> f32| all.iter().map(|x| f(x)).sum::<f32>() / n;
    NeedAverages {
        food: mean(|x| x.food),
        warmth: mean(|x| x.warmth),
        energy: mean(|x| x.energy),
        happiness: mean(|x| x.happiness),
        health: mean(|x| x.health),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hearthstead=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    tracing::info!("Hearthstead starting: seed {}, {} citizens, {} ticks", seed, args.citizens, args.ticks);
    let mut world = settlement::build(config, args.citizens)?;

    let mut events: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut decisions: BTreeMap<String, usize> = BTreeMap::new();
    for _ in 0..args.ticks {
        let (made, emitted) = run_tick_with_decisions(&mut world);
        for (_, decision) in made {
            *decisions.entry(format!("{:?}", decision)).or_default() += 1;
        }
        for event in emitted {
            *events.entry(event.kind()).or_default() += 1;
        }
    }

    let stock: BTreeMap<String, u32> = ResourceKind::all()
        .map(|kind| (format!("{:?}", kind), world.storage.amount(kind)))
        .filter(|(_, amount)| *amount > 0)
        .collect();

    let summary = Summary {
        seed,
        ticks: args.ticks,
        day: world.calendar.current_day(),
        season: world.calendar.season(),
        citizens: world.citizen_count(),
        total_food: world.storage.total_food(),
        stock,
        events,
        decisions,
        needs: average_needs(&world),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("\n=== HEARTHSTEAD ===");
    println!(
        "seed {} | {} ticks | day {} ({:?}) | {} citizens",
        summary.seed, summary.ticks, summary.day, summary.season, summary.citizens
    );
    println!();
    println!("Storage ({} food):", summary.total_food);
    for (kind, amount) in &summary.stock {
        println!("  {:<24} {}", kind, amount);
    }
    println!();
    println!("Events:");
    for (kind, count) in &summary.events {
        println!("  {:<24} {}", kind, count);
    }
    println!();
    println!("Decisions:");
    for (decision, count) in &summary.decisions {
        println!("  {:<24} {}", decision, count);
    }
    println!();
    let n = &summary.needs;
    println!(
        "Average needs: food {:.1}, warmth {:.1}, energy {:.1}, happiness {:.1}, health {:.1}",
        n.food, n.warmth, n.energy, n.happiness, n.health
    );
}
