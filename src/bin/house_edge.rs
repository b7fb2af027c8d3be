//! Monte Carlo return-to-player per bet category
//!
//! Draws outcomes through the spin scheduler and settles one unit on a spot of
//! every category each spin, then compares the measured return with the
//! theoretical one (36 / pockets on every category).

use clap::Parser;
use roulette_table::config::AnimationConfig;
use roulette_table::engine::layout;
use roulette_table::engine::resolver::resolve;
use roulette_table::{Bet, BetCategory, SpinScheduler, WheelKind};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "house-edge")]
#[command(about = "Measure return-to-player for every bet category", long_about = None)]
struct Args {
    /// Number of spins to simulate
    #[arg(short, long, default_value = "1000000")]
    spins: u64,

    /// Simulate the American (double zero) wheel
    #[arg(long)]
    american: bool,

    /// Units wagered per bet per spin
    #[arg(long, default_value = "1")]
    unit: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let wheel = if args.american {
        WheelKind::American
    } else {
        WheelKind::European
    };
    let unit = args.unit.max(1);

    // First legal spot of each category
    let bets: Vec<Bet> = BetCategory::ALL
        .iter()
        .filter_map(|&category| {
            layout::legal_spots(category, wheel)
                .into_iter()
                .next()
                .map(|targets| Bet::new(category, targets, unit))
        })
        .collect();

    let mut scheduler = SpinScheduler::new(
        wheel,
        AnimationConfig {
            reduced_motion: true,
            ..Default::default()
        },
    );

    info!("Simulating {} spins on the {} wheel", args.spins, wheel);
    let started = Instant::now();
    let mut returned = vec![0u64; bets.len()];
    let mut hits = vec![0u64; bets.len()];
    for _ in 0..args.spins {
        let outcome = scheduler.draw_outcome();
        scheduler.reset();
        let settlement = resolve(&bets, u64::MAX, outcome);
        for (i, bet) in settlement.bets.iter().enumerate() {
            returned[i] += bet.returned;
            hits[i] += u64::from(bet.won);
        }
    }
    let elapsed = started.elapsed();

    let wagered = (args.spins * unit) as f64;
    let theoretical = 36.0 / wheel.pocket_count() as f64;
    println!(
        "{:<10} {:<14} {:>10} {:>10} {:>10}",
        "category", "spot", "hit rate", "rtp", "expected"
    );
    for (i, bet) in bets.iter().enumerate() {
        let spot: Vec<String> = bet.targets.iter().take(4).map(|p| p.to_string()).collect();
        let spot = if bet.targets.len() > 4 {
            format!("{},…", spot.join(","))
        } else {
            spot.join(",")
        };
        println!(
            "{:<10} {:<14} {:>9.4}% {:>9.4}% {:>9.4}%",
            bet.category,
            spot,
            hits[i] as f64 / args.spins.max(1) as f64 * 100.0,
            returned[i] as f64 / wagered.max(1.0) * 100.0,
            theoretical * 100.0
        );
    }
    println!();
    println!(
        "House edge {:.4}% on every category, {} spins in {:.2?}",
        (1.0 - theoretical) * 100.0,
        args.spins,
        elapsed
    );

    Ok(())
}
