//! Roulette table autoplay
//!
//! Plays rounds with a betting strategy on a single table. History and
//! statistics follow the table's events and are kept in a snapshot file so the
//! next run resumes the same bankroll.

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use roulette_table::config::{generate_sample_config, ConfigLoader};
use roulette_table::engine::layout;
use roulette_table::records::{RoundHistory, SnapshotStore, TableSnapshot, TableStats};
use roulette_table::{BetCategory, Pocket, RoundReport, TableController, TableEvent, WheelKind};
use std::collections::BTreeSet;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roulette")]
#[command(about = "Single-table roulette with autoplay strategies", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Number of rounds to play
    #[arg(short, long, default_value = "10")]
    rounds: u32,

    /// Betting strategy
    #[arg(short, long, value_enum, default_value = "red")]
    strategy: Strategy,

    /// Play on the American (double zero) wheel
    #[arg(long)]
    american: bool,

    /// Start a new game with this balance instead of resuming
    #[arg(long)]
    balance: Option<u64>,

    /// Base stake per bet; defaults to the table's default chip
    #[arg(long)]
    stake: Option<u64>,

    /// Number backed by the straight and repeat strategies
    #[arg(long, default_value = "17")]
    number: u8,

    /// Skip the spin animation
    #[arg(long)]
    reduced_motion: bool,

    /// Discard any saved game
    #[arg(long)]
    fresh: bool,

    /// Write a sample configuration file and exit
    #[arg(long)]
    generate_config: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Flat stake on red
    Red,
    /// Flat stake straight up on one number
    Straight,
    /// Red, doubling the stake after every loss
    Martingale,
    /// First and second dozen
    Dozens,
    /// A random legal spot each round
    Random,
    /// Red plus a straight bet, then repeat the previous round
    Repeat,
}

struct Autoplay {
    strategy: Strategy,
    base: u64,
    stake: u64,
    number: Pocket,
    rng: StdRng,
}

impl Autoplay {
    fn new(strategy: Strategy, base: u64, number: Pocket) -> Self {
        Self {
            strategy,
            base,
            stake: base,
            number,
            rng: StdRng::from_entropy(),
        }
    }

    /// Put this round's bets on the table. Returns false if nothing could be placed.
    fn place(&mut self, table: &mut TableController) -> bool {
        let red = layout::outside_targets(BetCategory::Red).unwrap_or_default();
        match self.strategy {
            Strategy::Red => {
                place_stake(table, BetCategory::Red, &red, self.base);
            }
            Strategy::Straight => {
                place_stake(table, BetCategory::Straight, &layout::straight(self.number), self.base);
            }
            Strategy::Martingale => {
                if self.stake > table.session().available_balance() {
                    info!("Martingale stake {} not covered, dropping back to {}", self.stake, self.base);
                    self.stake = self.base;
                }
                place_stake(table, BetCategory::Red, &red, self.stake);
            }
            Strategy::Dozens => {
                for index in 0..2 {
                    if let Some(targets) = layout::dozen(index) {
                        place_stake(table, BetCategory::Dozen, &targets, self.base);
                    }
                }
            }
            Strategy::Random => {
                let wheel = table.wheel();
                let spot = BetCategory::ALL.choose(&mut self.rng).and_then(|category| {
                    layout::legal_spots(*category, wheel)
                        .choose(&mut self.rng)
                        .map(|targets| (*category, targets.clone()))
                });
                if let Some((category, targets)) = spot {
                    place_stake(table, category, &targets, self.base);
                }
            }
            Strategy::Repeat => {
                if table.session().last_round_bets().is_empty() || !table.repeat_bets() {
                    place_stake(table, BetCategory::Red, &red, self.base);
                    place_stake(table, BetCategory::Straight, &layout::straight(self.number), self.base);
                }
            }
        }
        !table.session().active_bets().is_empty()
    }

    fn observe(&mut self, report: &RoundReport) {
        if self.strategy == Strategy::Martingale {
            self.stake = if report.total_win() > 0 {
                self.base
            } else {
                self.stake.saturating_mul(2)
            };
        }
    }
}

/// Stack table chips, largest first, until `amount` is on the spot.
fn place_stake(table: &mut TableController, category: BetCategory, targets: &BTreeSet<Pocket>, amount: u64) -> bool {
    let mut chips = table.chips().to_vec();
    chips.sort_unstable_by(|a, b| b.cmp(a));

    let mut remaining = amount;
    let mut placed = false;
    for chip in chips {
        while remaining >= chip {
            if table.select_chip(chip).is_err() || !table.place_bet(category, targets.iter().copied()) {
                return placed;
            }
            remaining -= chip;
            placed = true;
        }
    }
    placed
}

/// Follows table events, keeping history, stats and the snapshot current.
async fn record_rounds(
    mut events: broadcast::Receiver<TableEvent>,
    mut history: RoundHistory,
    mut stats: TableStats,
    store: Option<SnapshotStore>,
    wheel: WheelKind,
) -> (RoundHistory, TableStats) {
    loop {
        match events.recv().await {
            Ok(TableEvent::RoundSettled(report)) => {
                history.record(&report);
                stats.record(&report);
                if let Some(store) = &store {
                    let snapshot = TableSnapshot::new(wheel, report.balance(), history.clone(), stats.clone());
                    if let Err(e) = store.save(&snapshot) {
                        warn!("Failed to save snapshot: {}", e);
                    }
                }
            }
            Ok(TableEvent::NewGame { balance }) => {
                info!("New game with balance {}, resetting records", balance);
                history.clear();
                stats = TableStats::new();
                if let Some(store) = &store {
                    if let Err(e) = store.clear() {
                        warn!("Failed to clear snapshot: {}", e);
                    }
                }
            }
            Ok(TableEvent::Bankrupt) => warn!("Bankrupt"),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!("Recorder fell behind, {} events skipped", skipped),
            Err(RecvError::Closed) => break,
        }
    }
    (history, stats)
}

/// Stand-in renderer: traces every frame the scheduler publishes.
async fn trace_frames(mut poses: watch::Receiver<roulette_table::engine::WheelPose>) {
    while poses.changed().await.is_ok() {
        let pose = *poses.borrow_and_update();
        trace!("wheel {:>9.2}° ball {:>9.2}°", pose.wheel_angle, pose.ball_angle);
    }
}

fn print_round(round: u32, report: &RoundReport) {
    println!(
        "Round {:>3}: {:>2} {:<5}  wagered {:>6}  returned {:>7}  balance {:>8}",
        round,
        report.outcome,
        report.color,
        report.total_wagered(),
        report.total_win(),
        report.balance()
    );
}

fn print_summary(balance: u64, history: &RoundHistory, stats: &TableStats) {
    println!();
    println!("Balance:         {}", balance);
    println!("Rounds:          {} ({} won, {} lost, {} pushed)", stats.rounds, stats.wins, stats.losses, stats.pushes);
    println!("Wagered:         {}", stats.total_wagered);
    println!("Returned:        {}", stats.total_returned);
    if let Some(rtp) = stats.return_to_player() {
        println!("Return to player {:.2}%", rtp * 100.0);
    }
    println!("Biggest win:     {}", stats.biggest_win);
    println!("Longest streaks: {} won, {} lost", stats.longest_win_streak, stats.longest_loss_streak);
    if let Some((pocket, count)) = stats.hottest_pocket() {
        println!("Hottest pocket:  {} ({} times)", pocket, count);
    }
    let recent: Vec<String> = history.recent_outcomes(10).iter().map(|p| p.to_string()).collect();
    if !recent.is_empty() {
        println!("Recent results:  {}", recent.join(" "));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = args.generate_config.as_deref() {
        generate_sample_config(path)?;
        println!("Sample configuration written to {}", path);
        return Ok(());
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if args.american {
        config.table.wheel = WheelKind::American;
    }
    if args.reduced_motion {
        config.animation.reduced_motion = true;
    }
    if let Some(balance) = args.balance {
        config.table.initial_balance = balance;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_filter())),
        )
        .init();

    let number = Pocket::number(args.number).ok_or_else(|| format!("{} is not a pocket number", args.number))?;
    let wheel = config.table.wheel;

    let store = config
        .storage
        .persist
        .then(|| SnapshotStore::new(&config.storage.snapshot_path));
    let fresh = args.fresh || args.balance.is_some();
    let restored = match &store {
        Some(store) if fresh => {
            store.clear()?;
            None
        }
        Some(store) => store.load()?.filter(|snapshot| {
            if snapshot.wheel != wheel {
                warn!("Saved game is on the {} wheel, starting fresh on {}", snapshot.wheel, wheel);
                return false;
            }
            snapshot.balance > 0
        }),
        None => None,
    };

    let (balance, history, stats) = match restored {
        Some(snapshot) => {
            info!("Resuming saved game from {} with balance {}", snapshot.saved_at, snapshot.balance);
            (snapshot.balance, snapshot.history, snapshot.stats)
        }
        None => (
            config.table.initial_balance,
            RoundHistory::new(config.table.history_capacity),
            TableStats::new(),
        ),
    };

    let mut table = TableController::with_balance(&config, balance)?;
    let recorder = tokio::spawn(record_rounds(table.subscribe(), history, stats, store, wheel));
    tokio::spawn(trace_frames(table.subscribe_poses()));

    println!("{} wheel, balance {}, strategy {:?}", wheel, balance, args.strategy);
    let mut autoplay = Autoplay::new(args.strategy, args.stake.unwrap_or(config.table.default_chip), number);
    for round in 1..=args.rounds {
        if table.is_halted() {
            println!("Bankrupt. Run again with --fresh to start a new game.");
            break;
        }
        if !autoplay.place(&mut table) {
            println!("Balance {} cannot cover the next wager", table.session().balance());
            break;
        }
        let report = table.play_round().await?;
        print_round(round, &report);
        autoplay.observe(&report);
    }

    let balance = table.session().balance();
    drop(table);
    let (history, stats) = recorder.await?;
    print_summary(balance, &history, &stats);

    Ok(())
}
