use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use titan_tactics::card::CardDatabase;
use titan_tactics::config::EngineConfig;
use titan_tactics::game::{builtin_map, GameSetup, MAP_COUNT};
use titan_tactics::rng::GameRng;
use titan_tactics::simulation::deck::parse_deck_file;
use titan_tactics::simulation::engine::{run_game, GameResult};

#[derive(Parser)]
#[command(name = "titan-tactics")]
#[command(about = "Titan Tactics headless match runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Card catalog to use instead of the built-in one
    #[arg(long, global = true)]
    cards: Option<String>,

    /// Engine log detail on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Args)]
struct MatchArgs {
    /// Titan for player 1
    #[arg(long, default_value = "pyra")]
    p1: String,

    /// Titan for player 2
    #[arg(long, default_value = "thalassa")]
    p2: String,

    /// Map index; rotates through the built-in maps when omitted
    #[arg(short, long)]
    map: Option<usize>,

    /// Deck file for player 1 (defaults to the titan's deck)
    #[arg(long)]
    deck1: Option<String>,

    /// Deck file for player 2 (defaults to the titan's deck)
    #[arg(long)]
    deck2: Option<String>,

    /// Seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a batch of headless matches in parallel
    Run {
        /// Number of games to simulate
        #[arg(short, long, default_value = "1000")]
        num_games: usize,

        #[command(flatten)]
        args: MatchArgs,
    },

    /// Play one match and print its log
    Play {
        #[command(flatten)]
        args: MatchArgs,
    },

    /// List the cards and titans in the catalog
    Cards,

    /// Show the built-in maps
    Maps,
}

/// Writes engine log records to stderr
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbosity: u8) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_for(verbosity));
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db = match &cli.cards {
        Some(path) => CardDatabase::from_file(path),
        None => CardDatabase::builtin(),
    };
    let db = db.and_then(|db| {
        db.validate()?;
        Ok(db)
    });
    let db = match db {
        Ok(db) => {
            eprintln!("✓ Loaded {} cards", db.card_count());
            Arc::new(db)
        }
        Err(e) => {
            eprintln!("✗ Failed to load cards: {}", e);
            std::process::exit(1);
        }
    };

    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => {
                eprintln!("✓ Loaded config from {}", path);
                config
            }
            Err(e) => {
                eprintln!("✗ Failed to load config '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Run { num_games, args } => run_simulation(db, &config, &args, num_games),
        Commands::Play { args } => play_one(db, &config, &args),
        Commands::Cards => list_cards(&db),
        Commands::Maps => list_maps(),
    }
}

fn load_decks(db: &CardDatabase, args: &MatchArgs) -> (Vec<String>, Vec<String>) {
    let load = |path: &Option<String>| match path {
        Some(path) => match parse_deck_file(path, db) {
            Ok(deck) => deck,
            Err(e) => {
                eprintln!("✗ Failed to parse deck file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => Vec::new(),
    };
    (load(&args.deck1), load(&args.deck2))
}

fn setup_for(args: &MatchArgs, decks: &(Vec<String>, Vec<String>), game: usize) -> GameSetup {
    let map = args.map.unwrap_or(game % MAP_COUNT);
    GameSetup::new(&args.p1, &args.p2)
        .map(map)
        .decks(decks.0.clone(), decks.1.clone())
}

fn play_one(db: Arc<CardDatabase>, config: &EngineConfig, args: &MatchArgs) {
    let decks = load_decks(&db, args);
    let seed = args.seed.unwrap_or_else(|| GameRng::new(None).seed());
    println!("\n=== {} vs {} ===\n", args.p1, args.p2);
    if let Err(e) = run_game(db, config, setup_for(args, &decks, 0), seed, true) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run_simulation(db: Arc<CardDatabase>, config: &EngineConfig, args: &MatchArgs, num_games: usize) {
    let decks = load_decks(&db, args);
    let base_seed = args.seed.unwrap_or_else(|| GameRng::new(None).seed());

    println!("\n=== Titan Tactics Simulator ===\n");
    println!("Matchup: {} vs {}", args.p1, args.p2);
    println!("Games: {}", num_games);
    println!("Seed: {}", base_seed);
    println!();

    let progress = ProgressBar::new(num_games as u64);
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} games ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);

    let start = std::time::Instant::now();
    let results: Result<Vec<GameResult>, _> = (0..num_games)
        .into_par_iter()
        .map(|i| {
            let result = run_game(
                db.clone(),
                config,
                setup_for(args, &decks, i),
                base_seed.wrapping_add(i as u64),
                false,
            );
            progress.inc(1);
            result
        })
        .collect();
    progress.finish_and_clear();
    let elapsed = start.elapsed();

    let results = match results {
        Ok(results) => results,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let mut wins = [0usize; 2];
    let mut turn_dist: HashMap<u32, usize> = HashMap::new();
    for r in &results {
        if let Some(winner) = r.winner {
            wins[winner] += 1;
            *turn_dist.entry(r.turns).or_insert(0) += 1;
        }
    }
    let decided = wins[0] + wins[1];
    let avg_turns = if decided > 0 {
        results
            .iter()
            .filter(|r| r.winner.is_some())
            .map(|r| r.turns as f64)
            .sum::<f64>()
            / decided as f64
    } else {
        0.0
    };

    println!("=== Results ===\n");
    for (player, titan) in [&args.p1, &args.p2].iter().enumerate() {
        let rate = wins[player] as f64 / num_games as f64;
        println!(
            "P{} {:10} win rate: {:.1}% ({}/{})",
            player + 1,
            titan,
            rate * 100.0,
            wins[player],
            num_games
        );
    }
    println!("Average game length: {:.2} turns", avg_turns);
    println!();

    println!("Turn distribution:");
    let mut turns: Vec<_> = turn_dist.iter().collect();
    turns.sort_by_key(|(t, _)| *t);
    for (turn, count) in turns {
        let pct = *count as f64 / num_games as f64 * 100.0;
        let bar = "█".repeat((pct / 2.0) as usize);
        println!("  Turn {:2}: {:5.1}% {} ({})", turn, pct, bar, count);
    }

    let draws = num_games - decided;
    if draws > 0 {
        let pct = draws as f64 / num_games as f64 * 100.0;
        println!("  Draw:    {:5.1}% ({})", pct, draws);
    }

    println!();
    println!(
        "Simulation completed in {:.2?} ({:.0} games/sec)",
        elapsed,
        num_games as f64 / elapsed.as_secs_f64()
    );
}

fn list_cards(db: &CardDatabase) {
    println!("\n=== Titans ===\n");
    for titan in db.titans() {
        println!(
            "  {:10} {:3} hp  {:?}  active ({}): {}",
            titan.id, titan.hp, titan.element, titan.active_cost, titan.active
        );
    }

    println!("\n=== Cards ===\n");
    let mut cards: Vec<_> = db.cards().filter(|c| !c.token).collect();
    cards.sort_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.id.cmp(&b.id)));
    for card in cards {
        if card.is_spell() {
            println!("  [{:2}] {:20} spell  {}", card.cost, card.name, card.description);
        } else {
            let keywords: Vec<&str> = card.keywords.iter().map(|k| k.name()).collect();
            println!(
                "  [{:2}] {:20} {}/{}  {}",
                card.cost,
                card.name,
                card.atk,
                card.hp,
                keywords.join(", ")
            );
        }
    }
}

fn list_maps() {
    for index in 0..MAP_COUNT {
        if let Some(map) = builtin_map(index) {
            println!("\n[{}] {}\n{}", index, map.name, map.render());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }

    #[test]
    fn test_logger_installs_once() {
        init_logging(0);
        assert!(log::log_enabled!(Level::Warn));
        assert!(!log::log_enabled!(Level::Info));
        assert!(log::set_logger(&LOGGER).is_err());
    }

    #[test]
    fn test_verbose_flag_counts() {
        let cli = Cli::try_parse_from(["titan-tactics", "-vv", "maps"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Maps));
    }
}
