//! Benchmarks rendering and re-reading randomly generated logs
use clap::Parser;
use concise_rs::board::{Hex, BASE_BOARD};
use concise_rs::concise::action::{Building, CultTrack};
use concise_rs::concise::{
    generate_concise_log, parse_concise_log_strict, Action, GameSettings, LogItem, RoundStart,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Instant;

const FACTIONS: [&str; 5] = ["Witches", "Nomads", "Giants", "Cultists", "Engineers"];

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
    #[arg(short, long, default_value_t = 10)]
    episodes: usize,
    /// Rounds per generated log
    #[arg(short, long, default_value_t = 6)]
    rounds: u32,
    /// Actions per round
    #[arg(short, long, default_value_t = 200)]
    actions: usize,
    #[arg(short, long, default_value_t = 4)]
    player_count: usize,
    #[arg(short, long)]
    seed: Option<u64>,
    /// Write a JSON summary under reports/bench
    #[arg(long)]
    report: bool,
}

#[derive(Debug, Serialize)]
struct EpisodeResult {
    items: usize,
    lines: usize,
    generate_seconds: f64,
    parse_seconds: f64,
}

fn random_action<R: Rng>(rng: &mut R, hexes: &[Hex], player: &str, last_builder: Option<&str>) -> Action {
    let hex = hexes[rng.gen_range(0..hexes.len())];
    let player = player.to_string();
    match rng.gen_range(0..6) {
        0 => Action::TransformAndBuild {
            player,
            hex,
            target: None,
            build_dwelling: true,
        },
        1 => Action::Upgrade {
            player,
            hex,
            building: Building::TradingHouse,
        },
        2 => Action::CultAdvance {
            player,
            track: CultTrack::ALL[rng.gen_range(0..CultTrack::ALL.len())],
        },
        3 | 4 if last_builder.is_some_and(|builder| builder != player) => Action::AcceptLeech {
            player,
            from_player: last_builder.map(String::from),
            amount: 1,
            vp_cost: 0,
            explicit_amount: false,
        },
        _ => Action::Burn {
            player,
            amount: rng.gen_range(1..4),
        },
    }
}

fn random_log<R: Rng>(rng: &mut R, args: &Args) -> Vec<LogItem> {
    let players: Vec<String> = FACTIONS
        .iter()
        .take(args.player_count.clamp(1, FACTIONS.len()))
        .map(|player| player.to_string())
        .collect();
    let mut settings = GameSettings::default();
    settings.insert("Game", "Base");
    let hexes = BASE_BOARD.land_hexes();
    let mut items = vec![LogItem::GameSettings(settings)];
    for round in 1..=args.rounds {
        let mut turn_order = players.clone();
        turn_order.shuffle(rng);
        items.push(LogItem::RoundStart(RoundStart {
            round,
            turn_order: turn_order.clone(),
        }));
        let mut last_builder: Option<String> = None;
        for turn in 0..args.actions {
            let player = &turn_order[turn % turn_order.len()];
            let action = random_action(rng, &hexes, player, last_builder.as_deref());
            if action.may_trigger_leech() {
                last_builder = Some(player.clone());
            }
            items.push(LogItem::from(action));
        }
    }
    items
}

fn run_benchmark<R: Rng>(rng: &mut R, args: &Args) -> Option<EpisodeResult> {
    let items = random_log(rng, args);

    let start = Instant::now();
    let log = match generate_concise_log(&items) {
        Ok(log) => log,
        Err(err) => {
            log::error!("Generation failed: {}", err);
            return None;
        }
    };
    let generate_seconds = start.elapsed().as_secs_f64();

    let text = log.text();
    let start = Instant::now();
    let parsed = match parse_concise_log_strict(&text) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!("Generated log does not read back: {}", err);
            return None;
        }
    };
    let parse_seconds = start.elapsed().as_secs_f64();
    log::debug!("Parsed back {} of {} items", parsed.len(), items.len());

    println!(
        "{} items, {} lines: generated in {:.4} seconds, parsed in {:.4} seconds",
        items.len(),
        log.lines.len(),
        generate_seconds,
        parse_seconds
    );
    Some(EpisodeResult {
        items: items.len(),
        lines: log.lines.len(),
        generate_seconds,
        parse_seconds,
    })
}

fn write_report(results: &[EpisodeResult]) {
    let folder = "reports/bench";
    if let Err(err) = std::fs::create_dir_all(folder) {
        eprintln!("Failed to create reports folder {}: {}", folder, err);
        return;
    }
    let filename = format!(
        "{}/{}.json",
        folder,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    match serde_json::to_string_pretty(results) {
        Ok(serialized) => {
            if let Err(err) = std::fs::write(&filename, serialized) {
                eprintln!("Failed to write {}: {}", filename, err);
            } else {
                println!("Report written to {}", filename);
            }
        }
        Err(err) => eprintln!("Failed to serialize report: {}", err),
    }
}

fn main() {
    let args = Args::parse();
    println!(
        "===\nEpisodes: {}, Rounds: {}, Actions per round: {}, Players: {}",
        args.episodes, args.rounds, args.actions, args.player_count
    );
    println!("---");
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let results: Vec<EpisodeResult> = (0..args.episodes)
        .filter_map(|_| run_benchmark(&mut rng, &args))
        .collect();
    if results.is_empty() {
        return;
    }
    println!("---");
    let total_items: usize = results.iter().map(|result| result.items).sum();
    let generate_total: f64 = results.iter().map(|result| result.generate_seconds).sum();
    let parse_total: f64 = results.iter().map(|result| result.parse_seconds).sum();
    println!(
        "Average generate: {:.4} seconds ({:.0} items per second)",
        generate_total / results.len() as f64,
        total_items as f64 / generate_total
    );
    println!(
        "Average parse: {:.4} seconds ({:.0} items per second)",
        parse_total / results.len() as f64,
        total_items as f64 / parse_total
    );
    if args.report {
        write_report(&results);
    }
}
