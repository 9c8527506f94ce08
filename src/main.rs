//! Reads a concise log and prints it as structured items, as a normalised
//! grid, or as item-to-cell locations
use clap::{Parser, ValueEnum};
use concise_rs::concise::{parse_with_config, ConciseGenerator, LogItem, LogLocation, NotationConfig};
use env_logger::fmt::Formatter;
use log::Record;
use serde::Serialize;
use std::io::Write;
use std::{fs, process};

#[derive(Debug, Clone, ValueEnum)]
enum Command {
    /// Print the decoded items as JSON
    Parse,
    /// Print the log re-rendered in the standard layout
    Normalize,
    /// Print where each item lands in the re-rendered log
    Locate,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg()]
    command: Command,
    /// Concise log to read
    #[arg()]
    file: String,
    /// Stop at the first cell that does not decode
    #[arg(short, long)]
    strict: bool,
    /// JSON file with layout options
    #[arg(short, long)]
    config: Option<String>,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Debug, Serialize)]
struct Located<'a> {
    index: usize,
    item: &'a LogItem,
    location: LogLocation,
    cell: Option<&'a str>,
}

fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => NotationConfig::load(path)?,
        None => NotationConfig::default(),
    };
    config.strict |= args.strict;
    log::debug!("Using {:?}", config);

    let text = fs::read_to_string(&args.file)?;
    let items = parse_with_config(&text, &config)?;
    log::info!("Read {} items from {}", items.len(), args.file);

    let output = match args.command {
        Command::Parse => serde_json::to_string_pretty(&items)?,
        Command::Normalize => ConciseGenerator::with_config(config).generate(&items)?.text(),
        Command::Locate => {
            let log = ConciseGenerator::with_config(config).generate(&items)?;
            let located: Vec<Located> = items
                .iter()
                .zip(&log.locations)
                .enumerate()
                .map(|(index, (item, location))| Located {
                    index,
                    item,
                    location: *location,
                    cell: log.cell_at(*location),
                })
                .collect();
            serde_json::to_string_pretty(&located)?
        }
    };
    Ok(output)
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .format(|buf: &mut Formatter, record: &Record| {
            writeln!(
                buf,
                "[{}] [{}] - {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .filter_level(args.verbose.log_level_filter())
        .init();

    match run(&args) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(err) => {
            eprintln!("{}: {}", args.file, err);
            process::exit(1);
        }
    }
}
