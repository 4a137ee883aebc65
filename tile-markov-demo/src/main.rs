use std::fs;
use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::Parser;
use tile_markov_core::model::generation_config::{DEFAULT_ORDER, DEFAULT_VOCABULARY_SIZE, GenerationConfig};
use tile_markov_core::model::generator::{BatchOutcome, Generator};

use crate::level_text::TilePatterns;

mod level_text;

/// Extends a tile strip learned from a training file and prints every step
#[derive(Parser)]
#[command(name = "tile-markov-demo", version)]
struct Cli {
    /// Training file: sequences separated by '.' or new lines, tiles by ','
    #[arg(value_name = "TRAINING")]
    training: PathBuf,

    /// Number of known tile types
    #[arg(short, long, default_value_t = DEFAULT_VOCABULARY_SIZE)]
    vocabulary: usize,

    /// Maximum context length before backing off
    #[arg(short, long, default_value_t = DEFAULT_ORDER)]
    order: usize,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of tiles to generate
    #[arg(short, long, default_value_t = 20)]
    count: usize,

    /// Tiles placed by hand before generating, e.g. "0,1"
    #[arg(short, long, value_delimiter = ',')]
    prefix: Vec<u32>,

    /// Stop after this many steps, as if the run was interrupted
    #[arg(long)]
    stop_after: Option<usize>,

    /// Tile row patterns ("<tile>: <8 rows>" per line) used for the level text
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Folder receiving one 8-row level text per step (needs --patterns)
    #[arg(short, long, requires = "patterns")]
    export: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    let mut config = GenerationConfig::new(cli.vocabulary, cli.order)?;
    config.seed = cli.seed;
    let mut generator = Generator::new(config);

    // Load the training file (a .bin snapshot is reused when up to date)
    let report = generator.import_file(&cli.training, true)?;
    println!(
        "Corpus: {} sequences ({} dropped, {} out-of-range tiles)",
        report.imported, report.dropped_sequences, report.dropped_symbols
    );

    // Tiles placed by hand, like pressing a tile key before generating
    for tile in &cli.prefix {
        generator.append(*tile)?;
    }

    let patterns = match &cli.patterns {
        Some(path) => Some(TilePatterns::load(path)?),
        None => None,
    };
    if let Some(folder) = &cli.export {
        fs::create_dir_all(folder)?;
    }

    // The step callback plays the role of the capture step: it sees the
    // history exactly as it stands after each generated tile
    let report = generator.generate_many(cli.count, |step, history| {
        println!("Step {:>3}: tile {} from {:?} -> {:?}", step.index + 1, step.symbol, step.source, history);
        if let (Some(patterns), Some(folder)) = (&patterns, &cli.export) {
            let path = folder.join(format!("level_{}.txt", step.index + 1));
            match fs::write(&path, patterns.render(history)) {
                Ok(()) => log::info!("level text saved: {}", path.display()),
                Err(e) => log::error!("could not save {}: {e}", path.display()),
            }
        }
        match cli.stop_after {
            Some(limit) if step.index + 1 >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    });

    match report.outcome {
        BatchOutcome::Completed => println!("Generated {} tiles", report.generated),
        BatchOutcome::Cancelled => println!("Stopped after {} tiles", report.generated),
        BatchOutcome::NoPick => println!("Could not generate after {} tiles: the corpus has nothing to sample", report.generated),
    }
    println!("Level: {:?}", generator.history());
    if let Some(patterns) = &patterns {
        print!("{}", patterns.render(generator.history()));
    }

    Ok(())
}
