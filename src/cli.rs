//! Command-line front end for the werewolf puzzle engine (`wwpuzzle`).
//!
//! Thin by design: no business logic beyond flag parsing, config
//! construction, and formatting the result. The actual work is
//! `build_library` -> `build_cache` (or `TruthCache::load`) -> `generate` /
//! `verify` -> `encode_puzzle`, all in the library crate.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cache::TruthCache;
use crate::error::Result;
use crate::generator::GeneratorConfig;
use crate::library::{build_library, LibraryConfig};
use crate::puzzle::{encode_puzzle, Puzzle};

#[derive(Parser)]
#[command(name = "wwpuzzle")]
#[command(about = "Synthesize and verify werewolf-style logic puzzles with a guaranteed unique solution")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The compact `CODE_CODE_..._CODE` wire form.
    Code,
    /// One line per speaker, in plain English.
    Human,
    /// The full `Puzzle` value, including solution metadata.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a puzzle for `n` villagers.
    Generate {
        #[arg(long)]
        n: u32,
        #[arg(long, default_value_t = 1)]
        statements_min: u32,
        #[arg(long, default_value_t = 1)]
        statements_max: u32,
        #[arg(long)]
        has_shill: bool,
        #[arg(long, default_value_t = 200)]
        max_attempts: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Path to a saved truth-table cache. Built fresh (and not saved) if
        /// omitted.
        #[arg(long)]
        cache_file: Option<PathBuf>,
        /// Rebuild the cache even if `--cache-file` already exists, and
        /// overwrite it.
        #[arg(long)]
        rebuild_cache: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Code)]
        output: OutputFormat,
    },

    /// Verify that a puzzle code admits exactly one solution.
    Verify {
        #[arg(long)]
        n: u32,
        #[arg(long)]
        code: String,
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },

    /// Build (and save) a truth-table cache for `n` villagers.
    BuildCache {
        #[arg(long)]
        n: u32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Parse CLI arguments and dispatch to the matching handler. Exit-code
/// policy (0 success, 1 `GenerationExhausted`, 2 any other error) is left
/// to the binary entry point, which inspects the returned error.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            n,
            statements_min,
            statements_max,
            has_shill,
            max_attempts,
            seed,
            cache_file,
            rebuild_cache,
            output,
        } => cmd_generate(
            n,
            statements_min,
            statements_max,
            has_shill,
            max_attempts,
            seed,
            cache_file.as_deref(),
            rebuild_cache,
            output,
        ),
        Commands::Verify { n, code, cache_file } => cmd_verify(n, &code, cache_file.as_deref()),
        Commands::BuildCache { n, out } => cmd_build_cache(n, out.as_deref()),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    n: u32,
    statements_min: u32,
    statements_max: u32,
    has_shill: bool,
    max_attempts: u32,
    seed: u64,
    cache_file: Option<&std::path::Path>,
    rebuild_cache: bool,
    output: OutputFormat,
) -> Result<()> {
    let config = GeneratorConfig {
        n,
        statements_min,
        statements_max,
        has_shill,
        max_attempts,
        ..GeneratorConfig::default()
    };
    let cache = load_or_build_cache(n, &config.library, cache_file, rebuild_cache)?;
    let puzzle = crate::generator::generate(&config, &cache, seed)?;
    print_puzzle(&puzzle, output);
    Ok(())
}

fn cmd_verify(n: u32, code: &str, cache_file: Option<&std::path::Path>) -> Result<()> {
    let puzzle = crate::puzzle::decode_puzzle(code, n)?;
    let cache = load_or_build_cache(n, &LibraryConfig::default(), cache_file, false)?;
    let solution = crate::verify::verify_recovering_shill(&puzzle, &cache)?;
    match solution.shill {
        Some(s) => println!("unique solution: assignment={:#b}, shill={s}", solution.assignment),
        None => println!("unique solution: assignment={:#b}", solution.assignment),
    }
    Ok(())
}

fn cmd_build_cache(n: u32, out: Option<&std::path::Path>) -> Result<()> {
    let library = build_library(n, &LibraryConfig::default())?;
    let cache = TruthCache::build(&library, n);
    match out {
        Some(path) => {
            let file = File::create(path)?;
            cache.save(BufWriter::new(file))?;
            println!("wrote {} statement masks to {}", cache.len(), path.display());
        }
        None => println!("built {} statement masks for N={n} (not saved, no --out given)", cache.len()),
    }
    Ok(())
}

fn load_or_build_cache(
    n: u32,
    library_config: &LibraryConfig,
    cache_file: Option<&std::path::Path>,
    rebuild: bool,
) -> Result<TruthCache> {
    if let Some(path) = cache_file {
        if path.exists() && !rebuild {
            let file = File::open(path)?;
            return TruthCache::load(BufReader::new(file), n);
        }
    }
    let library = build_library(n, library_config)?;
    let cache = TruthCache::build(&library, n);
    if let Some(path) = cache_file {
        let file = File::create(path)?;
        cache.save(BufWriter::new(file))?;
    }
    Ok(cache)
}

fn print_puzzle(puzzle: &Puzzle, output: OutputFormat) {
    match output {
        OutputFormat::Code => println!("{}", encode_puzzle(puzzle)),
        OutputFormat::Human => {
            for (i, bundle) in puzzle.bundles.iter().enumerate() {
                let lines: Vec<String> = bundle.iter().map(|s| s.to_string()).collect();
                println!("villager {i}: {}", lines.join(" and "));
            }
            match puzzle.shill {
                Some(s) => println!("solution: {:#b} (shill is villager {s})", puzzle.solution),
                None => println!("solution: {:#b}", puzzle.solution),
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(puzzle).expect("Puzzle always serializes");
            println!("{json}");
        }
    }
}
