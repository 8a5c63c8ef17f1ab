//! `wwpuzzle` — standalone binary entry point.
//!
//! A thin wrapper around [`werewolf_puzzles::cli::run_cli`]; all command
//! logic lives in the library crate so it stays testable without spawning
//! a process.
//!
//! # Exit codes
//!
//! - `0` — success
//! - `1` — generation exhausted its attempt budget
//! - `2` — any other error

use werewolf_puzzles::PuzzleError;

fn main() {
    if let Err(e) = werewolf_puzzles::cli::run_cli() {
        eprintln!("Error: {e}");
        let code = match e {
            PuzzleError::GenerationExhausted { .. } => 1,
            _ => 2,
        };
        std::process::exit(code);
    }
}
