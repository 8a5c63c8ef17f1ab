//! A synthesis engine for werewolf-style logic puzzles: given a villager
//! count `N`, enumerates a candidate statement library, precomputes which
//! assignments of roles each statement is true under, and greedily composes
//! a puzzle — one statement (or small bundle of statements) per villager —
//! guaranteed to pin down exactly one role assignment.
//!
//! The five layers live in their own modules and are meant to be used
//! through the functions re-exported here: [`build_library`], [`build_cache`],
//! [`generate`], [`verify`], [`encode_puzzle`], and [`decode_puzzle`].

pub mod bitset;
pub mod cache;
pub mod error;
pub mod generator;
pub mod library;
pub mod puzzle;
pub mod roles;
pub mod statement;
pub mod verify;

#[cfg(feature = "cli")]
pub mod cli;

pub use bitset::BitSet;
pub use cache::TruthCache;
pub use error::{PuzzleError, Result};
pub use generator::GeneratorConfig;
pub use library::{LibraryConfig, VariantKind};
pub use puzzle::Puzzle;
pub use statement::Statement;
pub use verify::Solution;

/// Enumerate the finite candidate statement library for `N` villagers under
/// `config`. Deterministic: a pure function of `(n, config)`.
pub fn build_library(n: u32, config: &LibraryConfig) -> Result<Vec<Statement>> {
    library::build_library(n, config)
}

/// Precompute the truth mask of every statement in `library` over the
/// `2^n` assignment space.
pub fn build_cache(library: &[Statement], n: u32) -> TruthCache {
    TruthCache::build(library, n)
}

/// Generate a puzzle deterministically from `(config, cache, seed)`.
pub fn generate(config: &GeneratorConfig, cache: &TruthCache, seed: u64) -> Result<Puzzle> {
    generator::generate(config, cache, seed)
}

/// Verify that `puzzle` admits exactly one solution under `cache`, and that
/// it matches the puzzle's stored solution metadata.
pub fn verify(puzzle: &Puzzle, cache: &TruthCache) -> Result<Solution> {
    verify::verify(puzzle, cache)
}

/// Render a puzzle's compact wire code.
pub fn encode_puzzle(puzzle: &Puzzle) -> String {
    puzzle::encode_puzzle(puzzle)
}

/// Parse a compact wire code into a puzzle shell (no solution metadata).
pub fn decode_puzzle(code: &str, n: u32) -> Result<Puzzle> {
    puzzle::decode_puzzle(code, n)
}

/// Evaluate a single statement against the role vector implied by
/// assignment index `j`.
pub fn evaluate_statement(statement: &Statement, j: u32) -> bool {
    statement.evaluate(j)
}
