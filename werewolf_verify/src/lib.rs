//! Z3-based SMT verification of werewolf puzzle solutions.
//!
//! The root `werewolf_puzzles` crate lowers a puzzle's role-semantics
//! formulas into this crate's `VerifyExpr` IR and calls `Verifier::verify_unique`
//! to independently confirm uniqueness. This crate has no dependency on
//! `werewolf_puzzles` — the dependency runs the other way, behind the root
//! crate's `verification` feature — so it knows nothing about `Statement`,
//! `Puzzle`, or `TruthCache`.

pub mod error;
pub mod ir;
pub mod solver;

pub use error::{VerificationError, VerificationResult};
pub use ir::{CountCmp, VerifyExpr};
pub use solver::Verifier;
