//! The verifier (L5).
//!
//! Mask-replay (always compiled in, pure bitset arithmetic over the
//! `TruthCache`) plus, behind the `verification` feature, an independent
//! SMT check built on the `werewolf_verify` crate. Both must agree; any
//! disagreement is a `VerifierInconsistency`, never retried.

use crate::bitset::BitSet;
use crate::cache::TruthCache;
use crate::error::{PuzzleError, Result};
use crate::puzzle::Puzzle;
use crate::roles;
#[cfg(feature = "verification")]
use crate::statement::Statement;

/// The unique solution a verified puzzle admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub assignment: u32,
    pub shill: Option<u32>,
}

/// Replay the cached compatibility masks for every speaker's bundle and
/// confirm exactly one `(assignment, shill?)` survives. This is the
/// mask-replay half of L5 and has no external dependency.
pub fn verify(puzzle: &Puzzle, cache: &TruthCache) -> Result<Solution> {
    let n = puzzle.n;
    if cache.n() != n {
        return Err(PuzzleError::CacheIncompatible {
            reason: format!("cache built for N={}, puzzle has N={n}", cache.n()),
        });
    }

    let solution = mask_replay(puzzle, cache)?;

    #[cfg(feature = "verification")]
    {
        let smt_solution = smt_check(puzzle, cache)?;
        if smt_solution != solution {
            return Err(PuzzleError::VerifierInconsistency {
                reason: format!(
                    "mask-replay found {solution:?} but the SMT check found {smt_solution:?}"
                ),
            });
        }
    }

    if solution.assignment != puzzle.solution || solution.shill != puzzle.shill {
        return Err(PuzzleError::VerifierInconsistency {
            reason: format!(
                "verified solution {solution:?} does not match the puzzle's stored solution \
                 (assignment={}, shill={:?})",
                puzzle.solution, puzzle.shill
            ),
        });
    }

    Ok(solution)
}

/// The baseline codec carries no explicit "shill mode" flag in the wire
/// form (spec.md §6): whether to replay with or without the shill rule is
/// decided by whether the caller populated `puzzle.shill`. A puzzle loaded
/// fresh from `decode_puzzle` has `shill = None` and must be verified with
/// `verify_recovering_shill` instead if shill mode is in play.
fn mask_replay(puzzle: &Puzzle, cache: &TruthCache) -> Result<Solution> {
    let n = puzzle.n;
    if puzzle.shill.is_some() {
        mask_replay_shill(puzzle, cache, n)
    } else {
        mask_replay_baseline(puzzle, cache, n)
    }
}

fn mask_replay_baseline(puzzle: &Puzzle, cache: &TruthCache, n: u32) -> Result<Solution> {
    let mut remaining = roles::at_least_one_werewolf(n);
    for (i, bundle) in puzzle.bundles.iter().enumerate() {
        let codes: Vec<String> = bundle.iter().map(|s| s.encode()).collect();
        let truth = roles::bundle_all_true_mask(cache, &codes).ok_or_else(|| PuzzleError::VerifierInconsistency {
            reason: format!("speaker {i}'s statement(s) are missing from the cache"),
        })?;
        let compat = roles::speaker_compat(n, i as u32, &truth);
        remaining.and_assign(&compat);
    }
    let assignment = remaining.only_index().ok_or_else(|| PuzzleError::VerifierInconsistency {
        reason: format!(
            "mask replay found {} compatible assignment(s), expected exactly 1",
            remaining.popcount()
        ),
    })?;
    Ok(Solution { assignment: assignment as u32, shill: None })
}

fn mask_replay_shill(puzzle: &Puzzle, cache: &TruthCache, n: u32) -> Result<Solution> {
    let mut remaining = BitSet::with_bits(roles::pair_universe_bits(n));

    for s in 0..n {
        let mut per_shill = BitSet::all_ones(roles::pair_universe_bits(n));
        for (i, bundle) in puzzle.bundles.iter().enumerate() {
            let codes: Vec<String> = bundle.iter().map(|stmt| stmt.encode()).collect();
            let truth = roles::bundle_all_true_mask(cache, &codes).ok_or_else(|| PuzzleError::VerifierInconsistency {
                reason: format!("speaker {i}'s statement(s) are missing from the cache"),
            })?;
            let compat = roles::speaker_compat_for_shill_candidate(n, i as u32, s, &truth);
            per_shill.and_assign(&compat);
        }
        // `per_shill` already carries only pairs with shill == s (the
        // per-speaker masks are zero outside that slice), so OR-ing the
        // per-candidate-shill contributions together recovers the union
        // over s that spec.md §4.3 defines.
        remaining.or_assign(&per_shill);
    }

    let pair = remaining.only_index().ok_or_else(|| PuzzleError::VerifierInconsistency {
        reason: format!(
            "mask replay found {} compatible (assignment, shill) pair(s), expected exactly 1",
            remaining.popcount()
        ),
    })?;
    let (assignment, shill) = roles::unpack_pair(n, pair);
    Ok(Solution { assignment, shill: Some(shill) })
}

/// Verify a puzzle whose shill mode is not yet known from its in-memory
/// metadata (e.g. one recovered from a bare compact code via
/// `decode_puzzle`, which carries no shill flag). Tries the baseline
/// replay first; if that fails to converge to a unique assignment, retries
/// under the shill rule, recovering the shill identity as the unique
/// liar who is not a werewolf — exactly as spec.md §6 describes.
pub fn verify_recovering_shill(puzzle: &Puzzle, cache: &TruthCache) -> Result<Solution> {
    let n = puzzle.n;
    if cache.n() != n {
        return Err(PuzzleError::CacheIncompatible {
            reason: format!("cache built for N={}, puzzle has N={n}", cache.n()),
        });
    }
    if let Ok(solution) = mask_replay_baseline(puzzle, cache, n) {
        return Ok(solution);
    }
    mask_replay_shill(puzzle, cache, n)
}

/// Independently re-derive spec.md §4.5.2's role-semantics formula for
/// every speaker and hand it to `werewolf_verify` for an assert-negation
/// uniqueness check. `werewolf_verify` knows nothing about `Statement` or
/// `Puzzle`; this function is the one place that bridges the two crates.
#[cfg(feature = "verification")]
fn smt_check(puzzle: &Puzzle, _cache: &TruthCache) -> Result<Solution> {
    use werewolf_verify::{VerifyExpr, Verifier};

    let n = puzzle.n as usize;
    let expected_w: Vec<bool> = (0..n).map(|i| (puzzle.solution >> i) & 1 == 1).collect();
    let w = |i: u32| VerifyExpr::bool_var(format!("w_{i}"));
    let shill = || VerifyExpr::int_var("shill");

    let mut assertions = Vec::new();
    for (i, bundle) in puzzle.bundles.iter().enumerate() {
        let bundle_formula = VerifyExpr::and(bundle.iter().map(lower_statement).collect());
        let liar_condition = if puzzle.shill.is_some() {
            VerifyExpr::or(vec![w(i as u32), VerifyExpr::int_eq(shill(), VerifyExpr::IntLit(i as i64))])
        } else {
            w(i as u32)
        };
        assertions.push(VerifyExpr::iff(bundle_formula, VerifyExpr::not(liar_condition)));
    }

    if puzzle.shill.is_some() {
        assertions.push(VerifyExpr::int_ge(shill(), VerifyExpr::IntLit(0)));
        assertions.push(VerifyExpr::int_le(shill(), VerifyExpr::IntLit(n as i64 - 1)));
        for i in 0..n as u32 {
            assertions.push(VerifyExpr::implies(
                VerifyExpr::int_eq(shill(), VerifyExpr::IntLit(i as i64)),
                VerifyExpr::not(w(i)),
            ));
        }
    }

    Verifier::new().verify_unique(&assertions, &expected_w, puzzle.shill).map_err(|e| match e {
        werewolf_verify::VerificationError::SolverUnknown => PuzzleError::VerifierTimeout { seconds: 5 },
        other => PuzzleError::VerifierInconsistency { reason: format!("SMT check failed: {other}") },
    })?;

    Ok(Solution { assignment: puzzle.solution, shill: puzzle.shill })
}

/// Translate one villager-facing statement into the boolean formula it
/// contributes to a speaker's role-semantics encoding.
#[cfg(feature = "verification")]
fn lower_statement(stmt: &Statement) -> werewolf_verify::VerifyExpr {
    use werewolf_verify::{CountCmp, VerifyExpr};

    let w = |i: u32| VerifyExpr::bool_var(format!("w_{i}"));
    let scope_vars = |scope: &[u32]| scope.iter().map(|&i| format!("w_{i}")).collect::<Vec<_>>();

    match stmt {
        Statement::Implication { a, b } => VerifyExpr::implies(w(*a), w(*b)),
        Statement::Equivalence { a, b } => VerifyExpr::iff(w(*a), w(*b)),
        Statement::Disjunction { a, b } => VerifyExpr::or(vec![w(*a), w(*b)]),
        Statement::ExclusiveOne { a, b } => VerifyExpr::and(vec![
            VerifyExpr::or(vec![w(*a), w(*b)]),
            VerifyExpr::not(VerifyExpr::and(vec![w(*a), w(*b)])),
        ]),
        Statement::AtMostOne { a, b } => VerifyExpr::not(VerifyExpr::and(vec![w(*a), w(*b)])),
        Statement::ConverseImplication { a, b } => VerifyExpr::or(vec![w(*a), w(*b)]),
        Statement::Neither { a, b } => VerifyExpr::and(vec![VerifyExpr::not(w(*a)), VerifyExpr::not(w(*b))]),
        Statement::ExactCount { scope, k } => VerifyExpr::count(scope_vars(scope), CountCmp::Exact, *k as i64),
        Statement::UpperBound { scope, k } => VerifyExpr::count(scope_vars(scope), CountCmp::AtMost, *k as i64),
        Statement::LowerBound { scope, k } => VerifyExpr::count(scope_vars(scope), CountCmp::AtLeast, *k as i64),
        Statement::EvenParity { scope } => VerifyExpr::count(scope_vars(scope), CountCmp::Even, 0),
        Statement::OddParity { scope } => VerifyExpr::count(scope_vars(scope), CountCmp::Odd, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, GeneratorConfig};
    use crate::library::{build_library, LibraryConfig, VariantKind};

    fn cache_for(n: u32) -> TruthCache {
        let lib = build_library(n, &LibraryConfig { variants: VariantKind::all_pair(), ..LibraryConfig::default() })
            .unwrap();
        TruthCache::build(&lib, n)
    }

    #[test]
    fn verify_matches_generated_baseline_puzzle() {
        let cache = cache_for(4);
        let config = GeneratorConfig {
            n: 4,
            library: LibraryConfig { variants: VariantKind::all_pair(), ..LibraryConfig::default() },
            max_attempts: 500,
            ..GeneratorConfig::default()
        };
        let puzzle = generate(&config, &cache, 42).unwrap();
        let solution = verify(&puzzle, &cache).unwrap();
        assert_eq!(solution.assignment, puzzle.solution);
        assert_eq!(solution.shill, None);
    }

    #[test]
    fn verify_matches_generated_shill_puzzle() {
        let cache = cache_for(4);
        let config = GeneratorConfig {
            n: 4,
            has_shill: true,
            library: LibraryConfig { variants: VariantKind::all_pair(), ..LibraryConfig::default() },
            max_attempts: 500,
            ..GeneratorConfig::default()
        };
        let puzzle = generate(&config, &cache, 3).unwrap();
        let solution = verify(&puzzle, &cache).unwrap();
        assert_eq!(solution.assignment, puzzle.solution);
        assert_eq!(solution.shill, puzzle.shill);
    }

    #[test]
    fn mismatched_n_is_cache_incompatible() {
        let cache = cache_for(4);
        let config = GeneratorConfig {
            n: 4,
            library: LibraryConfig { variants: VariantKind::all_pair(), ..LibraryConfig::default() },
            max_attempts: 500,
            ..GeneratorConfig::default()
        };
        let mut puzzle = generate(&config, &cache, 1).unwrap();
        puzzle.n = 5;
        let err = verify(&puzzle, &cache).unwrap_err();
        assert!(matches!(err, PuzzleError::CacheIncompatible { .. }));
    }

    #[test]
    fn recovering_shill_identifies_liar() {
        let cache = cache_for(4);
        let config = GeneratorConfig {
            n: 4,
            has_shill: true,
            library: LibraryConfig { variants: VariantKind::all_pair(), ..LibraryConfig::default() },
            max_attempts: 500,
            ..GeneratorConfig::default()
        };
        let puzzle = generate(&config, &cache, 9).unwrap();
        let code = crate::puzzle::encode_puzzle(&puzzle);
        let decoded = crate::puzzle::decode_puzzle(&code, 4).unwrap();
        let solution = verify_recovering_shill(&decoded, &cache).unwrap();
        assert_eq!(solution.assignment, puzzle.solution);
        assert_eq!(solution.shill, puzzle.shill);
    }
}
