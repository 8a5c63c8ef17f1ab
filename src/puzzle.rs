//! The `Puzzle` data type and its compact wire codec.
//!
//! One statement (or, in multi-statement mode, one bundle of statements)
//! per speaker, plus optional solution metadata. Immutable after
//! generation.

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::statement::Statement;

/// A generated puzzle: one statement bundle per speaker, in speaker order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puzzle {
    pub n: u32,
    /// `bundles[i]` is the ordered list of statements villager `i` utters.
    /// Single-statement mode is the bundle-size-1 case.
    pub bundles: Vec<Vec<Statement>>,
    /// The solution this puzzle was generated to have.
    pub solution: u32,
    /// The shill's index, if shill mode was enabled.
    pub shill: Option<u32>,
}

impl Puzzle {
    pub fn speaker_count(&self) -> usize {
        self.bundles.len()
    }
}

/// `CODE_CODE_..._CODE`: one segment per speaker, statements within a
/// bundle joined by `+` (baseline single-statement puzzles never emit a
/// `+`), fields within a statement joined by `-`, scopes joined by `.`.
pub fn encode_puzzle(puzzle: &Puzzle) -> String {
    puzzle
        .bundles
        .iter()
        .map(|bundle| bundle.iter().map(|s| s.encode()).collect::<Vec<_>>().join("+"))
        .collect::<Vec<_>>()
        .join("_")
}

/// Parse a compact puzzle code into a `Puzzle` shell (no solution/shill
/// metadata — those are recovered by `verify`, not carried in the wire
/// form). Fails with `MalformedPuzzle` if the segment count doesn't match
/// `n`, or any segment fails to parse as a statement bundle.
pub fn decode_puzzle(code: &str, n: u32) -> Result<Puzzle> {
    crate::library::validate_n(n)?;
    if code.is_empty() {
        return Err(PuzzleError::MalformedPuzzle { reason: "empty puzzle code".into() });
    }
    let segments: Vec<&str> = code.split('_').collect();
    if segments.len() != n as usize {
        return Err(PuzzleError::MalformedPuzzle {
            reason: format!("expected {n} speaker segments, found {}", segments.len()),
        });
    }
    let mut bundles = Vec::with_capacity(segments.len());
    for seg in segments {
        if seg.is_empty() {
            return Err(PuzzleError::MalformedPuzzle { reason: "empty speaker segment".into() });
        }
        let mut bundle = Vec::new();
        for stmt_code in seg.split('+') {
            let stmt = Statement::decode(stmt_code, n).map_err(|e| PuzzleError::MalformedPuzzle {
                reason: format!("speaker segment '{seg}': {e}"),
            })?;
            bundle.push(stmt);
        }
        bundles.push(bundle);
    }
    Ok(Puzzle { n, bundles, solution: 0, shill: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Statement::*;

    fn sample_puzzle() -> Puzzle {
        Puzzle {
            n: 6,
            bundles: vec![
                vec![Implication { a: 3, b: 1 }],
                vec![Neither { a: 0, b: 2 }],
                vec![ExclusiveOne { a: 1, b: 3 }],
                vec![ConverseImplication { a: 5, b: 0 }],
                vec![ExactCount { scope: vec![0, 1, 2, 3, 5], k: 4 }],
                vec![Equivalence { a: 0, b: 3 }],
            ],
            solution: 0b010010,
            shill: None,
        }
    }

    #[test]
    fn roundtrip_matches_spec_example() {
        let puzzle = sample_puzzle();
        let code = encode_puzzle(&puzzle);
        assert_eq!(code, "I-3-1_N-0-2_X-1-3_F-5-0_E-0.1.2.3.5-4_B-0-3");
        let decoded = decode_puzzle(&code, 6).unwrap();
        assert_eq!(decoded.bundles, puzzle.bundles);
    }

    #[test]
    fn fewer_segments_than_n_is_malformed() {
        let err = decode_puzzle("I-3-1_N-0-2", 6).unwrap_err();
        assert!(matches!(err, PuzzleError::MalformedPuzzle { .. }));
    }

    #[test]
    fn multi_statement_bundle_roundtrip() {
        let puzzle = Puzzle {
            n: 4,
            bundles: vec![
                vec![Implication { a: 1, b: 2 }, Neither { a: 0, b: 3 }],
                vec![Equivalence { a: 0, b: 1 }],
                vec![Disjunction { a: 2, b: 3 }],
                vec![AtMostOne { a: 0, b: 2 }],
            ],
            solution: 0,
            shill: None,
        };
        let code = encode_puzzle(&puzzle);
        let decoded = decode_puzzle(&code, 4).unwrap();
        assert_eq!(decoded.bundles, puzzle.bundles);
    }
}
