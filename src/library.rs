//! Deterministic enumeration of the candidate statement library from
//! `(N, LibraryConfig)`. Grounded on the teacher's `content.rs`
//! (`ExerciseConfig`, serde-deserializable config driving enumeration).

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::statement::Statement;

/// Valid range for the villager count at every entry point that accepts it
/// from outside the crate (`N=0` is degenerate, `N>20` outgrows the `u32`
/// assignment-index/bitset representation).
pub const MAX_N: u32 = 20;

pub(crate) fn validate_n(n: u32) -> Result<()> {
    if n == 0 || n > MAX_N {
        return Err(PuzzleError::OutOfRangeIndex {
            what: "villager count N".into(),
            value: n as i64,
            bound: format!("1..={MAX_N}"),
        });
    }
    Ok(())
}

/// Which statement variants a library enumeration may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Implication,
    Equivalence,
    Disjunction,
    ExclusiveOne,
    AtMostOne,
    ConverseImplication,
    Neither,
    ExactCount,
    UpperBound,
    LowerBound,
    EvenParity,
    OddParity,
}

impl VariantKind {
    pub fn all_pair() -> Vec<VariantKind> {
        use VariantKind::*;
        vec![Implication, Equivalence, Disjunction, ExclusiveOne, AtMostOne, ConverseImplication, Neither]
    }

    pub fn all_count() -> Vec<VariantKind> {
        use VariantKind::*;
        vec![ExactCount, UpperBound, LowerBound, EvenParity, OddParity]
    }

    fn is_count(self) -> bool {
        matches!(
            self,
            VariantKind::ExactCount
                | VariantKind::UpperBound
                | VariantKind::LowerBound
                | VariantKind::EvenParity
                | VariantKind::OddParity
        )
    }
}

/// Configuration governing which candidate statements a library enumerates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub variants: Vec<VariantKind>,
    /// Minimum scope size for count/parity variants (spec requires >= 2).
    pub min_scope_size: u32,
    /// Maximum scope size; `None` means "all villagers".
    pub max_scope_size: Option<u32>,
    /// Cap on the number of distinct scopes explored per count variant, to
    /// keep the library finite and small for larger N (subsets of size k
    /// grow combinatorially). `None` means "no cap" (fine for N <= 8 or so).
    pub max_scopes_per_variant: Option<usize>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            variants: {
                let mut v = VariantKind::all_pair();
                v.extend(VariantKind::all_count());
                v
            },
            min_scope_size: 2,
            max_scope_size: None,
            max_scopes_per_variant: Some(64),
        }
    }
}

/// Enumerate the finite candidate library for `N` villagers under `config`.
/// Purely a function of `(N, config)` — deterministic, no randomness.
pub fn build_library(n: u32, config: &LibraryConfig) -> Result<Vec<Statement>> {
    validate_n(n)?;
    let mut out = Vec::new();
    for &variant in &config.variants {
        if variant.is_count() {
            enumerate_count_variant(n, variant, config, &mut out);
        } else {
            enumerate_pair_variant(n, variant, &mut out);
        }
    }
    Ok(out)
}

fn enumerate_pair_variant(n: u32, variant: VariantKind, out: &mut Vec<Statement>) {
    use Statement::*;
    for a in 0..n {
        for b in 0..n {
            if a == b {
                continue;
            }
            match variant {
                VariantKind::Implication => out.push(Implication { a, b }),
                VariantKind::ConverseImplication => out.push(ConverseImplication { a, b }),
                VariantKind::Equivalence if a < b => out.push(Equivalence { a, b }),
                VariantKind::Disjunction if a < b => out.push(Disjunction { a, b }),
                VariantKind::ExclusiveOne if a < b => out.push(ExclusiveOne { a, b }),
                VariantKind::AtMostOne if a < b => out.push(AtMostOne { a, b }),
                VariantKind::Neither if a < b => out.push(Neither { a, b }),
                _ => {}
            }
        }
    }
}

fn enumerate_count_variant(n: u32, variant: VariantKind, config: &LibraryConfig, out: &mut Vec<Statement>) {
    use Statement::*;
    let max_scope = config.max_scope_size.unwrap_or(n).min(n);
    let min_scope = config.min_scope_size.max(2);
    let mut scopes: Vec<Vec<u32>> = Vec::new();
    for size in min_scope..=max_scope {
        subsets_of_size(n, size, &mut scopes);
        if let Some(cap) = config.max_scopes_per_variant {
            if scopes.len() > cap {
                scopes.truncate(cap);
                break;
            }
        }
    }
    match variant {
        VariantKind::EvenParity => {
            for scope in &scopes {
                out.push(EvenParity { scope: scope.clone() });
            }
        }
        VariantKind::OddParity => {
            for scope in &scopes {
                out.push(OddParity { scope: scope.clone() });
            }
        }
        VariantKind::ExactCount | VariantKind::UpperBound | VariantKind::LowerBound => {
            for scope in &scopes {
                for k in 0..=scope.len() as u32 {
                    let stmt = match variant {
                        VariantKind::ExactCount => ExactCount { scope: scope.clone(), k },
                        VariantKind::UpperBound => UpperBound { scope: scope.clone(), k },
                        _ => LowerBound { scope: scope.clone(), k },
                    };
                    out.push(stmt);
                }
            }
        }
        _ => {}
    }
}

/// Append every size-`size` subset of `0..n`, in ascending lexicographic order.
fn subsets_of_size(n: u32, size: u32, out: &mut Vec<Vec<u32>>) {
    if size == 0 || size > n {
        return;
    }
    let mut combo: Vec<u32> = (0..size).collect();
    loop {
        out.push(combo.clone());
        // Standard combinatorial "next combination" advance.
        let mut i = size as i64 - 1;
        while i >= 0 && combo[i as usize] == n - size + i as u32 {
            i -= 1;
        }
        if i < 0 {
            break;
        }
        combo[i as usize] += 1;
        for j in (i as usize + 1)..size as usize {
            combo[j] = combo[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_variants_deduplicated_and_canonical() {
        let config = LibraryConfig { variants: VariantKind::all_pair(), ..LibraryConfig::default() };
        let lib = build_library(4, &config).unwrap();
        let mut codes: Vec<String> = lib.iter().map(|s| s.encode()).collect();
        let before = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), before, "library must not contain duplicate codes");
    }

    #[test]
    fn count_variants_respect_scope_bounds() {
        let config = LibraryConfig {
            variants: vec![VariantKind::ExactCount],
            min_scope_size: 2,
            max_scope_size: Some(3),
            max_scopes_per_variant: None,
        };
        let lib = build_library(4, &config).unwrap();
        for s in &lib {
            if let Statement::ExactCount { scope, .. } = s {
                assert!(scope.len() >= 2 && scope.len() <= 3);
            }
        }
    }

    #[test]
    fn subsets_of_size_count_matches_binomial() {
        let mut out = Vec::new();
        subsets_of_size(5, 3, &mut out);
        assert_eq!(out.len(), 10); // C(5,3) = 10
    }
}
