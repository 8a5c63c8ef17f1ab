//! The truth-table cache (L2).
//!
//! For each statement in a library, precomputes the bitmask over all
//! `2^N` assignments for which it holds. Built once per `(N, config)` and
//! treated as read-only thereafter.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use crate::bitset::BitSet;
use crate::error::{PuzzleError, Result};
use crate::statement::Statement;

#[derive(Debug, Clone)]
pub struct TruthCache {
    n: u32,
    /// Keyed by canonical code for stable, deterministic iteration (and so
    /// the save format is reproducible byte-for-byte across runs).
    masks: BTreeMap<String, BitSet>,
}

impl TruthCache {
    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn truth_mask(&self, code: &str) -> Option<&BitSet> {
        self.masks.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.masks.contains_key(code)
    }

    /// Every `(code, mask)` pair, in deterministic code order.
    pub fn iter_masks(&self) -> impl Iterator<Item = (&str, &BitSet)> {
        self.masks.iter().map(|(c, m)| (c.as_str(), m))
    }

    /// Build the cache for every statement in `library`. `O(M * 2^N *
    /// max-scope-size)`.
    pub fn build(library: &[Statement], n: u32) -> TruthCache {
        let universe = 1u32 << n;
        let mut masks = BTreeMap::new();
        for stmt in library {
            let code = stmt.encode();
            let mut mask = BitSet::with_bits(universe as usize);
            for j in 0..universe {
                if stmt.evaluate(j) {
                    mask.set(j as usize);
                }
            }
            masks.insert(code, mask);
        }
        TruthCache { n, masks }
    }

    /// Serialize to the self-describing text format:
    /// `N=<n>`, `count=<m>`, then one `CODE HEX` line per statement.
    pub fn save<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "N={}", self.n)?;
        writeln!(w, "count={}", self.masks.len())?;
        for (code, mask) in &self.masks {
            writeln!(w, "{code} {}", mask.to_hex())?;
        }
        Ok(())
    }

    /// Load from the text format, rejecting a header mismatch or any code
    /// that fails to parse as a statement of the requested `N`.
    pub fn load<R: BufRead>(mut r: R, expected_n: u32) -> Result<TruthCache> {
        crate::library::validate_n(expected_n)?;
        let mut header = String::new();
        r.read_line(&mut header)?;
        let n: u32 = header
            .trim()
            .strip_prefix("N=")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| PuzzleError::CacheIncompatible { reason: "missing or malformed N= header".into() })?;
        if n != expected_n {
            return Err(PuzzleError::CacheIncompatible {
                reason: format!("cache built for N={n}, requested N={expected_n}"),
            });
        }

        let mut count_line = String::new();
        r.read_line(&mut count_line)?;
        let count: usize = count_line
            .trim()
            .strip_prefix("count=")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| PuzzleError::CacheIncompatible { reason: "missing or malformed count= header".into() })?;

        let universe = (1u32 << n) as usize;
        let mut masks = BTreeMap::new();
        for line in r.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, ' ');
            let code = parts.next().unwrap_or_default();
            let hex = parts.next().ok_or_else(|| PuzzleError::CacheIncompatible {
                reason: format!("line '{line}' is missing its hex mask"),
            })?;
            // Validate the code parses as a real statement of this N.
            Statement::decode(code, n).map_err(|e| PuzzleError::CacheIncompatible {
                reason: format!("unknown or invalid code '{code}': {e}"),
            })?;
            let mask = BitSet::from_hex(hex, universe).ok_or_else(|| PuzzleError::CacheIncompatible {
                reason: format!("malformed hex mask for '{code}'"),
            })?;
            masks.insert(code.to_string(), mask);
        }

        if masks.len() != count {
            return Err(PuzzleError::CacheIncompatible {
                reason: format!("header promised count={count} but {} lines were read", masks.len()),
            });
        }

        Ok(TruthCache { n, masks })
    }
}

impl From<std::io::Error> for PuzzleError {
    fn from(e: std::io::Error) -> Self {
        PuzzleError::CacheIncompatible { reason: format!("io error: {e}") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{build_library, LibraryConfig};

    #[test]
    fn build_matches_direct_evaluation() {
        let lib = build_library(4, &LibraryConfig::default()).unwrap();
        let cache = TruthCache::build(&lib, 4);
        for stmt in &lib {
            let mask = cache.truth_mask(&stmt.encode()).unwrap();
            for j in 0..16u32 {
                assert_eq!(mask.get(j as usize), stmt.evaluate(j));
            }
        }
    }

    #[test]
    fn save_load_roundtrip() {
        let lib = build_library(4, &LibraryConfig::default()).unwrap();
        let cache = TruthCache::build(&lib, 4);
        let mut buf = Vec::new();
        cache.save(&mut buf).unwrap();
        let loaded = TruthCache::load(std::io::Cursor::new(buf), 4).unwrap();
        assert_eq!(loaded.len(), cache.len());
        for (code, mask) in &cache.masks {
            assert_eq!(loaded.truth_mask(code).unwrap(), mask);
        }
    }

    #[test]
    fn load_rejects_mismatched_n() {
        let lib = build_library(6, &LibraryConfig::default()).unwrap();
        let cache = TruthCache::build(&lib, 6);
        let mut buf = Vec::new();
        cache.save(&mut buf).unwrap();
        let err = TruthCache::load(std::io::Cursor::new(buf), 5).unwrap_err();
        assert!(matches!(err, PuzzleError::CacheIncompatible { .. }));
    }

    #[test]
    fn load_rejects_unknown_code() {
        let data = "N=4\ncount=1\nZZ-0-1 f\n";
        let err = TruthCache::load(std::io::Cursor::new(data), 4).unwrap_err();
        assert!(matches!(err, PuzzleError::CacheIncompatible { .. }));
    }
}
