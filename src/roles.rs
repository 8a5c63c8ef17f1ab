//! Role semantics (L3).
//!
//! Per-speaker masks encoding "speaker truthful => statement true; speaker
//! lies => statement false," and the shill rule's enumeration over
//! candidate shills.

use crate::bitset::BitSet;

/// Assignments where villager `i` is human (not a werewolf): bit `i` of the
/// assignment index is 0.
pub fn human_mask(n: u32, i: u32) -> BitSet {
    let universe = 1u32 << n;
    let mut mask = BitSet::with_bits(universe as usize);
    for j in 0..universe {
        if (j >> i) & 1 == 0 {
            mask.set(j as usize);
        }
    }
    mask
}

/// Complement of `human_mask` within the `2^N` domain.
pub fn wolf_mask(n: u32, i: u32) -> BitSet {
    human_mask(n, i).not()
}

/// `(human_mask[i] & truth) | (wolf_mask[i] & !truth)` — assignments
/// consistent with "if i is human, the statement is true; if i is a
/// werewolf, the statement is false."
pub fn speaker_compat(n: u32, i: u32, truth: &BitSet) -> BitSet {
    let human = human_mask(n, i);
    let wolf = wolf_mask(n, i);
    human.and(truth).or(&wolf.and(&truth.not()))
}

/// Assignments with at least one werewolf (baseline generator target pool).
pub fn at_least_one_werewolf(n: u32) -> BitSet {
    let universe = 1u32 << n;
    let mut mask = BitSet::with_bits(universe as usize);
    for j in 1..universe {
        mask.set(j as usize);
    }
    mask
}

/// Fold `truth[c]` over a bundle of statement codes with bitwise AND — the
/// "all true" mask a speaker's bundle of statements induces. Computed on
/// the fly; bundles are never cached (combinatorial explosion).
pub fn bundle_all_true_mask(cache: &crate::cache::TruthCache, codes: &[String]) -> Option<BitSet> {
    let mut iter = codes.iter();
    let first = cache.truth_mask(iter.next()?)?.clone();
    let mut acc = first;
    for code in iter {
        acc.and_assign(cache.truth_mask(code)?);
    }
    Some(acc)
}

/// Pack an `(assignment, shill)` pair into the row-major index used by
/// shill-mode masks: `assignment * n + shill`.
pub fn pair_index(n: u32, assignment: u32, shill: u32) -> usize {
    (assignment * n + shill) as usize
}

/// Unpack a pair index back into `(assignment, shill)`.
pub fn unpack_pair(n: u32, pair: usize) -> (u32, u32) {
    let pair = pair as u32;
    (pair / n, pair % n)
}

/// The universe size (in bits) for shill-mode masks over `(assignment,
/// shill)` pairs.
pub fn pair_universe_bits(n: u32) -> usize {
    ((1u32 << n) * n) as usize
}

/// Lift a per-speaker baseline compatibility mask (over assignments) into
/// the shill-mode pair space, for a speaker `i` that is *not* the candidate
/// shill `s` under consideration: the mask is broadcast across all shill
/// values except it is intersected with "`i` is not the werewolf-or-shill
/// liar" at the pair level by the caller; here we only broadcast.
pub fn broadcast_to_pairs(n: u32, assignment_mask: &BitSet) -> BitSet {
    let mut out = BitSet::with_bits(pair_universe_bits(n));
    for assignment in assignment_mask.iter_set() {
        for shill in 0..n {
            out.set(pair_index(n, assignment as u32, shill));
        }
    }
    out
}

/// Restrict a pair-space mask to pairs with a specific shill value `s`,
/// returning an assignment-space mask.
pub fn pairs_for_shill(n: u32, pair_mask: &BitSet, s: u32) -> BitSet {
    let universe = 1u32 << n;
    let mut out = BitSet::with_bits(universe as usize);
    for assignment in 0..universe {
        if pair_mask.get(pair_index(n, assignment, s)) {
            out.set(assignment as usize);
        }
    }
    out
}

/// For shill mode: the compatibility mask over `(assignment, shill)` pairs
/// for speaker `i` given a candidate shill value `s` is evaluated
/// per-candidate-`s` since the rule for speaker `i` depends on whether
/// `i == s`:
///   - if `i == s`: `i` must be human and `i`'s statement must be false.
///   - otherwise: `i` behaves exactly like the baseline rule (truthful iff
///     human) regardless of who the shill is.
///
/// Returns the pair-space mask restricted to `shill == s`.
pub fn speaker_compat_for_shill_candidate(n: u32, i: u32, s: u32, truth: &BitSet) -> BitSet {
    let universe = 1u32 << n;
    let per_assignment = if i == s {
        human_mask(n, i).and(&truth.not())
    } else {
        speaker_compat(n, i, truth)
    };
    let mut out = BitSet::with_bits(pair_universe_bits(n));
    for assignment in 0..universe {
        if per_assignment.get(assignment as usize) {
            out.set(pair_index(n, assignment, s));
        }
    }
    out
}

/// The full-pair-space compatibility mask for speaker `i` in shill mode,
/// with no single candidate shill fixed: the union, over every candidate
/// `s`, of `speaker_compat_for_shill_candidate(n, i, s, truth)`. Each
/// per-`s` mask is already zero outside its own `shill == s` slice, so the
/// union reassembles a mask that is pointwise correct across the whole
/// `(assignment, shill)` product space — ANDing these across speakers (as
/// the generator's `remaining` does) reproduces exactly what `verify.rs`'s
/// `mask_replay_shill` computes slice-by-slice via its own per-`s` loop.
pub fn speaker_compat_for_shill_union(n: u32, i: u32, truth: &BitSet) -> BitSet {
    let mut acc = BitSet::with_bits(pair_universe_bits(n));
    for s in 0..n {
        acc.or_assign(&speaker_compat_for_shill_candidate(n, i, s, truth));
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_wolf_masks_are_complements() {
        let n = 4;
        for i in 0..n {
            let h = human_mask(n, i);
            let w = wolf_mask(n, i);
            assert_eq!(h.and(&w).popcount(), 0);
            assert_eq!(h.popcount() + w.popcount(), 16);
        }
    }

    #[test]
    fn pair_index_roundtrip() {
        let n = 6;
        for assignment in 0..(1u32 << n) {
            for shill in 0..n {
                let idx = pair_index(n, assignment, shill);
                assert_eq!(unpack_pair(n, idx), (assignment, shill));
            }
        }
    }

    #[test]
    fn at_least_one_werewolf_excludes_zero() {
        let mask = at_least_one_werewolf(4);
        assert!(!mask.get(0));
        assert!(mask.get(1));
        assert_eq!(mask.popcount(), 15);
    }

    #[test]
    fn shill_union_matches_per_candidate_slice_at_every_s() {
        let n = 4;
        let i = 2;
        let truth = at_least_one_werewolf(n); // stand in for an arbitrary truth mask
        let union = speaker_compat_for_shill_union(n, i, &truth);
        for s in 0..n {
            let candidate = speaker_compat_for_shill_candidate(n, i, s, &truth);
            let sliced = pairs_for_shill(n, &union, s);
            let candidate_sliced = pairs_for_shill(n, &candidate, s);
            assert_eq!(sliced, candidate_sliced, "union must reproduce each per-s slice exactly, s={s}");
        }
    }
}
