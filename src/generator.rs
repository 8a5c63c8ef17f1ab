//! The generator (L4).
//!
//! Picks a target assignment (and, in shill mode, a target shill), then
//! greedily assigns statement bundles to speakers so the remaining-
//! compatible mask shrinks to exactly the target. Backtracks by restarting
//! whole attempts on dead ends. Grounded on the teacher's `src/generator.rs`
//! `Generator` struct and its explicit `rng: &mut impl Rng` threading.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::bitset::BitSet;
use crate::cache::TruthCache;
use crate::error::{PuzzleError, Result};
use crate::library::{build_library, LibraryConfig};
use crate::puzzle::Puzzle;
use crate::roles::{self};
use crate::statement::Statement;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GeneratorConfig {
    pub n: u32,
    pub library: LibraryConfig,
    pub statements_min: u32,
    pub statements_max: u32,
    pub has_shill: bool,
    pub allow_self_reference: bool,
    pub enforce_diversity: bool,
    pub max_attempts: u32,
    pub min_werewolves: u32,
    pub max_werewolves: Option<u32>,
    /// Optional bias applied only as an extra tie-breaker alongside the
    /// spec's defined tie-break (lowest complexity_cost, then code order).
    pub complexity_budget: Option<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            n: 6,
            library: LibraryConfig::default(),
            statements_min: 1,
            statements_max: 1,
            has_shill: false,
            allow_self_reference: false,
            enforce_diversity: true,
            max_attempts: 200,
            min_werewolves: 1,
            max_werewolves: None,
            complexity_budget: None,
        }
    }
}

struct Candidate {
    code: String,
    cost: u32,
}

/// Generate a puzzle deterministically from `(config, cache, seed)`.
pub fn generate(config: &GeneratorConfig, cache: &TruthCache, seed: u64) -> Result<Puzzle> {
    generate_cancelable(config, cache, seed, None)
}

/// As `generate`, but checks `cancel` between attempts and bails out with
/// `GenerationExhausted` (reporting attempts made so far) if it becomes
/// `true`.
pub fn generate_cancelable(
    config: &GeneratorConfig,
    cache: &TruthCache,
    seed: u64,
    cancel: Option<&AtomicBool>,
) -> Result<Puzzle> {
    let n = config.n;
    if cache.n() != n {
        return Err(PuzzleError::CacheIncompatible {
            reason: format!("cache built for N={}, generator config requests N={n}", cache.n()),
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);

    for attempt in 1..=config.max_attempts {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(PuzzleError::GenerationExhausted { attempts: attempt - 1 });
            }
        }
        if let Some(puzzle) = attempt_once(config, cache, &mut rng) {
            if passes_post_filters(config, &puzzle) {
                return Ok(puzzle);
            }
        }
    }
    Err(PuzzleError::GenerationExhausted { attempts: config.max_attempts })
}

fn attempt_once(config: &GeneratorConfig, cache: &TruthCache, rng: &mut StdRng) -> Option<Puzzle> {
    use rand::Rng;
    let n = config.n;

    // Step 1: choose target W* (and S* in shill mode).
    let target = choose_target(config, rng)?;
    let shill = if config.has_shill { Some(choose_shill(n, target, rng)) } else { None };

    // Step 2/3 setup: per-speaker candidate bundles, ranked most-constrained-first.
    let mut remaining = if config.has_shill {
        initial_remaining_pairs(n, target)
    } else {
        roles::at_least_one_werewolf(n)
    };

    let mut speaker_order: Vec<u32> = (0..n).collect();
    let mut assigned: Vec<Option<Vec<String>>> = vec![None; n as usize];
    let mut used_codes: HashSet<String> = HashSet::new();

    // Greedily process the most-constrained speaker remaining each round:
    // re-rank by candidate count after every assignment, since the pool of
    // consistent candidates for a given speaker does not change with other
    // speakers' choices (candidates are a function of (W*, S*) alone) but
    // the post-mask popcount ranking does, so we still re-evaluate masks
    // each round against the shrinking `remaining`.
    speaker_order.shuffle(rng);

    // First pass: compute each speaker's statically consistent candidate set.
    let mut candidate_pools: Vec<Vec<Candidate>> = Vec::with_capacity(n as usize);
    for i in 0..n {
        candidate_pools.push(consistent_candidates(config, cache, i, target, shill, &used_codes));
    }

    // Order speakers by fewest candidates first (most-constrained-first).
    speaker_order.sort_by_key(|&i| candidate_pools[i as usize].len());

    for &i in &speaker_order {
        let pool = &candidate_pools[i as usize];
        if pool.is_empty() {
            return None;
        }
        let statements_per_speaker =
            rng.gen_range(config.statements_min..=config.statements_max.max(config.statements_min));
        let bundle_codes = select_bundle_for_speaker(
            config,
            cache,
            i,
            target,
            shill,
            pool,
            &remaining,
            statements_per_speaker,
            &used_codes,
        )?;

        let bundle_mask = bundle_compat_mask(cache, &bundle_codes, i, target, shill);
        remaining.and_assign(&bundle_mask);

        if config.enforce_diversity {
            used_codes.extend(bundle_codes.iter().cloned());
        }
        assigned[i as usize] = Some(bundle_codes);
    }

    // Step 4: success iff the remaining mask is exactly the target.
    if config.has_shill {
        if remaining.popcount() != 1 {
            return None;
        }
        let pair = remaining.only_index()?;
        let (rem_assignment, rem_shill) = roles::unpack_pair(n, pair);
        if rem_assignment != target || Some(rem_shill) != shill {
            return None;
        }
    } else {
        if remaining.popcount() != 1 {
            return None;
        }
        if remaining.only_index()? as u32 != target {
            return None;
        }
    }

    let bundles: Vec<Vec<Statement>> = assigned
        .into_iter()
        .map(|codes| {
            codes
                .unwrap()
                .iter()
                .map(|c| Statement::decode(c, n).expect("cache codes always parse"))
                .collect()
        })
        .collect();

    Some(Puzzle { n, bundles, solution: target, shill })
}

fn choose_target(config: &GeneratorConfig, rng: &mut StdRng) -> Option<u32> {
    use rand::Rng;
    let n = config.n;
    let universe = 1u32 << n;
    let lo = config.min_werewolves.max(1);
    let hi = config.max_werewolves.unwrap_or(n);
    let candidates: Vec<u32> = (1..universe)
        .filter(|&j| {
            let popcount = j.count_ones();
            popcount >= lo && popcount <= hi
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

fn choose_shill(n: u32, target: u32, rng: &mut StdRng) -> u32 {
    use rand::Rng;
    let non_werewolves: Vec<u32> = (0..n).filter(|&i| (target >> i) & 1 == 0).collect();
    // Every target has at least one non-werewolf as long as popcount < n;
    // callers of choose_target with max_werewolves < n guarantee this, and
    // the default config caps at n (all werewolves) only in degenerate
    // configs, which generation will simply fail to complete and retry.
    if non_werewolves.is_empty() {
        return 0;
    }
    non_werewolves[rng.gen_range(0..non_werewolves.len())]
}

#[allow(clippy::too_many_arguments)]
fn consistent_candidates(
    config: &GeneratorConfig,
    cache: &TruthCache,
    speaker: u32,
    target: u32,
    shill: Option<u32>,
    used_codes: &HashSet<String>,
) -> Vec<Candidate> {
    let must_be_false = match shill {
        Some(s) => (target >> speaker) & 1 == 1 || speaker == s,
        None => (target >> speaker) & 1 == 1,
    };
    let mut out = Vec::new();
    for (code, mask) in all_codes_and_masks(cache) {
        if config.enforce_diversity && used_codes.contains(code) {
            continue;
        }
        let holds = mask.get(target as usize);
        if holds == must_be_false {
            continue;
        }
        let stmt = match Statement::decode(code, config.n) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if !config.allow_self_reference && stmt.variables_involved().contains(&speaker) {
            continue;
        }
        let cost = stmt.complexity_cost();
        out.push(Candidate { code: code.to_string(), cost });
    }
    out
}

fn all_codes_and_masks(cache: &TruthCache) -> impl Iterator<Item = (&str, &BitSet)> {
    cache.iter_masks()
}

#[allow(clippy::too_many_arguments)]
fn select_bundle_for_speaker(
    config: &GeneratorConfig,
    cache: &TruthCache,
    speaker: u32,
    target: u32,
    shill: Option<u32>,
    pool: &[Candidate],
    remaining: &BitSet,
    bundle_size: u32,
    used_codes: &HashSet<String>,
) -> Option<Vec<String>> {
    // For bundle_size == 1 (the common case) this is exactly spec.md's
    // greedy rule. For bundle_size > 1, compose a bundle by repeating the
    // same greedy rule against the shrinking post-mask, drawing without
    // replacement from the same statically-consistent pool.
    let mut chosen: Vec<String> = Vec::new();
    let mut local_remaining = remaining.clone();
    let mut local_used: HashSet<&str> = used_codes.iter().map(String::as_str).collect();

    for _ in 0..bundle_size {
        let mut best: Option<(&Candidate, BitSet, u32)> = None;
        for cand in pool {
            if local_used.contains(cand.code.as_str()) || chosen.iter().any(|c| c == &cand.code) {
                continue;
            }
            let post = compat_mask_for(cache, speaker, shill, &cand.code).and(&local_remaining);
            let keeps_target = if config.has_shill {
                let Some(s) = shill else { continue };
                post.get(roles::pair_index(config.n, target, s))
            } else {
                post.get(target as usize)
            };
            if !keeps_target {
                continue;
            }
            let pop = post.popcount();
            let better = match &best {
                None => true,
                Some((best_cand, best_post, _)) => {
                    pop < best_post.popcount()
                        || (pop == best_post.popcount() && cand.cost < best_cand.cost)
                        || (pop == best_post.popcount()
                            && cand.cost == best_cand.cost
                            && cand.code < best_cand.code)
                }
            };
            if better {
                best = Some((cand, post, pop));
            }
        }
        let (cand, post, _) = best?;
        chosen.push(cand.code.clone());
        local_used.insert(cand.code.as_str());
        local_remaining = post;
    }

    Some(chosen)
}

/// The mask `remaining` gets AND-ed against for `speaker`'s candidate
/// `code`. In shill mode this must NOT fix the chosen shill `S*` — doing so
/// would zero out every pair whose second coordinate isn't `S*` on the
/// first assignment, collapsing `remaining` to the `S*` slice and making
/// the popcount-1 success test below prove uniqueness only within that
/// slice instead of across the whole `(assignment, shill)` product space
/// spec.md §4.4 Step 3 defines. Unioning over every candidate `s` keeps
/// `remaining` tracking the full space, matching `verify.rs`'s
/// `mask_replay_shill`.
fn compat_mask_for(cache: &TruthCache, speaker: u32, shill: Option<u32>, code: &str) -> BitSet {
    let truth = cache.truth_mask(code).expect("candidate codes come from the cache");
    match shill {
        Some(_) => roles::speaker_compat_for_shill_union(cache.n(), speaker, truth),
        None => roles::speaker_compat(cache.n(), speaker, truth),
    }
}

fn bundle_compat_mask(cache: &TruthCache, codes: &[String], speaker: u32, shill: Option<u32>) -> BitSet {
    let n = cache.n();
    let bits = if shill.is_some() { roles::pair_universe_bits(n) } else { 1usize << n };
    let mut acc = BitSet::all_ones(bits);
    for code in codes {
        acc.and_assign(&compat_mask_for(cache, speaker, shill, code));
    }
    acc
}

fn initial_remaining_pairs(n: u32, target: u32) -> BitSet {
    let at_least_one = roles::at_least_one_werewolf(n);
    roles::broadcast_to_pairs(n, &at_least_one)
}

fn passes_post_filters(config: &GeneratorConfig, puzzle: &Puzzle) -> bool {
    if config.enforce_diversity {
        let mut tag_counts: std::collections::HashMap<&'static str, u32> = std::collections::HashMap::new();
        for bundle in &puzzle.bundles {
            for stmt in bundle {
                *tag_counts.entry(variant_tag(stmt)).or_insert(0) += 1;
            }
        }
        let total: u32 = tag_counts.values().sum();
        let cap = (puzzle.n as f64 / 2.0).ceil() as u32;
        if let Some(&max_of_one) = tag_counts.values().max() {
            if total > 1 && max_of_one > cap {
                return false;
            }
        }
    }
    true
}

fn variant_tag(stmt: &Statement) -> &'static str {
    use Statement::*;
    match stmt {
        Implication { .. } => "I",
        Equivalence { .. } => "B",
        Disjunction { .. } => "A",
        ExclusiveOne { .. } => "X",
        AtMostOne { .. } => "T",
        ConverseImplication { .. } => "F",
        Neither { .. } => "N",
        ExactCount { .. } => "E",
        UpperBound { .. } => "M",
        LowerBound { .. } => "L",
        EvenParity { .. } => "V",
        OddParity { .. } => "O",
    }
}

/// Convenience: build a library and cache, then generate in one call.
pub fn generate_fresh(config: &GeneratorConfig, seed: u64) -> Result<(Puzzle, TruthCache)> {
    let library = build_library(config.n, &config.library)?;
    let cache = TruthCache::build(&library, config.n);
    let puzzle = generate(config, &cache, seed)?;
    Ok((puzzle, cache))
}
