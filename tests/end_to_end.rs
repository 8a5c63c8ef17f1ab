//! Full pipeline: library -> cache -> generate -> verify -> encode/decode,
//! for both baseline and shill mode, across a few villager counts and seeds.

use werewolf_puzzles::{
    build_cache, build_library, decode_puzzle, encode_puzzle, generate, verify, GeneratorConfig, LibraryConfig,
};

fn roundtrips(n: u32, has_shill: bool, seed: u64) {
    let config = GeneratorConfig { n, has_shill, max_attempts: 1000, ..GeneratorConfig::default() };
    let library = build_library(n, &config.library).unwrap();
    let cache = build_cache(&library, n);

    let puzzle = generate(&config, &cache, seed).unwrap();
    assert_eq!(puzzle.speaker_count(), n as usize);
    assert_eq!(puzzle.shill.is_some(), has_shill);

    let code = encode_puzzle(&puzzle);
    let decoded = decode_puzzle(&code, n).unwrap();
    assert_eq!(decoded.bundles, puzzle.bundles, "T2: decode(encode(p)) must reproduce p's statements");

    let solution = verify(&puzzle, &cache).unwrap();
    assert_eq!(solution.assignment, puzzle.solution, "T4: mask-replay must recover the stored solution");
    assert_eq!(solution.shill, puzzle.shill);
}

#[test]
fn baseline_pipeline_for_several_n() {
    for n in [3, 4, 5, 6] {
        roundtrips(n, false, 7);
    }
}

#[test]
fn shill_pipeline_for_several_n() {
    for n in [4, 5, 6] {
        roundtrips(n, true, 11);
    }
}

#[test]
fn generation_is_deterministic_given_the_same_seed() {
    let n = 5;
    let config = GeneratorConfig { n, max_attempts: 500, ..GeneratorConfig::default() };
    let library = build_library(n, &config.library).unwrap();
    let cache = build_cache(&library, n);

    let a = generate(&config, &cache, 123).unwrap();
    let b = generate(&config, &cache, 123).unwrap();
    assert_eq!(encode_puzzle(&a), encode_puzzle(&b), "T7: same (n, config, cache, seed) must reproduce the same puzzle");
    assert_eq!(a.solution, b.solution);
}

#[test]
fn truth_mask_matches_direct_evaluation_for_every_library_statement() {
    let n = 5;
    let library = build_library(n, &LibraryConfig::default()).unwrap();
    let cache = build_cache(&library, n);
    for stmt in &library {
        let mask = cache.truth_mask(&stmt.encode()).unwrap();
        for j in 0..(1u32 << n) {
            assert_eq!(mask.get(j as usize), stmt.evaluate(j), "T3 failed for {} at j={j}", stmt.encode());
        }
    }
}

#[test]
fn every_library_statement_round_trips_through_its_code() {
    let n = 6;
    let library = build_library(n, &LibraryConfig::default()).unwrap();
    for stmt in &library {
        let code = stmt.encode();
        let back = werewolf_puzzles::Statement::decode(&code, n).unwrap();
        assert_eq!(*stmt, back, "T1 failed for {code}");
    }
}
