//! The worked scenarios from the engine's own design notes: a hand-checked
//! shill-mode puzzle with a known unique solution, and a baseline generator
//! run whose outputs must round-trip and agree across both verification
//! paths.

use werewolf_puzzles::{decode_puzzle, encode_puzzle, generate, verify, LibraryConfig, VariantKind};

#[test]
fn shill_puzzle_has_the_expected_unique_liar() {
    let code = "I-3-1_N-0-2_X-1-3_F-5-0_E-0.1.2.3.5-4_B-0-3";
    let n = 6;
    let library = werewolf_puzzles::build_library(n, &LibraryConfig::default()).unwrap();
    let cache = werewolf_puzzles::build_cache(&library, n);

    let puzzle = decode_puzzle(code, n).unwrap();
    let solution = werewolf_puzzles::verify::verify_recovering_shill(&puzzle, &cache).unwrap();

    // W = (0,1,1,1,1,0): villagers 1-4 are werewolves, 0 and 5 are human;
    // 5 is the shill.
    assert_eq!(solution.assignment, 0b011110);
    assert_eq!(solution.shill, Some(5));

    let w = |i: u32| (solution.assignment >> i) & 1 == 1;
    assert!(!w(solution.shill.unwrap()), "the shill must not be a werewolf");

    for (i, bundle) in puzzle.bundles.iter().enumerate() {
        let truthful = bundle.iter().all(|s| s.evaluate(solution.assignment));
        if Some(i as u32) == solution.shill {
            assert!(!truthful, "the shill's statement must be false");
        } else if w(i as u32) {
            assert!(!truthful, "villager {i} is a werewolf and must be lying");
        } else {
            assert!(truthful, "villager {i} is human and not the shill, must be truthful");
        }
    }
}

#[test]
fn baseline_generation_round_trips_and_both_verifiers_agree() {
    let n = 4;
    let config = werewolf_puzzles::GeneratorConfig {
        n,
        library: LibraryConfig { variants: vec![VariantKind::Implication, VariantKind::Equivalence], ..LibraryConfig::default() },
        statements_min: 1,
        statements_max: 1,
        has_shill: false,
        max_attempts: 500,
        ..werewolf_puzzles::GeneratorConfig::default()
    };
    let library = werewolf_puzzles::build_library(n, &config.library).unwrap();
    let cache = werewolf_puzzles::build_cache(&library, n);

    let puzzle = generate(&config, &cache, 42).unwrap();
    let code = encode_puzzle(&puzzle);
    let decoded = decode_puzzle(&code, n).unwrap();
    assert_eq!(decoded.bundles, puzzle.bundles);

    let solution = verify(&puzzle, &cache).unwrap();
    assert_eq!(solution.assignment, puzzle.solution);
    assert_eq!(solution.shill, None);
}
