//! Truth-table cache persistence to a real file on disk (as opposed to the
//! in-memory `Cursor` round trip already covered inside `cache.rs`).

use std::fs::File;
use std::io::{BufReader, BufWriter};

use werewolf_puzzles::{build_cache, build_library, LibraryConfig, TruthCache};

#[test]
fn cache_saved_to_disk_reloads_identically() {
    let n = 5;
    let library = build_library(n, &LibraryConfig::default()).unwrap();
    let cache = build_cache(&library, n);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.txt");

    let file = File::create(&path).unwrap();
    cache.save(BufWriter::new(file)).unwrap();

    let file = File::open(&path).unwrap();
    let loaded = TruthCache::load(BufReader::new(file), n).unwrap();

    assert_eq!(loaded.len(), cache.len());
    for code in library.iter().map(|s| s.encode()) {
        assert_eq!(loaded.truth_mask(&code), cache.truth_mask(&code));
    }
}

#[test]
fn loading_a_cache_built_for_a_different_n_is_rejected() {
    let library = build_library(6, &LibraryConfig::default()).unwrap();
    let cache = build_cache(&library, 6);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.txt");
    let file = File::create(&path).unwrap();
    cache.save(BufWriter::new(file)).unwrap();

    let file = File::open(&path).unwrap();
    let err = TruthCache::load(BufReader::new(file), 5).unwrap_err();
    assert!(matches!(err, werewolf_puzzles::PuzzleError::CacheIncompatible { .. }));
}
