//! Crate-wide error taxonomy.
//!
//! A closed, tagged enum with a hand-written `Display`, mirroring the
//! teacher's `ParseError`/`ParseErrorKind` split: one kind per distinct
//! failure mode, each carrying just enough payload to explain itself.

use std::fmt;

/// The crate's standard result alias.
pub type Result<T> = std::result::Result<T, PuzzleError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// A statement's canonical code failed to parse.
    MalformedCode { code: String, reason: String },

    /// A puzzle's compact code failed to parse.
    MalformedPuzzle { reason: String },

    /// An index or count argument fell outside its valid range.
    OutOfRangeIndex { what: String, value: i64, bound: String },

    /// A pair/scope was not given in canonical (ascending, deduplicated) order.
    NonCanonicalPair { code: String },

    /// A loaded truth-table cache disagreed with the requested N or library.
    CacheIncompatible { reason: String },

    /// The generator exhausted its attempt budget without finding a unique puzzle.
    GenerationExhausted { attempts: u32 },

    /// Two independent verification paths disagreed, or the stored solution
    /// was not in fact the unique model. This is a bug, never retried.
    VerifierInconsistency { reason: String },

    /// The SMT check did not terminate within its time bound.
    VerifierTimeout { seconds: u64 },
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::MalformedCode { code, reason } => {
                write!(f, "malformed statement code '{code}': {reason}")
            }
            PuzzleError::MalformedPuzzle { reason } => {
                write!(f, "malformed puzzle code: {reason}")
            }
            PuzzleError::OutOfRangeIndex { what, value, bound } => {
                write!(f, "{what} = {value} is out of range ({bound})")
            }
            PuzzleError::NonCanonicalPair { code } => {
                write!(f, "'{code}' is not in canonical order")
            }
            PuzzleError::CacheIncompatible { reason } => {
                write!(f, "incompatible truth-table cache: {reason}")
            }
            PuzzleError::GenerationExhausted { attempts } => {
                write!(
                    f,
                    "generation exhausted after {attempts} attempt(s) without a unique puzzle; \
                     widen the config or raise max-attempts"
                )
            }
            PuzzleError::VerifierInconsistency { reason } => {
                write!(f, "verifier inconsistency (this is a bug): {reason}")
            }
            PuzzleError::VerifierTimeout { seconds } => {
                write!(f, "SMT verifier did not terminate within {seconds}s")
            }
        }
    }
}

impl std::error::Error for PuzzleError {}
