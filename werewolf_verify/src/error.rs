//! SMT verification error types.

use std::fmt;

/// Result type for verification operations.
pub type VerificationResult<T = ()> = Result<T, VerificationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationError {
    /// The solver found the expected model was not in fact satisfiable —
    /// the puzzle's stated solution does not satisfy its own role semantics.
    ExpectedModelUnsat,

    /// The solver found a satisfying model, but it disagreed with the
    /// expected one on at least one villager (or the shill).
    ModelMismatch { detail: String },

    /// Blocking the expected model and re-checking still returned SAT —
    /// a second, different model exists, so the puzzle is not unique.
    SecondModelExists,

    /// Z3 returned `Unknown` (timeout or undecidable within the bound).
    SolverUnknown,

    /// Z3 initialization or internal error.
    SolverError { message: String },
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationError::ExpectedModelUnsat => {
                write!(f, "the expected solution does not satisfy the role-semantics encoding")
            }
            VerificationError::ModelMismatch { detail } => {
                write!(f, "solver model disagrees with the expected solution: {detail}")
            }
            VerificationError::SecondModelExists => {
                write!(f, "a second model survives after blocking the expected one; solution is not unique")
            }
            VerificationError::SolverUnknown => {
                write!(f, "solver returned unknown within the time bound")
            }
            VerificationError::SolverError { message } => write!(f, "solver error: {message}"),
        }
    }
}

impl std::error::Error for VerificationError {}
