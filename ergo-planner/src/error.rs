use ergo_core::{BasisError, ProjectionError};
use thiserror::Error;

/// Errors that can occur when assembling a trajectory problem.
///
/// All variants are raised at construction, before any optimization work;
/// the caller can correct the input and retry. Non-convergence of the
/// solver is not an error (see `ergo_solve::augmented::Status`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },

    /// The density grid shape disagrees with the configured sampling
    /// resolution, or the resolution itself is degenerate.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Basis(#[from] BasisError),
}
