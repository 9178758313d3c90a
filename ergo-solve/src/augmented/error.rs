use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur during an augmented Lagrangian solve.
///
/// Non-convergence is not among them: exhausting the outer budget still
/// produces a [`Solution`](super::Solution) carrying the last iterate and
/// the diagnostic history.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("problem evaluation failed")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(super) fn problem<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Problem(Box::new(err))
    }
}
