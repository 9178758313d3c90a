//! Constrained numerical solvers for the ergo framework.
//!
//! The solver in this crate is generic: it knows nothing about trajectories
//! or coverage. It minimizes a loss over a flat variable vector subject to
//! equality and inequality residuals, supplied through the
//! [`ConstrainedProblem`] trait together with their analytic gradients.

mod problem;

pub mod augmented;

pub use problem::ConstrainedProblem;
