//! Core types for ergodic coverage trajectory optimization.
//!
//! An ergodic trajectory is one whose time-averaged spatial occupancy matches
//! a target density over the exploration domain. This crate provides the
//! pieces that give that statement a computable form: a cosine basis over the
//! unit square ([`BasisSet`]), projections of densities and trajectories onto
//! that basis ([`SpatialProjector`]), the frequency-weighted distance between
//! the two projections ([`ErgodicMetric`]), and the kinematics that constrain
//! how agents move ([`Dynamics`], [`SingleIntegrator`]).
//!
//! The constrained solver that ties these together lives in `ergo-solve`;
//! problem assembly lives in `ergo-planner`.

pub mod basis;
pub mod dynamics;
pub mod exploration;
pub mod metric;
pub mod projector;
pub mod trajectory;

pub use basis::{BasisError, BasisSet};
pub use dynamics::{Dynamics, SingleIntegrator};
pub use exploration::ExplorationMap;
pub use metric::ErgodicMetric;
pub use projector::{ProjectionError, SpatialProjector};
pub use trajectory::{Trajectory, TrajectoryError};
