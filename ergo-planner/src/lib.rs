//! Multi-agent ergodic coverage trajectory planning.
//!
//! [`TrajectoryProblem`] assembles the pieces from `ergo-core` into a
//! constrained optimization problem: a loss rewarding spectral coverage of a
//! target density, equality residuals pinning endpoints and enforcing
//! single-integrator dynamics, and inequality residuals bounding control
//! magnitudes. The assembled problem is solved by the augmented Lagrangian
//! method from `ergo-solve`.
//!
//! Construction and solving are deliberately separate: building a
//! [`TrajectoryProblem`] validates inputs and computes the target
//! coefficients once, while the potentially expensive iteration only runs
//! when [`TrajectoryProblem::solve`] is called.
//!
//! ```no_run
//! use ergo_planner::{PlannerConfig, TrajectoryProblem};
//! use ergo_solve::augmented;
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let density = Array2::from_elem((100, 100), 1.0);
//! let starts = [[10.0, 37.0], [-15.0, 1.0]];
//!
//! let problem = TrajectoryProblem::new(&starts, &density, PlannerConfig::default())?;
//! let plan = problem.solve(&augmented::Config::default())?;
//!
//! println!("{:?} after {} outer iterations", plan.status, plan.outer_iters);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod problem;

pub use config::{EndpointCondition, PlannerConfig};
pub use error::PlannerError;
pub use problem::{Plan, TrajectoryProblem};
