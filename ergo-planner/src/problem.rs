use std::convert::Infallible;

use ndarray::{Array1, Array2, Array3};

use ergo_core::{
    BasisSet, Dynamics, ErgodicMetric, SingleIntegrator, SpatialProjector, Trajectory,
};
use ergo_solve::{augmented, ConstrainedProblem};

use crate::{
    config::{EndpointCondition, PlannerConfig},
    error::PlannerError,
};

const STATE_DIM: usize = 2;
const CONTROL_DIM: usize = 2;
const STRIDE: usize = STATE_DIM + CONTROL_DIM;

/// The outcome of solving a trajectory problem.
#[derive(Debug, Clone)]
pub struct Plan {
    /// The planned trajectory, best effort if the solver hit its budget.
    pub trajectory: Trajectory,
    /// Final solver status.
    pub status: augmented::Status,
    /// Per-outer-iteration diagnostics (loss, constraint-violation norm).
    pub history: Vec<augmented::OuterRecord>,
    /// Outer iterations completed.
    pub outer_iters: usize,
}

/// A multi-agent ergodic coverage problem over a target density.
///
/// Construction validates the configuration, projects the density grid into
/// target coefficients (once), and builds a deterministic initial guess:
/// states linearly interpolated from each agent's start to its endpoint,
/// controls zero. No iterative work happens until [`TrajectoryProblem::solve`]
/// is called.
///
/// The loss is a weighted sum of the ergodic metric between achieved and
/// target coefficients, the mean squared control magnitude, and a smooth
/// quadratic barrier on excursions of mapped positions beyond the unit
/// square. Equality residuals pin the initial and final states and enforce
/// dynamics consistency step by step; inequality residuals bound each
/// control component's magnitude.
#[derive(Debug, Clone)]
pub struct TrajectoryProblem {
    config: PlannerConfig,
    dynamics: SingleIntegrator,
    metric: ErgodicMetric,
    projector: SpatialProjector,
    target: Array1<f64>,
    starts: Vec<[f64; 2]>,
    ends: Vec<[f64; 2]>,
    initial: Array1<f64>,
}

impl TrajectoryProblem {
    /// Assembles a problem from per-agent start positions, a target density
    /// grid, and a configuration.
    ///
    /// Start positions are in raw workspace coordinates; the configured
    /// exploration map takes them into the unit square.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidConfiguration`] for degenerate
    /// configurations or an empty agent list, and
    /// [`PlannerError::Projection`] if the density grid shape disagrees
    /// with the configured sampling resolution.
    pub fn new(
        starts: &[[f64; 2]],
        density: &Array2<f64>,
        config: PlannerConfig,
    ) -> Result<Self, PlannerError> {
        if starts.is_empty() {
            return Err(PlannerError::InvalidConfiguration {
                reason: "at least one agent is required",
            });
        }
        config
            .validate()
            .map_err(|reason| PlannerError::InvalidConfiguration { reason })?;

        let ends = match &config.endpoint {
            EndpointCondition::ReturnToStart => starts.to_vec(),
            EndpointCondition::Fixed(positions) => {
                if positions.len() != starts.len() {
                    return Err(PlannerError::InvalidConfiguration {
                        reason: "endpoint positions must match the agent count",
                    });
                }
                positions.clone()
            }
        };

        let basis = BasisSet::new(config.basis_resolution)?;
        let metric = ErgodicMetric::new(&basis);
        let projector = SpatialProjector::new(basis, config.sampling_resolution)?;
        let target = projector.project_density(density)?;

        let initial = initial_guess(starts, &ends, config.horizon).to_flat();

        Ok(Self {
            config,
            dynamics: SingleIntegrator::planar(),
            metric,
            projector,
            target,
            starts: starts.to_vec(),
            ends,
            initial,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn agents(&self) -> usize {
        self.starts.len()
    }

    /// Target coefficients projected from the density grid at construction.
    pub fn target_coefficients(&self) -> &Array1<f64> {
        &self.target
    }

    /// The deterministic initial guess the solver starts from.
    pub fn initial_trajectory(&self) -> Trajectory {
        self.unpack(&self.initial)
    }

    /// Achieved coefficients of an arbitrary trajectory under this
    /// problem's basis and exploration map.
    pub fn achieved_coefficients(&self, trajectory: &Trajectory) -> Array1<f64> {
        let map = &self.config.exploration_map;
        let mut points = Vec::with_capacity(trajectory.horizon() * trajectory.agents());
        for t in 0..trajectory.horizon() {
            for a in 0..trajectory.agents() {
                let x = [
                    trajectory.states()[[t, a, 0]],
                    trajectory.states()[[t, a, 1]],
                ];
                points.push(map.to_unit(x));
            }
        }
        self.projector.project_points(&points)
    }

    /// Runs the augmented Lagrangian solver on the assembled problem.
    ///
    /// Non-convergence is reported through the plan's status, never as an
    /// error; the returned trajectory is the solver's last iterate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the solver config is invalid.
    pub fn solve(&self, solver: &augmented::Config) -> Result<Plan, augmented::Error> {
        let solution = augmented::solve(self, self.initial.clone(), solver)?;
        Ok(Plan {
            trajectory: self.unpack(&solution.z),
            status: solution.status,
            history: solution.history,
            outer_iters: solution.outer_iters,
        })
    }

    fn horizon(&self) -> usize {
        self.config.horizon
    }

    /// Flat offset of the `[state.., control..]` block for `(t, agent)`.
    fn base(&self, t: usize, agent: usize) -> usize {
        (t * self.agents() + agent) * STRIDE
    }

    fn position(&self, z: &Array1<f64>, t: usize, agent: usize) -> [f64; 2] {
        let base = self.base(t, agent);
        [z[base], z[base + 1]]
    }

    fn control(&self, z: &Array1<f64>, t: usize, agent: usize) -> [f64; 2] {
        let base = self.base(t, agent);
        [z[base + STATE_DIM], z[base + STATE_DIM + 1]]
    }

    /// All positions mapped into the unit square, time-major then by agent.
    fn mapped_points(&self, z: &Array1<f64>) -> Vec<[f64; 2]> {
        let map = &self.config.exploration_map;
        let mut points = Vec::with_capacity(self.horizon() * self.agents());
        for t in 0..self.horizon() {
            for a in 0..self.agents() {
                points.push(map.to_unit(self.position(z, t, a)));
            }
        }
        points
    }

    fn unpack(&self, z: &Array1<f64>) -> Trajectory {
        Trajectory::from_flat(z, self.horizon(), self.agents(), STATE_DIM, CONTROL_DIM)
            .expect("solver variable length is fixed at construction")
    }

    fn control_entries(&self) -> usize {
        self.horizon() * self.agents() * CONTROL_DIM
    }
}

/// States linearly interpolated from start to end per agent, controls zero.
fn initial_guess(starts: &[[f64; 2]], ends: &[[f64; 2]], horizon: usize) -> Trajectory {
    let agents = starts.len();
    let states = Array3::from_shape_fn((horizon, agents, STATE_DIM), |(t, a, d)| {
        let alpha = if horizon > 1 {
            t as f64 / (horizon - 1) as f64
        } else {
            0.0
        };
        starts[a][d] + alpha * (ends[a][d] - starts[a][d])
    });
    let controls = Array3::zeros((horizon, agents, CONTROL_DIM));
    Trajectory::new(states, controls).expect("state and control tensors agree by construction")
}

/// Signed excursion beyond the unit interval: positive above 1, positive
/// below 0, zero inside.
fn excursion(e: f64) -> f64 {
    (e - 1.0).max(0.0) + (-e).max(0.0)
}

impl ConstrainedProblem for TrajectoryProblem {
    type Error = Infallible;

    fn loss(&self, z: &Array1<f64>) -> Result<f64, Self::Error> {
        let points = self.mapped_points(z);
        let achieved = self.projector.project_points(&points);
        let ergodic = self.metric.evaluate(&achieved, &self.target);

        let mut control_sq = 0.0;
        for t in 0..self.horizon() {
            for a in 0..self.agents() {
                let u = self.control(z, t, a);
                control_sq += u[0] * u[0] + u[1] * u[1];
            }
        }
        let control = control_sq / self.control_entries() as f64;

        let barrier: f64 = points
            .iter()
            .map(|e| {
                let ex = excursion(e[0]);
                let ey = excursion(e[1]);
                ex * ex + ey * ey
            })
            .sum();

        Ok(self.config.ergodic_weight * ergodic + self.config.control_weight * control + barrier)
    }

    fn loss_gradient(&self, z: &Array1<f64>, grad: &mut Array1<f64>) -> Result<(), Self::Error> {
        let points = self.mapped_points(z);
        let achieved = self.projector.project_points(&points);
        let basis = self.projector.basis();
        let weights = self.metric.weights();
        let count = points.len() as f64;
        let jacobian = self.config.exploration_map.jacobian();

        // Per-index chain factor for d(ergodic)/d(mapped position):
        // c_k = (1/P)·Σ f_k(e)/h_k, so each point contributes
        // 2·q·w_k·(c_k − φ_k)·∇f_k(e)/(P·h_k).
        let factors: Vec<f64> = basis
            .normalizations()
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                2.0 * self.config.ergodic_weight * weights[i] * (achieved[i] - self.target[i])
                    / (count * h)
            })
            .collect();

        for (p, e) in points.iter().enumerate() {
            let t = p / self.agents();
            let a = p % self.agents();
            let mut acc = [0.0f64; 2];

            for (i, &k) in basis.indices().iter().enumerate() {
                let g = basis.gradient(*e, k);
                acc[0] += factors[i] * g[0];
                acc[1] += factors[i] * g[1];
            }

            for d in 0..STATE_DIM {
                let ex = excursion(e[d]);
                if ex > 0.0 {
                    let sign = if e[d] > 1.0 { 1.0 } else { -1.0 };
                    acc[d] += 2.0 * ex * sign;
                }
            }

            let base = self.base(t, a);
            grad[base] += acc[0] * jacobian;
            grad[base + 1] += acc[1] * jacobian;
        }

        let control_scale = 2.0 * self.config.control_weight / self.control_entries() as f64;
        for t in 0..self.horizon() {
            for a in 0..self.agents() {
                let base = self.base(t, a);
                let u = self.control(z, t, a);
                grad[base + STATE_DIM] += control_scale * u[0];
                grad[base + STATE_DIM + 1] += control_scale * u[1];
            }
        }

        Ok(())
    }

    fn eq_residuals(&self, z: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        let horizon = self.horizon();
        let agents = self.agents();
        let dt = self.config.time_step;
        let mut residuals = Vec::with_capacity(STATE_DIM * agents * (horizon + 1));

        for (a, start) in self.starts.iter().enumerate() {
            let x = self.position(z, 0, a);
            residuals.push(x[0] - start[0]);
            residuals.push(x[1] - start[1]);
        }

        let mut next = [0.0f64; STATE_DIM];
        for t in 0..horizon - 1 {
            for a in 0..agents {
                let x = self.position(z, t, a);
                let u = self.control(z, t, a);
                self.dynamics.step(&x, &u, dt, &mut next);
                let xn = self.position(z, t + 1, a);
                residuals.push(xn[0] - next[0]);
                residuals.push(xn[1] - next[1]);
            }
        }

        for (a, end) in self.ends.iter().enumerate() {
            let x = self.position(z, horizon - 1, a);
            residuals.push(x[0] - end[0]);
            residuals.push(x[1] - end[1]);
        }

        Ok(Array1::from(residuals))
    }

    fn ineq_residuals(&self, z: &Array1<f64>) -> Result<Array1<f64>, Self::Error> {
        let bound = self.config.control_bound;
        let mut residuals = Vec::with_capacity(self.control_entries());
        for t in 0..self.horizon() {
            for a in 0..self.agents() {
                let u = self.control(z, t, a);
                residuals.push(u[0].abs() - bound);
                residuals.push(u[1].abs() - bound);
            }
        }
        Ok(Array1::from(residuals))
    }

    fn eq_gradient(
        &self,
        _z: &Array1<f64>,
        y: &Array1<f64>,
        grad: &mut Array1<f64>,
    ) -> Result<(), Self::Error> {
        let horizon = self.horizon();
        let agents = self.agents();
        let dt = self.config.time_step;
        let mut i = 0;

        for a in 0..agents {
            let base = self.base(0, a);
            grad[base] += y[i];
            grad[base + 1] += y[i + 1];
            i += 2;
        }

        for t in 0..horizon - 1 {
            for a in 0..agents {
                let yk = [y[i], y[i + 1]];
                let next_base = self.base(t + 1, a);
                grad[next_base] += yk[0];
                grad[next_base + 1] += yk[1];

                // The residual subtracts the stepped state, so the pullback
                // through the dynamics enters with a negated cotangent.
                let neg = [-yk[0], -yk[1]];
                let mut state_grad = [0.0f64; STATE_DIM];
                let mut control_grad = [0.0f64; CONTROL_DIM];
                self.dynamics
                    .step_vjp(&neg, dt, &mut state_grad, &mut control_grad);

                let base = self.base(t, a);
                grad[base] += state_grad[0];
                grad[base + 1] += state_grad[1];
                grad[base + STATE_DIM] += control_grad[0];
                grad[base + STATE_DIM + 1] += control_grad[1];
                i += 2;
            }
        }

        for a in 0..agents {
            let base = self.base(horizon - 1, a);
            grad[base] += y[i];
            grad[base + 1] += y[i + 1];
            i += 2;
        }

        Ok(())
    }

    fn ineq_gradient(
        &self,
        z: &Array1<f64>,
        y: &Array1<f64>,
        grad: &mut Array1<f64>,
    ) -> Result<(), Self::Error> {
        let mut i = 0;
        for t in 0..self.horizon() {
            for a in 0..self.agents() {
                let base = self.base(t, a);
                let u = self.control(z, t, a);
                for d in 0..CONTROL_DIM {
                    let sign = if u[d] > 0.0 {
                        1.0
                    } else if u[d] < 0.0 {
                        -1.0
                    } else {
                        0.0
                    };
                    grad[base + STATE_DIM + d] += y[i] * sign;
                    i += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ergo_core::ExplorationMap;

    fn small_config() -> PlannerConfig {
        PlannerConfig {
            horizon: 5,
            time_step: 0.1,
            basis_resolution: [2, 2],
            sampling_resolution: [8, 8],
            ergodic_weight: 10.0,
            control_weight: 1.0,
            control_bound: 2.0,
            exploration_map: ExplorationMap::identity(),
            endpoint: EndpointCondition::Fixed(vec![[0.9, 0.8]]),
        }
    }

    fn small_problem() -> TrajectoryProblem {
        let density =
            Array2::from_shape_fn((8, 8), |(i, j)| 0.1 + i as f64 * 0.05 + j as f64 * 0.02);
        TrajectoryProblem::new(&[[0.1, 0.2]], &density, small_config()).unwrap()
    }

    /// A deterministic iterate with positions well inside the unit square
    /// and controls away from zero, so every loss term is smooth at it.
    fn interior_iterate(problem: &TrajectoryProblem) -> Array1<f64> {
        let mut z = problem.initial.clone();
        for t in 0..problem.horizon() {
            for a in 0..problem.agents() {
                let base = problem.base(t, a);
                let phase = (t * problem.agents() + a) as f64;
                z[base] = 0.3 + 0.25 * (1.3 * phase).sin();
                z[base + 1] = 0.4 + 0.2 * (0.7 * phase + 0.5).cos();
                z[base + 2] = 0.6 + 0.3 * (phase + 0.2).sin();
                z[base + 3] = -0.5 + 0.2 * (2.1 * phase).cos();
            }
        }
        z
    }

    #[test]
    fn rejects_empty_agent_list() {
        let density = Array2::zeros((8, 8));
        let result = TrajectoryProblem::new(&[], &density, small_config());
        assert!(matches!(
            result,
            Err(PlannerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_endpoint_count_mismatch() {
        let density = Array2::zeros((8, 8));
        let config = PlannerConfig {
            endpoint: EndpointCondition::Fixed(vec![[0.0, 0.0], [1.0, 1.0]]),
            ..small_config()
        };
        let result = TrajectoryProblem::new(&[[0.1, 0.2]], &density, config);
        assert!(matches!(
            result,
            Err(PlannerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_density_shape() {
        let density = Array2::zeros((4, 4));
        let result = TrajectoryProblem::new(&[[0.1, 0.2]], &density, small_config());
        assert!(matches!(result, Err(PlannerError::Projection(_))));
    }

    #[test]
    fn initial_guess_interpolates_linearly_with_zero_controls() {
        let problem = small_problem();
        let traj = problem.initial_trajectory();

        assert_relative_eq!(traj.states()[[0, 0, 0]], 0.1);
        assert_relative_eq!(traj.states()[[0, 0, 1]], 0.2);
        assert_relative_eq!(traj.states()[[4, 0, 0]], 0.9);
        assert_relative_eq!(traj.states()[[4, 0, 1]], 0.8);
        // Midpoint of the interpolation.
        assert_relative_eq!(traj.states()[[2, 0, 0]], 0.5);
        assert_relative_eq!(traj.states()[[2, 0, 1]], 0.5);
        assert!(traj.controls().iter().all(|&u| u == 0.0));
    }

    #[test]
    fn solver_variable_round_trips_through_the_trajectory_layout() {
        let problem = small_problem();
        // The flat vector the solver iterates on and the packed trajectory
        // view must describe the same data.
        assert_eq!(problem.initial_trajectory().to_flat(), problem.initial);

        let z = interior_iterate(&problem);
        let traj = problem.unpack(&z);
        for t in 0..problem.horizon() {
            let x = problem.position(&z, t, 0);
            let u = problem.control(&z, t, 0);
            assert_relative_eq!(traj.states()[[t, 0, 0]], x[0]);
            assert_relative_eq!(traj.states()[[t, 0, 1]], x[1]);
            assert_relative_eq!(traj.controls()[[t, 0, 0]], u[0]);
            assert_relative_eq!(traj.controls()[[t, 0, 1]], u[1]);
        }
    }

    #[test]
    fn pins_are_satisfied_at_the_initial_guess() {
        let problem = small_problem();
        let residuals = problem.eq_residuals(&problem.initial).unwrap();
        // First and last two entries are the start and end pins.
        assert_relative_eq!(residuals[0], 0.0);
        assert_relative_eq!(residuals[1], 0.0);
        let n = residuals.len();
        assert_relative_eq!(residuals[n - 2], 0.0);
        assert_relative_eq!(residuals[n - 1], 0.0);
    }

    #[test]
    fn loss_gradient_matches_finite_differences() {
        let problem = small_problem();
        let z = interior_iterate(&problem);

        let mut grad = Array1::zeros(z.len());
        problem.loss_gradient(&z, &mut grad).unwrap();

        let eps = 1e-6;
        for i in 0..z.len() {
            let mut zp = z.clone();
            zp[i] += eps;
            let mut zm = z.clone();
            zm[i] -= eps;
            let fd =
                (problem.loss(&zp).unwrap() - problem.loss(&zm).unwrap()) / (2.0 * eps);
            assert_relative_eq!(grad[i], fd, epsilon = 1e-6, max_relative = 1e-5);
        }
    }

    #[test]
    fn barrier_gradient_matches_finite_differences_outside_the_domain() {
        let problem = small_problem();
        let mut z = interior_iterate(&problem);
        // Push one position well outside the unit square, clear of the
        // barrier kinks at 0 and 1.
        let base = problem.base(2, 0);
        z[base] = 1.3;
        z[base + 1] = -0.2;

        let mut grad = Array1::zeros(z.len());
        problem.loss_gradient(&z, &mut grad).unwrap();

        let eps = 1e-6;
        for i in [base, base + 1] {
            let mut zp = z.clone();
            zp[i] += eps;
            let mut zm = z.clone();
            zm[i] -= eps;
            let fd =
                (problem.loss(&zp).unwrap() - problem.loss(&zm).unwrap()) / (2.0 * eps);
            assert_relative_eq!(grad[i], fd, epsilon = 1e-6, max_relative = 1e-5);
        }
    }

    #[test]
    fn eq_gradient_matches_finite_differences() {
        let problem = small_problem();
        let z = interior_iterate(&problem);
        let residuals = problem.eq_residuals(&z).unwrap();
        let y = Array1::from_shape_fn(residuals.len(), |i| 0.5 + (i as f64 * 0.9).sin());

        let mut grad = Array1::zeros(z.len());
        problem.eq_gradient(&z, &y, &mut grad).unwrap();

        // y·g_eq is linear in z, so central differences are exact.
        let eps = 1e-5;
        for i in 0..z.len() {
            let mut zp = z.clone();
            zp[i] += eps;
            let mut zm = z.clone();
            zm[i] -= eps;
            let fd = (y.dot(&problem.eq_residuals(&zp).unwrap())
                - y.dot(&problem.eq_residuals(&zm).unwrap()))
                / (2.0 * eps);
            assert_relative_eq!(grad[i], fd, epsilon = 1e-8, max_relative = 1e-8);
        }
    }

    #[test]
    fn ineq_gradient_matches_finite_differences() {
        let problem = small_problem();
        let z = interior_iterate(&problem);
        let residuals = problem.ineq_residuals(&z).unwrap();
        let y = Array1::from_shape_fn(residuals.len(), |i| 0.25 + (i as f64 * 1.7).cos());

        let mut grad = Array1::zeros(z.len());
        problem.ineq_gradient(&z, &y, &mut grad).unwrap();

        let eps = 1e-6;
        for i in 0..z.len() {
            let mut zp = z.clone();
            zp[i] += eps;
            let mut zm = z.clone();
            zm[i] -= eps;
            let fd = (y.dot(&problem.ineq_residuals(&zp).unwrap())
                - y.dot(&problem.ineq_residuals(&zm).unwrap()))
                / (2.0 * eps);
            assert_relative_eq!(grad[i], fd, epsilon = 1e-8, max_relative = 1e-6);
        }
    }

    #[test]
    fn dynamics_residuals_vanish_on_a_consistent_rollout() {
        let problem = small_problem();
        let dt = problem.config.time_step;
        let mut z = problem.initial.clone();

        // Roll the dynamics forward from the start with fixed controls and
        // overwrite the states accordingly.
        let u = [0.3, -0.2];
        let mut x = problem.starts[0];
        for t in 0..problem.horizon() {
            let base = problem.base(t, 0);
            z[base] = x[0];
            z[base + 1] = x[1];
            z[base + 2] = u[0];
            z[base + 3] = u[1];
            x = [x[0] + dt * u[0], x[1] + dt * u[1]];
        }

        let residuals = problem.eq_residuals(&z).unwrap();
        let agents = problem.agents();
        let dynamics = &residuals.as_slice().unwrap()
            [2 * agents..residuals.len() - 2 * agents];
        for &r in dynamics {
            assert_relative_eq!(r, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn target_coefficients_match_direct_projection() {
        let density =
            Array2::from_shape_fn((8, 8), |(i, j)| 0.1 + i as f64 * 0.05 + j as f64 * 0.02);
        let problem = TrajectoryProblem::new(&[[0.1, 0.2]], &density, small_config()).unwrap();

        let basis = BasisSet::new([2, 2]).unwrap();
        let projector = SpatialProjector::new(basis, [8, 8]).unwrap();
        let expected = projector.project_density(&density).unwrap();

        for (c, e) in problem.target_coefficients().iter().zip(expected.iter()) {
            assert_relative_eq!(c, e);
        }
    }
}
