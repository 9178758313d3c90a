use ndarray::{Array1, Array3};
use thiserror::Error;

/// Errors that can occur when constructing a [`Trajectory`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryError {
    #[error("states have horizon {state_horizon} and {state_agents} agents, controls have horizon {control_horizon} and {control_agents} agents")]
    DimensionMismatch {
        state_horizon: usize,
        state_agents: usize,
        control_horizon: usize,
        control_agents: usize,
    },

    #[error("flat vector of length {actual} does not match trajectory size {expected}")]
    FlatLengthMismatch { expected: usize, actual: usize },
}

/// A finite-horizon plan of per-agent states and controls.
///
/// Shaped `[horizon][agents][dim]` for both arrays; horizon and agent count
/// must agree between states and controls, and dimensions are fixed per run
/// and equal across agents and time steps by construction.
///
/// The solver works on a flattened copy of this data (see
/// [`Trajectory::to_flat`]); once a solve returns, the trajectory is
/// read-only output.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    states: Array3<f64>,
    controls: Array3<f64>,
}

impl Trajectory {
    /// Creates a trajectory from state and control tensors.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::DimensionMismatch`] if the horizon or
    /// agent count differ between the two tensors.
    pub fn new(states: Array3<f64>, controls: Array3<f64>) -> Result<Self, TrajectoryError> {
        let (sh, sa, _) = states.dim();
        let (ch, ca, _) = controls.dim();
        if sh != ch || sa != ca {
            return Err(TrajectoryError::DimensionMismatch {
                state_horizon: sh,
                state_agents: sa,
                control_horizon: ch,
                control_agents: ca,
            });
        }
        Ok(Self { states, controls })
    }

    pub fn horizon(&self) -> usize {
        self.states.dim().0
    }

    pub fn agents(&self) -> usize {
        self.states.dim().1
    }

    pub fn state_dim(&self) -> usize {
        self.states.dim().2
    }

    pub fn control_dim(&self) -> usize {
        self.controls.dim().2
    }

    pub fn states(&self) -> &Array3<f64> {
        &self.states
    }

    pub fn controls(&self) -> &Array3<f64> {
        &self.controls
    }

    /// Flattens into the solver variable layout: time-major, then agent,
    /// then state entries followed by control entries.
    pub fn to_flat(&self) -> Array1<f64> {
        let (horizon, agents, sd) = self.states.dim();
        let cd = self.controls.dim().2;
        let mut flat = Vec::with_capacity(horizon * agents * (sd + cd));
        for t in 0..horizon {
            for a in 0..agents {
                for d in 0..sd {
                    flat.push(self.states[[t, a, d]]);
                }
                for d in 0..cd {
                    flat.push(self.controls[[t, a, d]]);
                }
            }
        }
        Array1::from(flat)
    }

    /// Rebuilds a trajectory from the solver variable layout.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::FlatLengthMismatch`] if the vector length
    /// disagrees with the requested shape.
    pub fn from_flat(
        flat: &Array1<f64>,
        horizon: usize,
        agents: usize,
        state_dim: usize,
        control_dim: usize,
    ) -> Result<Self, TrajectoryError> {
        let stride = state_dim + control_dim;
        let expected = horizon * agents * stride;
        if flat.len() != expected {
            return Err(TrajectoryError::FlatLengthMismatch {
                expected,
                actual: flat.len(),
            });
        }

        let mut states = Array3::zeros((horizon, agents, state_dim));
        let mut controls = Array3::zeros((horizon, agents, control_dim));
        for t in 0..horizon {
            for a in 0..agents {
                let base = (t * agents + a) * stride;
                for d in 0..state_dim {
                    states[[t, a, d]] = flat[base + d];
                }
                for d in 0..control_dim {
                    controls[[t, a, d]] = flat[base + state_dim + d];
                }
            }
        }
        Ok(Self { states, controls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_tensors() {
        let states = Array3::zeros((10, 2, 2));
        let controls = Array3::zeros((9, 2, 2));
        assert!(matches!(
            Trajectory::new(states, controls),
            Err(TrajectoryError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn flat_round_trip_preserves_layout() {
        let states = Array3::from_shape_fn((4, 3, 2), |(t, a, d)| (t * 100 + a * 10 + d) as f64);
        let controls =
            Array3::from_shape_fn((4, 3, 2), |(t, a, d)| -((t * 100 + a * 10 + d) as f64));
        let traj = Trajectory::new(states, controls).unwrap();

        let flat = traj.to_flat();
        assert_eq!(flat.len(), 4 * 3 * 4);
        // First block is agent 0 at t = 0: state entries then controls.
        assert_eq!(flat[0], 0.0);
        assert_eq!(flat[1], 1.0);
        assert_eq!(flat[2], -0.0);
        assert_eq!(flat[3], -1.0);

        let rebuilt = Trajectory::from_flat(&flat, 4, 3, 2, 2).unwrap();
        assert_eq!(rebuilt, traj);
    }

    #[test]
    fn rejects_wrong_flat_length() {
        let flat = Array1::zeros(11);
        assert_eq!(
            Trajectory::from_flat(&flat, 3, 1, 2, 2),
            Err(TrajectoryError::FlatLengthMismatch {
                expected: 12,
                actual: 11,
            })
        );
    }
}
