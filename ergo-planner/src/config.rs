use ergo_core::ExplorationMap;

/// Where each agent's trajectory must end.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndpointCondition {
    /// Pin the final state back to the initial state (closed-loop
    /// exploration).
    #[default]
    ReturnToStart,
    /// Pin each agent's final state to a fixed position, in the same raw
    /// coordinates as the start positions. Must supply one position per
    /// agent.
    Fixed(Vec<[f64; 2]>),
}

/// Configuration for a [`TrajectoryProblem`](crate::TrajectoryProblem).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Number of time steps in the planned trajectory.
    pub horizon: usize,
    /// Integrator time step.
    pub time_step: f64,
    /// Basis functions per dimension.
    pub basis_resolution: [usize; 2],
    /// Density sampling grid as `[rows, cols]`; supplied density grids must
    /// match this shape exactly.
    pub sampling_resolution: [usize; 2],
    /// Weight of the ergodic metric in the loss. Large relative to the
    /// other terms by default.
    pub ergodic_weight: f64,
    /// Weight of the mean squared control magnitude in the loss.
    pub control_weight: f64,
    /// Per-component bound on control magnitude, enforced as the inequality
    /// `|u| − control_bound ≤ 0`. Caller-overridable; whether it should be
    /// read as a true actuation limit or a per-step displacement limit is
    /// up to the caller and the chosen `time_step`.
    pub control_bound: f64,
    /// Map from raw workspace coordinates into the unit square.
    pub exploration_map: ExplorationMap,
    /// Final-state boundary condition.
    pub endpoint: EndpointCondition,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            horizon: 50,
            time_step: 0.1,
            basis_resolution: [5, 5],
            sampling_resolution: [100, 100],
            ergodic_weight: 100.0,
            control_weight: 1.0,
            control_bound: 10.0,
            exploration_map: ExplorationMap::default(),
            endpoint: EndpointCondition::ReturnToStart,
        }
    }
}

impl PlannerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated requirement.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.horizon == 0 {
            return Err("time horizon must be positive");
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err("time_step must be finite and positive");
        }
        if self.basis_resolution[0] == 0 || self.basis_resolution[1] == 0 {
            return Err("basis resolution must be positive in every dimension");
        }
        if self.sampling_resolution[0] == 0 || self.sampling_resolution[1] == 0 {
            return Err("sampling resolution must be positive in every dimension");
        }
        if !self.ergodic_weight.is_finite() || self.ergodic_weight < 0.0 {
            return Err("ergodic_weight must be finite and non-negative");
        }
        if !self.control_weight.is_finite() || self.control_weight < 0.0 {
            return Err("control_weight must be finite and non-negative");
        }
        if !self.control_bound.is_finite() || self.control_bound <= 0.0 {
            return Err("control_bound must be finite and positive");
        }
        if !self.exploration_map.offset.is_finite() {
            return Err("exploration map offset must be finite");
        }
        if !self.exploration_map.scale.is_finite() || self.exploration_map.scale <= 0.0 {
            return Err("exploration map scale must be finite and positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(PlannerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_values() {
        let cases = [
            PlannerConfig {
                horizon: 0,
                ..PlannerConfig::default()
            },
            PlannerConfig {
                time_step: 0.0,
                ..PlannerConfig::default()
            },
            PlannerConfig {
                basis_resolution: [0, 5],
                ..PlannerConfig::default()
            },
            PlannerConfig {
                sampling_resolution: [100, 0],
                ..PlannerConfig::default()
            },
            PlannerConfig {
                ergodic_weight: f64::NAN,
                ..PlannerConfig::default()
            },
            PlannerConfig {
                control_bound: -10.0,
                ..PlannerConfig::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err());
        }
    }
}
