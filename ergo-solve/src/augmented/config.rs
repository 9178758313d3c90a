/// Configuration for the augmented Lagrangian solver.
///
/// All hyperparameters are explicit and immutable for the duration of a
/// solve. The solver does not guard against divergence from a mismatched
/// `step_size`/`penalty_growth` pair; those are caller-tuned.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Outer multiplier/penalty iterations to run at most.
    pub max_outer_iters: usize,
    /// First-order descent steps per inner minimization.
    pub max_inner_iters: usize,
    /// Fixed inner descent step size.
    pub step_size: f64,
    /// Initial penalty coefficient `c₀`.
    pub initial_penalty: f64,
    /// Factor applied to the penalty when the violation norm stalls.
    pub penalty_growth: f64,
    /// Required per-outer-iteration decrease ratio of the violation norm;
    /// anything above `violation_ratio · previous` triggers penalty growth.
    pub violation_ratio: f64,
    /// Constraint-violation norm below which constraints count as satisfied.
    pub constraint_tol: f64,
    /// Augmented-objective gradient norm below which the iterate counts as
    /// stationary.
    pub gradient_tol: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_outer_iters: 100,
            max_inner_iters: 100,
            step_size: 0.01,
            initial_penalty: 1.0,
            penalty_growth: 2.0,
            violation_ratio: 0.25,
            constraint_tol: 1e-4,
            gradient_tol: 1e-4,
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated requirement.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_inner_iters == 0 {
            return Err("max_inner_iters must be at least 1");
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err("step_size must be finite and positive");
        }
        if !self.initial_penalty.is_finite() || self.initial_penalty <= 0.0 {
            return Err("initial_penalty must be finite and positive");
        }
        if !self.penalty_growth.is_finite() || self.penalty_growth < 1.0 {
            return Err("penalty_growth must be finite and at least 1");
        }
        if !self.violation_ratio.is_finite()
            || self.violation_ratio <= 0.0
            || self.violation_ratio > 1.0
        {
            return Err("violation_ratio must be in (0, 1]");
        }
        if !self.constraint_tol.is_finite() || self.constraint_tol < 0.0 {
            return Err("constraint_tol must be finite and non-negative");
        }
        if !self.gradient_tol.is_finite() || self.gradient_tol < 0.0 {
            return Err("gradient_tol must be finite and non-negative");
        }
        Ok(())
    }
}
