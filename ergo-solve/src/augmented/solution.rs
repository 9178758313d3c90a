use ndarray::Array1;

/// Indicates whether the solver converged or hit the outer budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,
    /// Exhausted the outer-iteration budget without converging. The
    /// solution still carries the last iterate, best effort.
    MaxIters,
}

/// Diagnostics recorded after each outer iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterRecord {
    /// Loss at the end of the outer iteration (the plain loss, not the
    /// augmented objective).
    pub loss: f64,
    /// Constraint-violation norm: equality residuals plus the positive
    /// parts of inequality residuals.
    pub constraint_violation: f64,
}

/// The result of an augmented Lagrangian solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,
    /// The variable at termination.
    pub z: Array1<f64>,
    /// One record per completed outer iteration.
    pub history: Vec<OuterRecord>,
    /// Outer iterations completed.
    pub outer_iters: usize,
}
