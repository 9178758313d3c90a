use ndarray::Array1;

/// Defines a constrained minimization problem over a flat variable vector.
///
/// Solvers search for a `z` minimizing [`loss`](Self::loss) subject to
/// equality residuals driven to zero and inequality residuals driven to be
/// non-positive.
///
/// Instead of a general differentiation facility, the problem supplies its
/// own derivatives: the loss gradient directly, and the constraint Jacobians
/// as transpose products (`Jᵀy` accumulation). For losses and residuals
/// built from a small fixed operation set — basis evaluations, linear
/// dynamics, quadratic costs — these are tractable to derive by hand.
///
/// Residual lengths must be constant across evaluations for a given problem.
pub trait ConstrainedProblem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The scalar loss at `z`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loss cannot be evaluated.
    fn loss(&self, z: &Array1<f64>) -> Result<f64, Self::Error>;

    /// Accumulates `∂loss/∂z` into `grad`.
    ///
    /// # Errors
    ///
    /// Returns an error if the gradient cannot be evaluated.
    fn loss_gradient(&self, z: &Array1<f64>, grad: &mut Array1<f64>) -> Result<(), Self::Error>;

    /// The equality residual vector `g_eq(z)`, with target `g_eq(z) = 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the residuals cannot be evaluated.
    fn eq_residuals(&self, z: &Array1<f64>) -> Result<Array1<f64>, Self::Error>;

    /// The inequality residual vector `g_ineq(z)`, with target
    /// `g_ineq(z) ≤ 0` component-wise.
    ///
    /// # Errors
    ///
    /// Returns an error if the residuals cannot be evaluated.
    fn ineq_residuals(&self, z: &Array1<f64>) -> Result<Array1<f64>, Self::Error>;

    /// Accumulates `J_eqᵀ·y` into `grad`, where `J_eq = ∂g_eq/∂z`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be evaluated.
    fn eq_gradient(
        &self,
        z: &Array1<f64>,
        y: &Array1<f64>,
        grad: &mut Array1<f64>,
    ) -> Result<(), Self::Error>;

    /// Accumulates `J_ineqᵀ·y` into `grad`, where `J_ineq = ∂g_ineq/∂z`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be evaluated.
    fn ineq_gradient(
        &self,
        z: &Array1<f64>,
        y: &Array1<f64>,
        grad: &mut Array1<f64>,
    ) -> Result<(), Self::Error>;
}
