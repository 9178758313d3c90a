/// A per-agent state-transition model.
///
/// Implementations are pure and stateless: the same `(state, control, dt)`
/// always produces the same next state. Batching over agents is the caller's
/// concern, since per-agent steps are independent.
///
/// Alongside the forward step, implementations expose its adjoint
/// ([`Dynamics::step_vjp`]) so that constraint gradients can be assembled
/// analytically without a general differentiation facility.
pub trait Dynamics {
    fn state_dim(&self) -> usize;

    fn control_dim(&self) -> usize;

    /// Writes the next state into `next`.
    ///
    /// Slice lengths must match the model's dimensions.
    fn step(&self, state: &[f64], control: &[f64], dt: f64, next: &mut [f64]);

    /// Accumulates the pullback of an output cotangent `y` through the step.
    ///
    /// Adds `(∂step/∂state)ᵀ·y` into `state_grad` and `(∂step/∂control)ᵀ·y`
    /// into `control_grad`.
    fn step_vjp(&self, y: &[f64], dt: f64, state_grad: &mut [f64], control_grad: &mut [f64]);
}

/// A single-integrator model: control directly sets the rate of change of
/// state.
///
/// Applies the update rule:
///
/// ```text
///   state_{t+1} = state_t + dt · control_t
/// ```
///
/// Zero control is a fixed point for any state and `dt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleIntegrator {
    dim: usize,
}

impl SingleIntegrator {
    /// The planar configuration: two position states driven by two velocity
    /// controls.
    pub fn planar() -> Self {
        Self { dim: 2 }
    }
}

impl Dynamics for SingleIntegrator {
    fn state_dim(&self) -> usize {
        self.dim
    }

    fn control_dim(&self) -> usize {
        self.dim
    }

    fn step(&self, state: &[f64], control: &[f64], dt: f64, next: &mut [f64]) {
        debug_assert_eq!(state.len(), self.dim);
        debug_assert_eq!(control.len(), self.dim);
        debug_assert_eq!(next.len(), self.dim);
        for i in 0..self.dim {
            next[i] = state[i] + dt * control[i];
        }
    }

    fn step_vjp(&self, y: &[f64], dt: f64, state_grad: &mut [f64], control_grad: &mut [f64]) {
        debug_assert_eq!(y.len(), self.dim);
        for i in 0..self.dim {
            state_grad[i] += y[i];
            control_grad[i] += dt * y[i];
        }
    }
}
