mod config;
mod error;
mod solution;

pub use config::Config;
pub use error::Error;
pub use solution::{OuterRecord, Solution, Status};

use ndarray::Array1;

use crate::problem::ConstrainedProblem;

/// Minimizes a constrained problem by the method of multipliers.
///
/// Starting from zero multipliers and the configured initial penalty, each
/// outer iteration approximately minimizes the augmented objective
///
/// ```text
///   A(z) = L(z) + λ_eqᵀ·g_eq(z) + (c/2)·‖g_eq(z)‖²
///        + Σ_active [λ_ineq·g_ineq(z) + (c/2)·g_ineq(z)²]
/// ```
///
/// with a bounded number of fixed-step gradient descent steps, then updates
/// the multipliers (`λ_eq += c·g_eq`, `λ_ineq = max(0, λ_ineq + c·g_ineq)`)
/// and grows the penalty when the violation norm stalls. An inequality
/// component is active when its residual is non-negative or its multiplier
/// is already positive.
///
/// Terminates once both the constraint-violation norm and the augmented
/// gradient norm fall below the configured tolerances, or the outer budget
/// runs out. Only first-order stationarity is sought; exhausting the budget
/// is reported through [`Status::MaxIters`] on a best-effort [`Solution`],
/// never as an error.
///
/// # Errors
///
/// Returns an error if the config is invalid or the problem fails to
/// evaluate.
pub fn solve<P: ConstrainedProblem>(
    problem: &P,
    initial: Array1<f64>,
    config: &Config,
) -> Result<Solution, Error> {
    config
        .validate()
        .map_err(|reason| Error::InvalidConfig { reason })?;

    let mut z = initial;
    let g_eq = problem.eq_residuals(&z).map_err(Error::problem)?;
    let g_ineq = problem.ineq_residuals(&z).map_err(Error::problem)?;
    let mut lambda_eq: Array1<f64> = Array1::zeros(g_eq.len());
    let mut lambda_ineq: Array1<f64> = Array1::zeros(g_ineq.len());
    let mut penalty = config.initial_penalty;
    let mut previous_violation = f64::INFINITY;

    let mut grad = Array1::zeros(z.len());
    let mut history = Vec::with_capacity(config.max_outer_iters);

    for outer in 1..=config.max_outer_iters {
        // Inner loop: descend the augmented objective with multipliers and
        // penalty held fixed. The gradient norm from the final step serves
        // as the stationarity measure for this outer iteration.
        let mut grad_norm = f64::INFINITY;
        for _ in 0..config.max_inner_iters {
            grad.fill(0.0);
            augmented_gradient(problem, &z, &lambda_eq, &lambda_ineq, penalty, &mut grad)?;
            grad_norm = norm(&grad);
            z.scaled_add(-config.step_size, &grad);
        }

        let g_eq = problem.eq_residuals(&z).map_err(Error::problem)?;
        let g_ineq = problem.ineq_residuals(&z).map_err(Error::problem)?;

        for (l, &g) in lambda_eq.iter_mut().zip(g_eq.iter()) {
            *l += penalty * g;
        }
        for (l, &g) in lambda_ineq.iter_mut().zip(g_ineq.iter()) {
            *l = (*l + penalty * g).max(0.0);
        }

        let violation = violation_norm(&g_eq, &g_ineq);
        let loss = problem.loss(&z).map_err(Error::problem)?;
        history.push(OuterRecord {
            loss,
            constraint_violation: violation,
        });

        if violation <= config.constraint_tol && grad_norm <= config.gradient_tol {
            return Ok(Solution {
                status: Status::Converged,
                z,
                history,
                outer_iters: outer,
            });
        }

        if violation > config.violation_ratio * previous_violation {
            penalty *= config.penalty_growth;
        }
        previous_violation = violation;
    }

    Ok(Solution {
        status: Status::MaxIters,
        z,
        history,
        outer_iters: config.max_outer_iters,
    })
}

/// Accumulates `∂A/∂z` at `z` into `grad` for fixed multipliers and penalty.
fn augmented_gradient<P: ConstrainedProblem>(
    problem: &P,
    z: &Array1<f64>,
    lambda_eq: &Array1<f64>,
    lambda_ineq: &Array1<f64>,
    penalty: f64,
    grad: &mut Array1<f64>,
) -> Result<(), Error> {
    problem.loss_gradient(z, grad).map_err(Error::problem)?;

    let g_eq = problem.eq_residuals(z).map_err(Error::problem)?;
    if !g_eq.is_empty() {
        let y = Array1::from_shape_fn(g_eq.len(), |i| lambda_eq[i] + penalty * g_eq[i]);
        problem.eq_gradient(z, &y, grad).map_err(Error::problem)?;
    }

    let g_ineq = problem.ineq_residuals(z).map_err(Error::problem)?;
    if !g_ineq.is_empty() {
        let y = Array1::from_shape_fn(g_ineq.len(), |i| {
            if g_ineq[i] >= 0.0 || lambda_ineq[i] > 0.0 {
                lambda_ineq[i] + penalty * g_ineq[i]
            } else {
                0.0
            }
        });
        problem.ineq_gradient(z, &y, grad).map_err(Error::problem)?;
    }

    Ok(())
}

fn norm(v: &Array1<f64>) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Norm of the infeasibility: equality residuals count fully, inequality
/// residuals only through their positive parts.
fn violation_norm(g_eq: &Array1<f64>, g_ineq: &Array1<f64>) -> f64 {
    let eq: f64 = g_eq.iter().map(|g| g * g).sum();
    let ineq: f64 = g_ineq.iter().map(|g| g.max(0.0) * g.max(0.0)).sum();
    (eq + ineq).sqrt()
}
