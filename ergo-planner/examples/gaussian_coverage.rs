//! Plans a two-agent coverage trajectory over a bimodal Gaussian density
//! and prints solver diagnostics.

use ergo_planner::{PlannerConfig, TrajectoryProblem};
use ergo_solve::augmented;
use ndarray::Array2;

fn gaussian(x: f64, y: f64, center: [f64; 2], width: f64) -> f64 {
    let dx = x - center[0];
    let dy = y - center[1];
    (-(dx * dx + dy * dy) / (2.0 * width * width)).exp()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two Gaussian bumps over the default [-50, 50]² workspace, expressed
    // on the unit-square sampling grid the planner projects against.
    let resolution = 100;
    let density = Array2::from_shape_fn((resolution, resolution), |(i, j)| {
        let y = 0.03 + 0.94 * i as f64 / (resolution - 1) as f64;
        let x = 0.03 + 0.94 * j as f64 / (resolution - 1) as f64;
        gaussian(x, y, [0.3, 0.3], 0.08) + gaussian(x, y, [0.75, 0.7], 0.1)
    });

    let starts = [[-20.0, -20.0], [25.0, 10.0]];
    let config = PlannerConfig {
        horizon: 40,
        basis_resolution: [4, 4],
        ..PlannerConfig::default()
    };
    let problem = TrajectoryProblem::new(&starts, &density, config)?;

    let solver = augmented::Config {
        max_outer_iters: 150,
        max_inner_iters: 200,
        step_size: 0.005,
        penalty_growth: 1.5,
        violation_ratio: 0.75,
        constraint_tol: 5e-3,
        ..augmented::Config::default()
    };
    let plan = problem.solve(&solver)?;

    println!(
        "status: {:?} after {} outer iterations",
        plan.status, plan.outer_iters
    );
    for (i, record) in plan.history.iter().enumerate().step_by(10) {
        println!(
            "outer {:>3}: loss {:>10.4}, violation {:>10.6}",
            i + 1,
            record.loss,
            record.constraint_violation
        );
    }

    let achieved = problem.achieved_coefficients(&plan.trajectory);
    let target = problem.target_coefficients();
    let distance = achieved
        .iter()
        .zip(target.iter())
        .map(|(c, p)| (c - p) * (c - p))
        .sum::<f64>()
        .sqrt();
    println!("coefficient distance to target: {distance:.6}");

    Ok(())
}
