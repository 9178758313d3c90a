use ndarray::Array1;

use crate::basis::BasisSet;

/// A frequency-weighted distance between two coefficient vectors.
///
/// For achieved coefficients `c` and target coefficients `φ` over a shared
/// [`BasisSet`], the metric is:
///
/// ```text
///   Σ_k w_k · (c_k − φ_k)²,   w_k = (1 + ‖k‖²)^(−3/2)
/// ```
///
/// The weights decay with frequency, so coarse-scale coverage mismatches
/// dominate the cost. The metric is non-negative and zero exactly when the
/// two vectors coincide within the basis span.
#[derive(Debug, Clone, PartialEq)]
pub struct ErgodicMetric {
    weights: Array1<f64>,
}

impl ErgodicMetric {
    /// Precomputes the spectral weights for the given basis family.
    pub fn new(basis: &BasisSet) -> Self {
        let weights = basis
            .indices()
            .iter()
            .map(|&[k1, k2]| {
                let norm_sq = (k1 * k1 + k2 * k2) as f64;
                // Exponent is −(n + 1)/2 with n = 2 domain dimensions.
                (1.0 + norm_sq).powf(-1.5)
            })
            .collect();
        Self { weights }
    }

    /// Evaluates the metric between achieved and target coefficients.
    ///
    /// Both vectors must have one entry per basis index.
    pub fn evaluate(&self, achieved: &Array1<f64>, target: &Array1<f64>) -> f64 {
        debug_assert_eq!(achieved.len(), self.weights.len());
        debug_assert_eq!(target.len(), self.weights.len());
        self.weights
            .iter()
            .zip(achieved.iter().zip(target.iter()))
            .map(|(&w, (&c, &phi))| w * (c - phi) * (c - phi))
            .sum()
    }

    /// The spectral weights, aligned with the basis index order.
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }
}
