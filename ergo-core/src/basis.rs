use std::f64::consts::PI;

use thiserror::Error;

/// Errors that can occur when constructing a [`BasisSet`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BasisError {
    #[error("basis resolution must be positive in every dimension")]
    ZeroResolution,
}

/// A finite family of cosine basis functions over the unit square.
///
/// Each basis function is indexed by a multi-index `k = [k1, k2]` and
/// evaluates to the separable product:
///
/// ```text
///   f_k(x) = cos(k1·π·x1) · cos(k2·π·x2)
/// ```
///
/// The family spans all multi-indices below a per-dimension resolution, and
/// each index carries a normalization constant `h_k = sqrt(∫ f_k²)` over the
/// unit square, which keeps coefficient magnitudes comparable across
/// frequencies.
///
/// Evaluation is intentionally unchecked: `f_k` is smooth and finite for any
/// real input, including points outside the unit square. Keeping it defined
/// everywhere lets gradient-based optimization rely on a boundary barrier
/// upstream instead of a hard domain check here.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisSet {
    indices: Vec<[usize; 2]>,
    normalizations: Vec<f64>,
}

impl BasisSet {
    /// Creates the basis family for the given per-dimension resolution.
    ///
    /// A resolution of `[5, 5]` yields the 25 indices `[0..5] × [0..5]`.
    ///
    /// # Errors
    ///
    /// Returns [`BasisError::ZeroResolution`] if either dimension is zero.
    pub fn new(resolution: [usize; 2]) -> Result<Self, BasisError> {
        if resolution[0] == 0 || resolution[1] == 0 {
            return Err(BasisError::ZeroResolution);
        }

        let mut indices = Vec::with_capacity(resolution[0] * resolution[1]);
        let mut normalizations = Vec::with_capacity(indices.capacity());
        for k1 in 0..resolution[0] {
            for k2 in 0..resolution[1] {
                indices.push([k1, k2]);
                normalizations.push(normalization([k1, k2]));
            }
        }

        Ok(Self {
            indices,
            normalizations,
        })
    }

    /// The number of basis functions in the family.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the family is empty (never the case after `new`).
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The multi-indices in the family, in a fixed enumeration order.
    pub fn indices(&self) -> &[[usize; 2]] {
        &self.indices
    }

    /// Normalization constants aligned with [`Self::indices`].
    pub fn normalizations(&self) -> &[f64] {
        &self.normalizations
    }

    /// Evaluates `f_k` at a point in (or near) the unit square.
    pub fn evaluate(&self, x: [f64; 2], k: [usize; 2]) -> f64 {
        let k1 = k[0] as f64;
        let k2 = k[1] as f64;
        (k1 * PI * x[0]).cos() * (k2 * PI * x[1]).cos()
    }

    /// The analytic gradient of `f_k` with respect to `x`.
    pub fn gradient(&self, x: [f64; 2], k: [usize; 2]) -> [f64; 2] {
        let k1 = k[0] as f64;
        let k2 = k[1] as f64;
        let (s1, c1) = (k1 * PI * x[0]).sin_cos();
        let (s2, c2) = (k2 * PI * x[1]).sin_cos();
        [-k1 * PI * s1 * c2, -k2 * PI * c1 * s2]
    }
}

/// Closed-form `sqrt(∫ f_k²)` over the unit square.
///
/// Per dimension, `∫ cos²(k·π·x) dx` on `[0, 1]` is 1 for `k = 0` and 1/2
/// otherwise.
fn normalization(k: [usize; 2]) -> f64 {
    let integral: f64 = k
        .iter()
        .map(|&ki| if ki == 0 { 1.0 } else { 0.5 })
        .product();
    integral.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn enumerates_full_resolution() {
        let basis = BasisSet::new([5, 5]).unwrap();
        assert_eq!(basis.len(), 25);
        assert_eq!(basis.indices()[0], [0, 0]);
        assert_eq!(basis.indices()[24], [4, 4]);
    }

    #[test]
    fn errors_on_zero_resolution() {
        assert_eq!(BasisSet::new([0, 5]), Err(BasisError::ZeroResolution));
        assert_eq!(BasisSet::new([5, 0]), Err(BasisError::ZeroResolution));
    }

    #[test]
    fn constant_mode_is_one_everywhere() {
        let basis = BasisSet::new([3, 3]).unwrap();
        for x in [[0.0, 0.0], [0.3, 0.7], [1.0, 1.0], [-0.2, 1.4]] {
            assert_relative_eq!(basis.evaluate(x, [0, 0]), 1.0);
        }
    }

    #[test]
    fn normalizations_are_positive_and_finite() {
        let basis = BasisSet::new([7, 4]).unwrap();
        for &h in basis.normalizations() {
            assert!(h > 0.0);
            assert!(h.is_finite());
        }
    }

    #[test]
    fn normalization_matches_closed_form() {
        let basis = BasisSet::new([2, 2]).unwrap();
        let h = |k: [usize; 2]| {
            let i = basis.indices().iter().position(|&idx| idx == k).unwrap();
            basis.normalizations()[i]
        };
        assert_relative_eq!(h([0, 0]), 1.0);
        assert_relative_eq!(h([1, 0]), 0.5f64.sqrt());
        assert_relative_eq!(h([1, 1]), 0.5);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let basis = BasisSet::new([4, 4]).unwrap();
        let x = [0.37, 0.81];
        let eps = 1e-6;
        for &k in basis.indices() {
            let grad = basis.gradient(x, k);
            let dx = (basis.evaluate([x[0] + eps, x[1]], k)
                - basis.evaluate([x[0] - eps, x[1]], k))
                / (2.0 * eps);
            let dy = (basis.evaluate([x[0], x[1] + eps], k)
                - basis.evaluate([x[0], x[1] - eps], k))
                / (2.0 * eps);
            assert_relative_eq!(grad[0], dx, epsilon = 1e-6);
            assert_relative_eq!(grad[1], dy, epsilon = 1e-6);
        }
    }

    #[test]
    fn defined_outside_the_unit_square() {
        let basis = BasisSet::new([3, 3]).unwrap();
        for &k in basis.indices() {
            assert!(basis.evaluate([-2.5, 3.1], k).is_finite());
            let grad = basis.gradient([-2.5, 3.1], k);
            assert!(grad[0].is_finite() && grad[1].is_finite());
        }
    }
}
