use ndarray::{Array1, Array2};
use thiserror::Error;

use crate::basis::BasisSet;

/// Errors that can occur when projecting onto the basis family.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    /// The supplied density grid does not match the configured sampling
    /// resolution. Raised before any coefficient work is done.
    #[error("density grid shape {actual:?} does not match sampling resolution {expected:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
    },

    #[error("sampling resolution must be positive in every dimension")]
    ZeroResolution,
}

/// Projects spatial data onto a [`BasisSet`]'s span.
///
/// Two projection modes share the same machinery:
///
/// - A density grid becomes *target* coefficients: each grid cell is treated
///   as a point mass at a fixed sample location, and each coefficient is the
///   weighted average of the basis function over those masses.
/// - A sequence of unit-square positions becomes *achieved* coefficients:
///   the time-averaged spatial occupancy of a trajectory in spectral form.
///
/// Sample locations form a regular grid spanning 0.03..=0.97 per dimension,
/// keeping a small margin from the domain boundary. Grid rows index the
/// second (y) coordinate, columns the first (x), matching a row-major
/// flattened density array.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialProjector {
    basis: BasisSet,
    resolution: [usize; 2],
    samples: Vec<[f64; 2]>,
}

impl SpatialProjector {
    /// Creates a projector with a fixed sampling grid at the given
    /// `[rows, cols]` resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::ZeroResolution`] if either dimension is
    /// zero.
    pub fn new(basis: BasisSet, resolution: [usize; 2]) -> Result<Self, ProjectionError> {
        let [rows, cols] = resolution;
        if rows == 0 || cols == 0 {
            return Err(ProjectionError::ZeroResolution);
        }

        let ys = margin_linspace(rows);
        let xs = margin_linspace(cols);
        let mut samples = Vec::with_capacity(rows * cols);
        for &y in &ys {
            for &x in &xs {
                samples.push([x, y]);
            }
        }

        Ok(Self {
            basis,
            resolution,
            samples,
        })
    }

    pub fn basis(&self) -> &BasisSet {
        &self.basis
    }

    pub fn resolution(&self) -> [usize; 2] {
        self.resolution
    }

    /// Projects a density grid into target coefficients.
    ///
    /// Weights need not sum to one; an all-zero grid yields the all-zero
    /// coefficient vector, a well-defined degenerate target.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::ShapeMismatch`] if the grid shape differs
    /// from the configured sampling resolution.
    pub fn project_density(&self, grid: &Array2<f64>) -> Result<Array1<f64>, ProjectionError> {
        let (rows, cols) = grid.dim();
        if [rows, cols] != self.resolution {
            return Err(ProjectionError::ShapeMismatch {
                expected: self.resolution,
                actual: [rows, cols],
            });
        }

        let count = self.samples.len() as f64;
        let coefficients = self
            .basis
            .indices()
            .iter()
            .zip(self.basis.normalizations())
            .map(|(&k, &h)| {
                let sum: f64 = self
                    .samples
                    .iter()
                    .zip(grid.iter())
                    .map(|(&s, &w)| w * self.basis.evaluate(s, k))
                    .sum();
                sum / (count * h)
            })
            .collect();
        Ok(coefficients)
    }

    /// Projects a sequence of unit-square positions into achieved
    /// coefficients.
    ///
    /// Positions are expected to already be mapped into exploration space.
    /// An empty sequence yields the all-zero vector.
    pub fn project_points(&self, points: &[[f64; 2]]) -> Array1<f64> {
        if points.is_empty() {
            return Array1::zeros(self.basis.len());
        }

        let count = points.len() as f64;
        self.basis
            .indices()
            .iter()
            .zip(self.basis.normalizations())
            .map(|(&k, &h)| {
                let sum: f64 = points.iter().map(|&p| self.basis.evaluate(p, k)).sum();
                sum / (count * h)
            })
            .collect()
    }
}

/// Evenly spaced sample coordinates on 0.03..=0.97.
fn margin_linspace(n: usize) -> Vec<f64> {
    const LO: f64 = 0.03;
    const HI: f64 = 0.97;
    if n == 1 {
        return vec![0.5 * (LO + HI)];
    }
    (0..n)
        .map(|i| LO + (HI - LO) * i as f64 / (n - 1) as f64)
        .collect()
}
