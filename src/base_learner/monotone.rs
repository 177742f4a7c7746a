//! Penalized B-spline smoother with monotone coefficients.
use ndarray::{Array1, Array2};

use crate::{SplineConfig, Direction};
use crate::common::linalg;
use crate::error::DegenerateFitError;
use super::basis::Design;
use super::pspline::PenalizedSystem;
use super::active_set;
use super::core::*;

use std::sync::Arc;


/// A P-spline whose coefficients are non-decreasing
/// (or non-increasing) in their index.
/// Since B-splines form a partition of unity,
/// monotone coefficients give a monotone function.
///
/// The coefficients are written as `β = C γ`
/// with `γ_0` the level and `γ_1, ..., γ_{k-1}`
/// the non-negative increments, so the constraint turns into
/// simple bounds on `γ`.
pub struct MonotoneLearner {
    design: Arc<Design>,
    weights: Vec<f64>,
    direction: Direction,
    // β = C γ
    transform: Array2<f64>,
    // Cᵀ (BᵀWB + λP) C
    quadratic: Array2<f64>,
    df: f64,
    condition: f64,
}


/// `C[j][0] = 1`, `C[j][i] = sign` for `1 <= i <= j`.
fn increment_transform(n_basis: usize, direction: Direction) -> Array2<f64> {
    let sign = direction.sign();
    Array2::from_shape_fn((n_basis, n_basis), |(j, i)| {
        if i == 0 {
            1.0
        } else if i <= j {
            sign
        } else {
            0.0
        }
    })
}


impl MonotoneLearner {
    /// Prepare the smoother for the given column and weights.
    pub(crate) fn new(
        design: Arc<Design>,
        config: &SplineConfig,
        direction: Direction,
        column: &[f64],
        weights: &[f64],
    ) -> Result<Self, DegenerateFitError>
    {
        check_variance(column, weights)?;
        let system = PenalizedSystem::new(&design, config, weights)?;

        let transform = increment_transform(system.matrix.nrows(), direction);
        let quadratic = transform.t().dot(&system.matrix).dot(&transform);

        Ok(Self {
            design,
            weights: weights.to_vec(),
            direction,
            transform,
            quadratic,
            df: system.df,
            condition: system.cholesky.condition_estimate(),
        })
    }


    /// Direction of the constraint.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}


impl BaseLearner for MonotoneLearner {
    fn name(&self) -> &str {
        "Monotone P-Spline"
    }


    /// The trace of the unconstrained smoother.
    fn degrees_of_freedom(&self) -> f64 {
        self.df
    }


    fn condition_estimate(&self) -> Option<f64> {
        Some(self.condition)
    }


    fn fit(&self, residuals: &[f64]) -> Result<LearnerFit, DegenerateFitError> {
        let matrix = &self.design.matrix;
        let cross = linalg::weighted_cross(matrix, &self.weights, residuals);
        let linear: Array1<f64> = self.transform.t().dot(&cross);

        let gamma = active_set::solve(&self.quadratic, &linear, 1);
        let coef = self.transform.dot(&gamma);

        coefficient_fit(matrix, coef, residuals, &self.weights, self.df)
    }
}
