//! Penalized B-spline smoother.
use ndarray::Array2;

use crate::{SplineConfig, Penalty};
use crate::common::linalg::{self, Cholesky};
use crate::error::DegenerateFitError;
use super::basis::Design;
use super::bspline;
use super::core::*;

use std::sync::Arc;


/// Search range of `log10(lambda)` when `lambda` is chosen by df.
const LOG_LAMBDA_RANGE: (f64, f64) = (-10.0, 15.0);
/// Number of bisection steps when `lambda` is chosen by df.
const BISECTION_STEPS: usize = 50;


/// The weighted ridge solve `(BᵀWB + λP) β = BᵀWu`
/// on a B-spline basis `B` with the difference penalty `P`.
pub struct PSplineLearner {
    design: Arc<Design>,
    weights: Vec<f64>,
    lambda: f64,
    // (BᵀWB + λP)⁻¹
    inverse: Array2<f64>,
    df: f64,
    condition: f64,
}


/// Penalized system of a spline term.
pub(super) struct PenalizedSystem {
    /// `BᵀWB + λP`
    pub(super) matrix: Array2<f64>,
    pub(super) lambda: f64,
    pub(super) cholesky: Cholesky,
    pub(super) df: f64,
}


impl PenalizedSystem {
    /// Factorize `BᵀWB + λP` with `λ` taken from `config`.
    pub(super) fn new(design: &Design, config: &SplineConfig, weights: &[f64])
        -> Result<Self, DegenerateFitError>
    {
        let gram = linalg::weighted_gram(&design.matrix, weights);
        let penalty = bspline::difference_penalty(
            gram.nrows(), config.difference_order,
        );

        let lambda = match config.penalty {
            Penalty::Lambda(lambda) => lambda,
            Penalty::Df(df) => lambda_for_df(&gram, &penalty, df),
        };

        let matrix = &gram + &(lambda * &penalty);
        let cholesky = Cholesky::factorize(&matrix)
            .map_err(|_| DegenerateFitError::SingularBasis)?;
        let df = linalg::trace_of_product(&cholesky.inverse(), &gram);

        Ok(Self { matrix, lambda, cholesky, df })
    }
}


/// Returns `trace((G + λP)⁻¹ G)`,
/// or `None` if `G + λP` cannot be factorized.
fn effective_df(gram: &Array2<f64>, penalty: &Array2<f64>, lambda: f64)
    -> Option<f64>
{
    let cholesky = Cholesky::factorize(&(gram + &(lambda * penalty))).ok()?;
    Some(linalg::trace_of_product(&cholesky.inverse(), gram))
}


/// Find `λ` whose smoother has `target` degrees of freedom.
/// The df is decreasing in `λ`,
/// so this is a bisection on `log10(λ)`.
/// An unsolvable `λ` counts as having too many degrees of freedom.
fn lambda_for_df(gram: &Array2<f64>, penalty: &Array2<f64>, target: f64) -> f64 {
    let (mut lo, mut hi) = LOG_LAMBDA_RANGE;
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        match effective_df(gram, penalty, 10_f64.powf(mid)) {
            Some(df) if df <= target => { hi = mid; },
            _ => { lo = mid; },
        }
    }
    10_f64.powf(hi)
}


impl PSplineLearner {
    /// Prepare the smoother for the given column and weights.
    pub(crate) fn new(
        design: Arc<Design>,
        config: &SplineConfig,
        column: &[f64],
        weights: &[f64],
    ) -> Result<Self, DegenerateFitError>
    {
        check_variance(column, weights)?;
        let system = PenalizedSystem::new(&design, config, weights)?;

        Ok(Self {
            design,
            weights: weights.to_vec(),
            lambda: system.lambda,
            inverse: system.cholesky.inverse(),
            df: system.df,
            condition: system.cholesky.condition_estimate(),
        })
    }


    /// The smoothing parameter in use.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}


impl BaseLearner for PSplineLearner {
    fn name(&self) -> &str {
        "P-Spline"
    }


    fn degrees_of_freedom(&self) -> f64 {
        self.df
    }


    fn condition_estimate(&self) -> Option<f64> {
        Some(self.condition)
    }


    fn fit(&self, residuals: &[f64]) -> Result<LearnerFit, DegenerateFitError> {
        let matrix = &self.design.matrix;
        let cross = linalg::weighted_cross(matrix, &self.weights, residuals);
        let coef = self.inverse.dot(&cross);

        coefficient_fit(matrix, coef, residuals, &self.weights, self.df)
    }
}
