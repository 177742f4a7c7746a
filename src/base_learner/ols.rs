//! Weighted least-squares learner for linear and dummy-coded terms.
use ndarray::Array2;

use crate::common::linalg::{self, Cholesky};
use crate::error::DegenerateFitError;
use super::basis::{Design, TermBasis};
use super::core::*;

use std::sync::Arc;


/// Weighted linear regression of the pseudo-residuals on the design
/// `[1, x]`, `[x]`, or the dummy coding of a categorical predictor.
pub struct OlsLearner {
    design: Arc<Design>,
    weights: Vec<f64>,
    // (Xᵀ W X)⁻¹
    inverse: Array2<f64>,
    df: f64,
    condition: f64,
}


impl OlsLearner {
    /// Prepare the learner for the given column and weights.
    pub(crate) fn new(design: Arc<Design>, column: &[f64], weights: &[f64])
        -> Result<Self, DegenerateFitError>
    {
        check_variance(column, weights)?;

        let gram = linalg::weighted_gram(&design.matrix, weights);
        let active = active_columns(&design.basis, &gram);

        // Inactive columns get a unit diagonal and no coupling,
        // their coefficients are zeroed below.
        let mut system = gram.clone();
        for (j, &on) in active.iter().enumerate() {
            if on { continue; }
            system.row_mut(j).fill(0.0);
            system.column_mut(j).fill(0.0);
            system[(j, j)] = 1.0;
        }

        let cholesky = Cholesky::factorize(&system)
            .map_err(|_| DegenerateFitError::SingularBasis)?;
        let mut inverse = cholesky.inverse();
        for (j, &on) in active.iter().enumerate() {
            if on { continue; }
            inverse.row_mut(j).fill(0.0);
            inverse.column_mut(j).fill(0.0);
        }

        // Equals the number of active coefficients for a full-rank design.
        let df = linalg::trace_of_product(&inverse, &gram);

        Ok(Self {
            design,
            weights: weights.to_vec(),
            inverse,
            df,
            condition: cholesky.condition_estimate(),
        })
    }
}


/// Columns that carry weight on the training rows.
///
/// A categorical level without training weight has an all-zero dummy
/// column; it is dropped, so the level falls back to the reference effect.
/// If the reference level itself has no weight,
/// the smallest remaining level becomes the reference.
fn active_columns(basis: &TermBasis, gram: &Array2<f64>) -> Vec<bool> {
    let n_coef = gram.nrows();
    let mut active = (0..n_coef)
        .map(|j| gram[(j, j)] > 0.0)
        .collect::<Vec<_>>();

    if let TermBasis::Categorical { .. } = basis {
        // Every seen row has the intercept and at most one dummy.
        let reference = gram[(0, 0)]
            - (1..n_coef).map(|k| gram[(k, k)]).sum::<f64>();
        if reference <= 1e-12 * gram[(0, 0)] {
            if let Some(k) = (1..n_coef).find(|&k| active[k]) {
                active[k] = false;
            }
        }
    }
    active
}


impl BaseLearner for OlsLearner {
    fn name(&self) -> &str {
        "Ordinary Least Squares"
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


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModelTerm, LearnerKind};
    use crate::base_learner::core;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_fit_recovers_the_line() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let u = x.iter().map(|x| 1.5 - 2.0 * x).collect::<Vec<_>>();
        let w = [1.0; 5];

        let fit = core::fit(&ModelTerm::ols("x"), &x, &u, &w).unwrap();
        match fit.contribution {
            Contribution::Coefficients(ref coef) => {
                assert_abs_diff_eq!(coef[0], 1.5, epsilon = 1e-10);
                assert_abs_diff_eq!(coef[1], -2.0, epsilon = 1e-10);
            },
            _ => panic!("expected coefficients"),
        }
        assert_abs_diff_eq!(fit.sse, 0.0, epsilon = 1e-18);
        assert_abs_diff_eq!(fit.df, 2.0, epsilon = 1e-10);
    }


    #[test]
    fn categorical_fit_gives_level_means() {
        let x = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        let u = [1.0, 3.0, 5.0, 7.0, -1.0, -3.0];
        let w = [1.0; 6];

        let term = ModelTerm::new("x", LearnerKind::Categorical);
        let fit = core::fit(&term, &x, &u, &w).unwrap();
        assert_abs_diff_eq!(fit.fitted[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.fitted[2], 6.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.fitted[4], -2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.df, 3.0, epsilon = 1e-10);
    }


    #[test]
    fn levels_without_weight_fall_back_to_the_reference() {
        let x = [1.0, 1.0, 2.0, 2.0, 3.0];
        let u = [1.0, 3.0, 5.0, 7.0, 100.0];
        let w = [1.0, 1.0, 1.0, 1.0, 0.0];

        let term = ModelTerm::new("x", LearnerKind::Categorical);
        let fit = core::fit(&term, &x, &u, &w).unwrap();
        match fit.contribution {
            Contribution::Coefficients(ref coef) => {
                assert_abs_diff_eq!(coef[0], 2.0, epsilon = 1e-10);
                assert_abs_diff_eq!(coef[1], 4.0, epsilon = 1e-10);
                assert_eq!(coef[2], 0.0);
            },
            _ => panic!("expected coefficients"),
        }
        assert_abs_diff_eq!(fit.fitted[4], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.df, 2.0, epsilon = 1e-10);
    }


    #[test]
    fn missing_reference_level_moves_the_reference() {
        let x = [1.0, 2.0, 2.0, 3.0, 3.0];
        let u = [9.0, 1.0, 3.0, 5.0, 7.0];
        let w = [0.0, 1.0, 1.0, 1.0, 1.0];

        let term = ModelTerm::new("x", LearnerKind::Categorical);
        let fit = core::fit(&term, &x, &u, &w).unwrap();
        assert_abs_diff_eq!(fit.fitted[1], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.fitted[3], 6.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.fitted[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.df, 2.0, epsilon = 1e-10);
    }


    #[test]
    fn zero_variance_on_weighted_rows_is_degenerate() {
        let x = [1.0, 1.0, 1.0, 5.0];
        let u = [0.0, 1.0, 2.0, 3.0];
        let w = [1.0, 1.0, 1.0, 0.0];

        let err = core::fit(&ModelTerm::ols("x"), &x, &u, &w).unwrap_err();
        assert_eq!(err, DegenerateFitError::ZeroVariance);
    }
}
