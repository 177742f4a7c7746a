//! Single-split regression tree.
use crate::error::DegenerateFitError;
use super::basis::Design;
use super::core::*;

use std::sync::Arc;


/// A regression tree of depth 1.
/// The split minimizes the weighted sum of squared errors
/// over the midpoints of consecutive distinct values.
pub struct StumpLearner {
    column: Vec<f64>,
    weights: Vec<f64>,
    // Indices of the rows with positive weight, sorted by the predictor.
    order: Vec<usize>,
}


impl StumpLearner {
    /// Prepare the stump for the given column and weights.
    pub(crate) fn new(design: Arc<Design>, column: &[f64], weights: &[f64])
        -> Result<Self, DegenerateFitError>
    {
        let order = design.order.iter()
            .copied()
            .filter(|&i| weights[i] > 0.0)
            .collect::<Vec<_>>();

        let has_split = order.windows(2)
            .any(|pair| column[pair[0]] < column[pair[1]]);
        if !has_split {
            return Err(DegenerateFitError::NoSplit);
        }

        Ok(Self {
            column: column.to_vec(),
            weights: weights.to_vec(),
            order,
        })
    }
}


impl BaseLearner for StumpLearner {
    fn name(&self) -> &str {
        "Decision Stump"
    }


    fn degrees_of_freedom(&self) -> f64 {
        2.0
    }


    fn fit(&self, residuals: &[f64]) -> Result<LearnerFit, DegenerateFitError> {
        let (total_w, total_wu) = self.order.iter()
            .fold((0.0, 0.0), |(w, wu), &i| {
                (w + self.weights[i], wu + self.weights[i] * residuals[i])
            });

        // Maximize `S_l² / W_l + S_r² / W_r`,
        // which is the same as minimizing the SSE.
        let mut best: Option<(f64, f64, f64)> = None;
        let mut best_gain = f64::MIN;
        let (mut left_w, mut left_wu) = (0.0, 0.0);
        for pair in self.order.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            left_w += self.weights[i];
            left_wu += self.weights[i] * residuals[i];

            if self.column[i] == self.column[j] { continue; }

            let right_w = total_w - left_w;
            let right_wu = total_wu - left_wu;
            if left_w <= 0.0 || right_w <= 0.0 { continue; }

            let gain = left_wu * left_wu / left_w + right_wu * right_wu / right_w;
            if gain > best_gain {
                best_gain = gain;
                let threshold = 0.5 * (self.column[i] + self.column[j]);
                best = Some((threshold, left_wu / left_w, right_wu / right_w));
            }
        }

        let (threshold, left, right) = best.ok_or(DegenerateFitError::NoSplit)?;
        let fitted = self.column.iter()
            .map(|&x| if x <= threshold { left } else { right })
            .collect::<Vec<_>>();

        let sse = weighted_sse(residuals, &fitted[..], &self.weights);
        if !sse.is_finite() {
            return Err(DegenerateFitError::NonFinite);
        }

        Ok(LearnerFit {
            contribution: Contribution::Split { threshold, left, right },
            fitted,
            sse,
            df: 2.0,
        })
    }
}


#[cfg(test)]
mod tests {
    use crate::ModelTerm;
    use crate::base_learner::core::{self, Contribution};
    use crate::error::DegenerateFitError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_the_step() {
        let x = [5.0, 1.0, 3.0, 2.0, 4.0, 6.0];
        let u = [10.0, 0.0, 0.0, 0.0, 10.0, 10.0];
        let w = [1.0; 6];

        let fit = core::fit(&ModelTerm::stump("x"), &x, &u, &w).unwrap();
        match fit.contribution {
            Contribution::Split { threshold, left, right } => {
                assert_abs_diff_eq!(threshold, 3.5);
                assert_abs_diff_eq!(left, 0.0);
                assert_abs_diff_eq!(right, 10.0);
            },
            _ => panic!("expected a split"),
        }
        assert_abs_diff_eq!(fit.sse, 0.0);
    }


    #[test]
    fn ties_keep_the_smallest_threshold() {
        // Splitting at 1.5 and at 2.5 give the same SSE.
        let x = [1.0, 2.0, 3.0];
        let u = [1.0, 0.0, -1.0];
        let w = [1.0; 3];

        let fit = core::fit(&ModelTerm::stump("x"), &x, &u, &w).unwrap();
        match fit.contribution {
            Contribution::Split { threshold, .. } => {
                assert_abs_diff_eq!(threshold, 1.5);
            },
            _ => panic!("expected a split"),
        }
    }


    #[test]
    fn zero_weight_rows_are_ignored_when_splitting() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let u = [0.0, 100.0, 1.0, 1.0];
        let w = [1.0, 0.0, 1.0, 1.0];

        let fit = core::fit(&ModelTerm::stump("x"), &x, &u, &w).unwrap();
        match fit.contribution {
            Contribution::Split { threshold, left, right } => {
                assert_abs_diff_eq!(threshold, 2.0);
                assert_abs_diff_eq!(left, 0.0);
                assert_abs_diff_eq!(right, 1.0);
            },
            _ => panic!("expected a split"),
        }
        // The held-out row is still predicted.
        assert_abs_diff_eq!(fit.fitted[1], 0.0);
    }


    #[test]
    fn a_single_value_has_no_split() {
        let x = [2.0, 2.0, 2.0];
        let u = [1.0, 2.0, 3.0];
        let w = [1.0; 3];
        let err = core::fit(&ModelTerm::stump("x"), &x, &u, &w).unwrap_err();
        assert_eq!(err, DegenerateFitError::NoSplit);
    }
}
